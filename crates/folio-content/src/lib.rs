//! Content file lifecycle and reconciliation.
//!
//! ```text
//! ContentStorer                 - Save-time reconciliation (add_or_update_content)
//!     ├── ContentManager        - Façade over permanent ContentStorage
//!     ├── TemporaryFileManager  - Façade over TemporaryFileStorage, expiry sweep
//!     └── ReferenceScanner      - Schema-driven file reference discovery
//!
//! generate_unique_filename      - Collision-free `<stem>-<token><ext>` names
//! ```

pub mod error;
pub mod filename;
pub mod manager;
pub mod storer;
pub mod temporary;

pub use error::{ContentError, Result};
pub use filename::{generate_unique_filename, strip_token_suffix};
pub use manager::ContentManager;
pub use storer::{
    ContentStorer, FileOutcome, FileReport, PathPatch, SaveReport, apply_patches,
    parse_paste_reference,
};
pub use temporary::{CleanupResult, TemporaryFileManager};
