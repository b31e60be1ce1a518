//! Storage adapters for Folio.
//!
//! - [`MemoryContentStorage`] / [`MemoryTemporaryStorage`]: in-process maps,
//!   used by tests and embedders that bring their own persistence.
//! - [`FileContentStorage`] / [`DirectoryTemporaryStorage`]: local
//!   filesystem layouts.
//!
//! # Directory Layout
//!
//! ```text
//! <content root>/<content-id>/h5p.json        # metadata
//! <content root>/<content-id>/content.json    # parameters
//! <content root>/<content-id>/content/<path>  # attached files
//!
//! <temporary root>/<owner>/<path>             # uploaded bytes
//! <temporary root>/<owner>/<path>.metadata    # expiry + ownership
//! ```

pub mod filesystem;
pub mod memory;
pub mod paths;

pub use filesystem::{DirectoryTemporaryStorage, FileContentStorage};
pub use memory::{MemoryContentStorage, MemoryTemporaryStorage};
pub use paths::{sanitize_filename, validate_relative_path};
