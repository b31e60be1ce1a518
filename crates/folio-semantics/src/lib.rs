//! Library semantics and file reference scanning.
//!
//! A content object's parameter tree is plain JSON; its shape is described by
//! the semantics of the main library and of every nested library it embeds.
//! This crate parses semantics into a closed model ([`FieldKind`]) and walks a
//! parameter tree with it to find every embedded file reference.

pub mod error;
pub mod model;
pub mod provider;
pub mod scanner;

pub use error::{Result, ScanError};
pub use model::{AssetKind, FieldKind, Semantics, SemanticsNode};
pub use provider::{DirectorySemanticsProvider, MemorySemanticsProvider, SemanticsProvider};
pub use scanner::{
    FileReference, ReferenceScanner, ScanReport, SkippedLibrary, TEMPORARY_MARKER,
    escape_pointer_token,
};
