//! Store - Word package access and archive comparison
//!
//! This crate loads WordprocessingML packages into an editable text model,
//! writes them back with untouched entries copied byte for byte, and checks
//! zip archives for content equivalence.

pub mod docx;
mod error;
mod integrity;

pub use error::*;
pub use integrity::*;

// Re-export DOCX functionality
pub use docx::{
    DocxError, DocxPackage, DocxResult, EntryCompression, Paragraph, PartKind, Run, Story, Table,
    TableRow, TextFragment, WriteOptions, XmlPart,
};
