//! DOCX package module
//!
//! Loads a Microsoft Word DOCX package into a lossless text model and writes
//! it back. DOCX is based on the Office Open XML (OOXML) format defined in
//! ECMA-376.
//!
//! ## Structure
//!
//! A DOCX file is a ZIP archive containing XML files:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/header*.xml`, `word/footer*.xml` - Headers and footers
//! - `word/footnotes.xml` - Footnotes content
//! - `word/comments.xml`, `word/media/`, styles, numbering, ...
//!
//! Only the main document, headers, footers and footnotes are parsed. Every
//! other entry, and every parsed part whose text did not change, is copied
//! to the output archive without being decompressed.

mod error;
mod reader;
mod relationships;
mod document;
mod parser;
mod writer;
mod api;

pub use error::{DocxError, DocxResult};
pub use document::{Paragraph, Run, Story, Table, TableRow, TextFragment};
pub use relationships::{Relationship, Relationships, TargetMode};
pub use writer::{EntryCompression, WriteOptions};
pub use api::{DocxPackage, PartKind, XmlPart};

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Strict OOXML WordprocessingML namespace
    pub const W_STRICT: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const FOOTNOTES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const COMMENTS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";

    /// Whether `rel_type` names `kind`, accepting the strict OOXML spelling
    pub fn is(rel_type: &str, kind: &str) -> bool {
        if rel_type == kind {
            return true;
        }
        let suffix = kind.rsplit('/').next().unwrap_or(kind);
        rel_type.starts_with("http://purl.oclc.org/ooxml/officeDocument/relationships/")
            && rel_type.rsplit('/').next() == Some(suffix)
    }
}

/// Default location of the main document part
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";
