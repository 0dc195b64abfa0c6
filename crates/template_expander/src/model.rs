//! Document model capabilities
//!
//! The walker and the engine only need a handful of operations from a
//! document: reach its block containers, descend into paragraphs, runs and
//! tables, and read or replace the text of single run fragments. Loading
//! and saving a whole package is the [`DocumentPackage`] extension.

use std::io::{Seek, Write};

/// A run: an ordered list of independently editable text fragments
pub trait TextRun {
    fn fragment_count(&self) -> usize;

    /// Text of the fragment at `index`
    fn fragment(&self, index: usize) -> Option<&str>;

    /// Replace the fragment at `index`; returns false when out of range
    fn set_fragment(&mut self, index: usize, text: String) -> bool;
}

pub trait TextParagraph {
    type Run: TextRun;

    fn runs_mut(&mut self) -> &mut [Self::Run];
}

/// A table whose cells are block containers
pub trait TextTable {
    type Cell: BlockContainer;

    fn row_count(&self) -> usize;

    /// Cells of row `row`, left to right
    fn row_cells_mut(&mut self, row: usize) -> Option<&mut [Self::Cell]>;
}

/// Anything holding paragraphs and tables: body, cell, header, footer, footnote
pub trait BlockContainer: Sized {
    type Paragraph: TextParagraph;
    type Table: TextTable<Cell = Self>;

    fn paragraphs_mut(&mut self) -> &mut [Self::Paragraph];

    fn tables_mut(&mut self) -> &mut [Self::Table];
}

/// The containers of a loaded document, grouped by role
pub trait TemplateDocument {
    type Container: BlockContainer;

    fn body_mut(&mut self) -> &mut Self::Container;

    /// One container per footnote, in part order
    fn footnotes_mut(&mut self) -> Vec<&mut Self::Container>;

    /// Header containers in document order
    fn headers_mut(&mut self) -> Vec<&mut Self::Container>;

    /// Footer containers in document order
    fn footers_mut(&mut self) -> Vec<&mut Self::Container>;
}

/// A document that can be loaded from and saved to a package
pub trait DocumentPackage: TemplateDocument + Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(bytes: &[u8]) -> Result<Self, Self::Error>;

    /// Write the complete package to `writer`
    fn save<W: Write + Seek>(&self, writer: W) -> Result<W, Self::Error>;

    /// Number of parts whose text changed since loading
    fn modified_part_count(&self) -> usize;
}
