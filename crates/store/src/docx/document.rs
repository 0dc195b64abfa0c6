//! Text model of a WordprocessingML part
//!
//! A part is a list of [`Story`] containers (the body, a header, a footer or
//! one footnote). Stories hold paragraphs and tables, tables hold rows of
//! cells, and every cell is itself a story. Paragraphs hold runs and runs
//! hold the `w:t` text fragments, which are the only mutable leaves.

use std::ops::Range;

/// One `w:t` element of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Qualified element name as written in the source (usually `w:t`)
    pub(crate) qname: String,
    /// Byte span of the start tag, or of the whole element when self-closing
    pub(crate) open_tag: Range<usize>,
    /// Byte span of the escaped content; `None` for `<w:t/>`
    pub(crate) content: Option<Range<usize>>,
    /// Whether the start tag already has `xml:space="preserve"`
    pub(crate) preserves_space: bool,
    original: String,
    text: String,
}

impl TextFragment {
    pub(crate) fn new(
        qname: String,
        open_tag: Range<usize>,
        content: Option<Range<usize>>,
        preserves_space: bool,
        text: String,
    ) -> Self {
        Self {
            qname,
            open_tag,
            content,
            preserves_space,
            original: text.clone(),
            text,
        }
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as loaded from the package
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Whether the text differs from what was loaded
    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }

    /// Whether the current text needs `xml:space="preserve"` to survive
    pub(crate) fn needs_preserve(&self) -> bool {
        let edge_ws = |c: Option<char>| c.is_some_and(char::is_whitespace);
        edge_ws(self.text.chars().next()) || edge_ws(self.text.chars().last())
    }
}

/// A `w:r` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub(crate) fragments: Vec<TextFragment>,
}

impl Run {
    /// Number of text fragments
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Text of the fragment at `index`
    pub fn fragment(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(TextFragment::text)
    }

    /// Replace the text of the fragment at `index`; returns false when out of range
    pub fn set_fragment(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.fragments.get_mut(index) {
            Some(fragment) => {
                fragment.set_text(text);
                true
            }
            None => false,
        }
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Concatenated fragment text
    pub fn text(&self) -> String {
        self.fragments.iter().map(TextFragment::text).collect()
    }
}

/// A `w:p` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub(crate) runs: Vec<Run>,
}

impl Paragraph {
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Visible text of the paragraph (all runs, all fragments)
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }
}

/// A `w:tr` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub(crate) cells: Vec<Story>,
}

impl TableRow {
    pub fn cells(&self) -> &[Story] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Story] {
        &mut self.cells
    }
}

/// A `w:tbl` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub(crate) rows: Vec<TableRow>,
}

impl Table {
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }
}

/// Block container: body, header, footer, footnote or table cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Story {
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) tables: Vec<Table>,
}

impl Story {
    /// Paragraphs directly inside this container, in document order
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// Tables directly inside this container, in document order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Every fragment in this story, including nested cells
    pub(crate) fn collect_fragments<'a>(&'a self, out: &mut Vec<&'a TextFragment>) {
        for paragraph in &self.paragraphs {
            for run in &paragraph.runs {
                out.extend(run.fragments.iter());
            }
        }
        for table in &self.tables {
            for row in &table.rows {
                for cell in &row.cells {
                    cell.collect_fragments(out);
                }
            }
        }
    }
}
