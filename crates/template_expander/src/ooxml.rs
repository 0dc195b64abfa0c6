//! Model capabilities for [`store::DocxPackage`]

use crate::model::{BlockContainer, DocumentPackage, TemplateDocument, TextParagraph, TextRun, TextTable};
use std::io::{Seek, Write};
use store::docx::TableRow;
use store::{DocxError, DocxPackage, Paragraph, Run, Story, Table, XmlPart};

impl TextRun for Run {
    fn fragment_count(&self) -> usize {
        Run::fragment_count(self)
    }

    fn fragment(&self, index: usize) -> Option<&str> {
        Run::fragment(self, index)
    }

    fn set_fragment(&mut self, index: usize, text: String) -> bool {
        Run::set_fragment(self, index, text)
    }
}

impl TextParagraph for Paragraph {
    type Run = Run;

    fn runs_mut(&mut self) -> &mut [Run] {
        Paragraph::runs_mut(self)
    }
}

impl TextTable for Table {
    type Cell = Story;

    fn row_count(&self) -> usize {
        self.rows().len()
    }

    fn row_cells_mut(&mut self, row: usize) -> Option<&mut [Story]> {
        self.rows_mut().get_mut(row).map(TableRow::cells_mut)
    }
}

impl BlockContainer for Story {
    type Paragraph = Paragraph;
    type Table = Table;

    fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        Story::paragraphs_mut(self)
    }

    fn tables_mut(&mut self) -> &mut [Table] {
        Story::tables_mut(self)
    }
}

fn part_stories(parts: &mut [XmlPart]) -> Vec<&mut Story> {
    parts.iter_mut().flat_map(|part| part.stories_mut().iter_mut()).collect()
}

impl TemplateDocument for DocxPackage {
    type Container = Story;

    fn body_mut(&mut self) -> &mut Story {
        DocxPackage::body_mut(self)
    }

    fn footnotes_mut(&mut self) -> Vec<&mut Story> {
        DocxPackage::footnotes_mut(self).iter_mut().collect()
    }

    fn headers_mut(&mut self) -> Vec<&mut Story> {
        part_stories(DocxPackage::headers_mut(self))
    }

    fn footers_mut(&mut self) -> Vec<&mut Story> {
        part_stories(DocxPackage::footers_mut(self))
    }
}

impl DocumentPackage for DocxPackage {
    type Error = DocxError;

    fn load(bytes: &[u8]) -> Result<Self, DocxError> {
        DocxPackage::from_bytes(bytes)
    }

    fn save<W: Write + Seek>(&self, writer: W) -> Result<W, DocxError> {
        self.write_to(writer)
    }

    fn modified_part_count(&self) -> usize {
        self.modified_parts().count()
    }
}
