//! WordprocessingML part parsing
//!
//! Walks a part with a namespace-aware reader and builds the [`Story`] tree
//! while recording the byte spans of every `w:t` element, so that the writer
//! can splice new text into the untouched original XML.

use crate::docx::document::{Paragraph, Run, Story, Table, TableRow, TextFragment};
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use tracing::trace;

/// Which kind of section reference a `w:sectPr` child is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    Header,
    Footer,
}

/// Result of parsing one part
#[derive(Debug, Default)]
pub(crate) struct ParsedPart {
    pub stories: Vec<Story>,
    /// `w:headerReference` / `w:footerReference` relationship ids in document order
    pub references: Vec<(ReferenceKind, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    StoryRoot,
    Table,
    Row,
    Cell,
    Paragraph,
    Run,
    Text,
    TextBox,
    HeaderReference,
    FooterReference,
    Other,
}

enum Frame {
    Story(Story),
    Table(Table),
    Row(TableRow),
}

struct OpenText {
    qname: String,
    open_tag: std::ops::Range<usize>,
    preserves_space: bool,
    text: String,
}

fn classify(resolved: &ResolveResult, local: &[u8], story_root: &[u8]) -> Tag {
    let Some(local) = XmlParser::w_local_name(resolved, local) else {
        return Tag::Other;
    };
    if local == story_root {
        return Tag::StoryRoot;
    }
    match local {
        b"tbl" => Tag::Table,
        b"tr" => Tag::Row,
        b"tc" => Tag::Cell,
        b"p" => Tag::Paragraph,
        b"r" => Tag::Run,
        b"t" => Tag::Text,
        b"txbxContent" => Tag::TextBox,
        b"headerReference" => Tag::HeaderReference,
        b"footerReference" => Tag::FooterReference,
        _ => Tag::Other,
    }
}

/// Start offset of the tag that ends at `end`
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(0)
}

struct StoryBuilder<'x> {
    part: &'x str,
    xml: &'x str,
    frames: Vec<Frame>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    text: Option<OpenText>,
    /// Depth inside an element whose content is not traversed
    opaque_depth: usize,
    parsed: ParsedPart,
}

impl<'x> StoryBuilder<'x> {
    fn new(part: &'x str, xml: &'x str) -> Self {
        Self {
            part,
            xml,
            frames: Vec::new(),
            paragraph: None,
            run: None,
            text: None,
            opaque_depth: 0,
            parsed: ParsedPart::default(),
        }
    }

    fn in_block(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::Story(_)))
    }

    fn start(&mut self, tag: Tag, event: &BytesStart, end: usize) {
        if self.opaque_depth > 0 {
            self.opaque_depth += 1;
            return;
        }
        match tag {
            Tag::StoryRoot if self.frames.is_empty() => self.frames.push(Frame::Story(Story::default())),
            Tag::Table if self.paragraph.is_none() && self.in_block() => {
                self.frames.push(Frame::Table(Table::default()))
            }
            Tag::Row if matches!(self.frames.last(), Some(Frame::Table(_))) => {
                self.frames.push(Frame::Row(TableRow::default()))
            }
            Tag::Cell if matches!(self.frames.last(), Some(Frame::Row(_))) => {
                self.frames.push(Frame::Story(Story::default()))
            }
            Tag::Paragraph if self.paragraph.is_none() && self.in_block() => {
                self.paragraph = Some(Paragraph::default())
            }
            Tag::Run if self.paragraph.is_some() && self.run.is_none() => self.run = Some(Run::default()),
            Tag::Text if self.run.is_some() && self.text.is_none() => {
                self.text = Some(OpenText {
                    qname: String::from_utf8_lossy(event.name().as_ref()).into_owned(),
                    open_tag: tag_start(self.xml, end)..end,
                    preserves_space: XmlParser::preserves_space(event),
                    text: String::new(),
                });
            }
            Tag::TextBox | Tag::Table | Tag::Paragraph => self.opaque_depth = 1,
            _ => self.reference(tag, event),
        }
    }

    fn empty(&mut self, tag: Tag, event: &BytesStart, end: usize) {
        if self.opaque_depth > 0 {
            return;
        }
        match tag {
            Tag::StoryRoot if self.frames.is_empty() => self.parsed.stories.push(Story::default()),
            Tag::Paragraph if self.paragraph.is_none() && self.in_block() => {
                self.push_paragraph(Paragraph::default())
            }
            Tag::Text => {
                if let Some(run) = self.run.as_mut() {
                    run.fragments.push(TextFragment::new(
                        String::from_utf8_lossy(event.name().as_ref()).into_owned(),
                        tag_start(self.xml, end)..end,
                        None,
                        XmlParser::preserves_space(event),
                        String::new(),
                    ));
                }
            }
            _ => self.reference(tag, event),
        }
    }

    fn reference(&mut self, tag: Tag, event: &BytesStart) {
        let kind = match tag {
            Tag::HeaderReference => ReferenceKind::Header,
            Tag::FooterReference => ReferenceKind::Footer,
            _ => return,
        };
        if let Some(id) = XmlParser::get_r_attribute(event, "id") {
            self.parsed.references.push((kind, id));
        }
    }

    fn text(&mut self, content: &str) {
        if self.opaque_depth == 0 {
            if let Some(open) = self.text.as_mut() {
                open.text.push_str(content);
            }
        }
    }

    fn end(&mut self, tag: Tag, end: usize) -> DocxResult<()> {
        if self.opaque_depth > 0 {
            self.opaque_depth -= 1;
            return Ok(());
        }
        match tag {
            Tag::Text => {
                if let (Some(open), Some(run)) = (self.text.take(), self.run.as_mut()) {
                    let content = open.open_tag.end..tag_start(self.xml, end);
                    run.fragments.push(TextFragment::new(
                        open.qname,
                        open.open_tag,
                        Some(content),
                        open.preserves_space,
                        open.text,
                    ));
                }
            }
            Tag::Run => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            Tag::Paragraph => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.push_paragraph(paragraph);
                }
            }
            Tag::Cell => {
                let frame = self.frames.pop();
                match (frame, self.frames.last_mut()) {
                    (Some(Frame::Story(cell)), Some(Frame::Row(row))) => row.cells.push(cell),
                    (frame, _) => return Err(mismatch(self.part, "w:tc", frame)),
                }
            }
            Tag::Row => {
                let frame = self.frames.pop();
                match (frame, self.frames.last_mut()) {
                    (Some(Frame::Row(row)), Some(Frame::Table(table))) => table.rows.push(row),
                    (frame, _) => return Err(mismatch(self.part, "w:tr", frame)),
                }
            }
            Tag::Table => {
                let frame = self.frames.pop();
                match (frame, self.frames.last_mut()) {
                    (Some(Frame::Table(table)), Some(Frame::Story(story))) => story.tables.push(table),
                    (frame, _) => return Err(mismatch(self.part, "w:tbl", frame)),
                }
            }
            Tag::StoryRoot => {
                if let Some(Frame::Story(story)) = self.frames.pop() {
                    self.parsed.stories.push(story);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        if let Some(Frame::Story(story)) = self.frames.last_mut() {
            story.paragraphs.push(paragraph);
        }
    }
}

fn mismatch(part: &str, element: &str, frame: Option<Frame>) -> DocxError {
    let found = match frame {
        Some(Frame::Story(_)) => "a block container",
        Some(Frame::Table(_)) => "a table",
        Some(Frame::Row(_)) => "a table row",
        None => "nothing",
    };
    DocxError::InvalidStructure(format!("{}: closing {} while inside {}", part, element, found))
}

/// Parse a part into stories rooted at the WordprocessingML element `story_root`
///
/// `story_root` is the local name of the container element: `body` for the
/// main document, `hdr`/`ftr` for headers and footers, `footnote` for each
/// note in the footnotes part.
pub(crate) fn parse_part(part: &str, xml: &str, story_root: &[u8]) -> DocxResult<ParsedPart> {
    let mut reader = NsReader::from_str(xml);
    let mut builder = StoryBuilder::new(part, xml);

    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(|e| DocxError::xml(part, e))?;
        let tag = match &event {
            Event::Start(e) | Event::Empty(e) => classify(&resolved, e.local_name().as_ref(), story_root),
            Event::End(e) => classify(&resolved, e.local_name().as_ref(), story_root),
            _ => Tag::Other,
        };
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => builder.start(tag, e, end),
            Event::Empty(ref e) => builder.empty(tag, e, end),
            Event::End(_) => builder.end(tag, end)?,
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|err| DocxError::xml(part, err))?;
                builder.text(&text);
            }
            Event::CData(ref e) => builder.text(&String::from_utf8_lossy(e)),
            Event::Eof => break,
            _ => {}
        }
    }

    let parsed = builder.parsed;
    trace!(part, stories = parsed.stories.len(), "parsed part");
    Ok(parsed)
}
