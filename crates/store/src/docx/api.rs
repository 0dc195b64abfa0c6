//! Public API for DOCX packages
//!
//! [`DocxPackage`] is the entry point: load a package from disk, bytes or a
//! reader, edit the text of its body, headers, footers and footnotes, then
//! write it back.

use crate::docx::document::{Story, TextFragment};
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::parser::{parse_part, ReferenceKind};
use crate::docx::reader::DocxReader;
use crate::docx::relationships::{rels_part_for, resolve_target, Relationships};
use crate::docx::writer::{splice_fragments, write_package, WriteOptions};
use crate::docx::{relationship_types, DEFAULT_DOCUMENT_PART};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Kind of a parsed part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Document,
    Header,
    Footer,
    Footnotes,
}

impl PartKind {
    /// Local name of the element that delimits one story in this part
    fn story_root(self) -> &'static [u8] {
        match self {
            PartKind::Document => b"body",
            PartKind::Header => b"hdr",
            PartKind::Footer => b"ftr",
            PartKind::Footnotes => b"footnote",
        }
    }
}

/// A parsed XML part and its stories
#[derive(Debug, Clone)]
pub struct XmlPart {
    name: String,
    kind: PartKind,
    xml: String,
    stories: Vec<Story>,
}

impl XmlPart {
    /// Archive entry name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn stories_mut(&mut self) -> &mut [Story] {
        &mut self.stories
    }

    /// Whether any fragment in this part was changed
    pub fn is_modified(&self) -> bool {
        self.fragments().iter().any(|f| f.is_modified())
    }

    /// The part's XML with the current fragment text
    pub fn to_xml(&self) -> String {
        splice_fragments(&self.xml, &self.fragments())
    }

    fn fragments(&self) -> Vec<&TextFragment> {
        let mut out = Vec::new();
        for story in &self.stories {
            story.collect_fragments(&mut out);
        }
        out
    }
}

/// A loaded DOCX package
#[derive(Debug, Clone)]
pub struct DocxPackage {
    source: Vec<u8>,
    entry_names: Vec<String>,
    document: XmlPart,
    headers: Vec<XmlPart>,
    footers: Vec<XmlPart>,
    footnotes: Option<XmlPart>,
}

impl DocxPackage {
    /// Load a DOCX file from disk
    ///
    /// # Example
    ///
    /// ```ignore
    /// use store::docx::DocxPackage;
    /// use std::path::Path;
    ///
    /// let package = DocxPackage::open(Path::new("template.docx"))?;
    /// println!("{}", package.body().paragraphs()[0].text());
    /// ```
    pub fn open(path: &Path) -> DocxResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            } else {
                DocxError::Io(e)
            }
        })?;
        Self::from_bytes(bytes)
    }

    /// Load a DOCX package from a reader
    pub fn from_reader<R: Read>(mut reader: R) -> DocxResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Load a DOCX package from its bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> DocxResult<Self> {
        let source = bytes.into();
        let loaded = load_parts(&source)?;

        debug!(
            entries = loaded.entry_names.len(),
            document = %loaded.document.name,
            headers = loaded.headers.len(),
            footers = loaded.footers.len(),
            footnotes = loaded.footnotes.is_some(),
            "loaded docx package"
        );

        Ok(Self {
            source,
            entry_names: loaded.entry_names,
            document: loaded.document,
            headers: loaded.headers,
            footers: loaded.footers,
            footnotes: loaded.footnotes,
        })
    }

    /// Archive entry names in source order
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    /// The main document part
    pub fn document(&self) -> &XmlPart {
        &self.document
    }

    /// The document body
    pub fn body(&self) -> &Story {
        &self.document.stories[0]
    }

    pub fn body_mut(&mut self) -> &mut Story {
        &mut self.document.stories[0]
    }

    /// Header parts in document order
    pub fn headers(&self) -> &[XmlPart] {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut [XmlPart] {
        &mut self.headers
    }

    /// Footer parts in document order
    pub fn footers(&self) -> &[XmlPart] {
        &self.footers
    }

    pub fn footers_mut(&mut self) -> &mut [XmlPart] {
        &mut self.footers
    }

    /// Footnotes, separators included, in part order
    pub fn footnotes(&self) -> &[Story] {
        self.footnotes.as_ref().map(|p| p.stories()).unwrap_or(&[])
    }

    pub fn footnotes_mut(&mut self) -> &mut [Story] {
        match self.footnotes.as_mut() {
            Some(part) => part.stories_mut(),
            None => &mut [],
        }
    }

    /// Every parsed part
    pub fn parts(&self) -> impl Iterator<Item = &XmlPart> {
        std::iter::once(&self.document)
            .chain(self.headers.iter())
            .chain(self.footers.iter())
            .chain(self.footnotes.iter())
    }

    /// Parts whose text changed since loading
    pub fn modified_parts(&self) -> impl Iterator<Item = &XmlPart> {
        self.parts().filter(|p| p.is_modified())
    }

    /// Write the package with default options
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> DocxResult<W> {
        self.write_with(writer, &WriteOptions::default())
    }

    /// Write the package; unchanged entries are copied without recompression
    pub fn write_with<W: Write + Seek>(&self, writer: W, options: &WriteOptions) -> DocxResult<W> {
        let rewritten: HashMap<&str, String> = self
            .modified_parts()
            .map(|part| (part.name(), part.to_xml()))
            .collect();
        write_package(&self.source, &rewritten, options, writer)
    }

    /// Write the package into memory
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }
}

struct LoadedParts {
    entry_names: Vec<String>,
    document: XmlPart,
    headers: Vec<XmlPart>,
    footers: Vec<XmlPart>,
    footnotes: Option<XmlPart>,
}

fn load_parts(source: &[u8]) -> DocxResult<LoadedParts> {
    let mut docx = DocxReader::new(Cursor::new(source))?;

    if !docx.is_valid_docx() {
        return Err(DocxError::InvalidStructure("Missing [Content_Types].xml".to_string()));
    }

    let document_name = main_document_name(&mut docx)?;
    let document_xml = docx.read_file_as_string(&document_name)?;
    let parsed = parse_part(&document_name, &document_xml, PartKind::Document.story_root())?;
    if parsed.stories.is_empty() {
        return Err(DocxError::InvalidStructure(format!("{} has no w:body", document_name)));
    }
    let references = parsed.references;
    let document = XmlPart {
        name: document_name.clone(),
        kind: PartKind::Document,
        xml: document_xml,
        stories: parsed.stories,
    };

    let rels_name = rels_part_for(&document_name);
    let doc_rels = if docx.file_exists(&rels_name) {
        Relationships::parse(&docx.read_file_as_string(&rels_name)?)?
    } else {
        Relationships::new()
    };

    let mut headers = Vec::new();
    for name in ordered_targets(&document_name, &doc_rels, &references, ReferenceKind::Header) {
        headers.extend(load_related(&mut docx, name, PartKind::Header)?);
    }
    let mut footers = Vec::new();
    for name in ordered_targets(&document_name, &doc_rels, &references, ReferenceKind::Footer) {
        footers.extend(load_related(&mut docx, name, PartKind::Footer)?);
    }
    let footnotes = match doc_rels.get_by_type(relationship_types::FOOTNOTES) {
        Some(rel) => load_related(&mut docx, resolve_target(&document_name, &rel.target), PartKind::Footnotes)?,
        None => None,
    };

    Ok(LoadedParts {
        entry_names: docx.file_names(),
        document,
        headers,
        footers,
        footnotes,
    })
}

fn main_document_name<R: Read + Seek>(docx: &mut DocxReader<R>) -> DocxResult<String> {
    let root_rels = rels_part_for("");
    if docx.file_exists(&root_rels) {
        let rels = Relationships::parse(&docx.read_file_as_string(&root_rels)?)?;
        if let Some(rel) = rels.get_by_type(relationship_types::DOCUMENT) {
            return Ok(resolve_target("", &rel.target));
        }
    }
    if docx.file_exists(DEFAULT_DOCUMENT_PART) {
        Ok(DEFAULT_DOCUMENT_PART.to_string())
    } else {
        Err(DocxError::MissingPart("Main document".to_string()))
    }
}

/// Header or footer part names: referenced ones in document order, then the
/// unreferenced rest in relationship order
fn ordered_targets(
    document_name: &str,
    rels: &Relationships,
    references: &[(ReferenceKind, String)],
    kind: ReferenceKind,
) -> Vec<String> {
    let rel_type = match kind {
        ReferenceKind::Header => relationship_types::HEADER,
        ReferenceKind::Footer => relationship_types::FOOTER,
    };

    let referenced = references
        .iter()
        .filter(|(k, _)| *k == kind)
        .filter_map(|(_, id)| rels.get(id))
        .filter(|rel| relationship_types::is(&rel.rel_type, rel_type));
    let declared = rels.get_all_by_type(rel_type);

    let mut names: Vec<String> = Vec::new();
    for rel in referenced.chain(declared) {
        let name = resolve_target(document_name, &rel.target);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn load_related<R: Read + Seek>(docx: &mut DocxReader<R>, name: String, kind: PartKind) -> DocxResult<Option<XmlPart>> {
    if !docx.file_exists(&name) {
        warn!(part = %name, ?kind, "related part missing from package, skipping");
        return Ok(None);
    }
    let xml = docx.read_file_as_string(&name)?;
    let parsed = parse_part(&name, &xml, kind.story_root())?;
    Ok(Some(XmlPart {
        name,
        kind,
        xml,
        stories: parsed.stories,
    }))
}
