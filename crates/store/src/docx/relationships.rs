//! Relationships (.rels) file parsing and part name resolution
//!
//! DOCX uses relationships to connect parts of the document together.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use crate::docx::relationship_types;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A single relationship in a .rels file
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Relationships of one source part, in file order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    relationships: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels file from its XML content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::new();
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() != b"Relationship" {
                        continue;
                    }
                    let id = XmlParser::get_attribute(e, b"Id")
                        .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Id".into()))?;
                    let rel_type = XmlParser::get_attribute(e, b"Type")
                        .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Type".into()))?;
                    let target = XmlParser::get_attribute(e, b"Target")
                        .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Target".into()))?;
                    let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                        .map(|m| if m == "External" { TargetMode::External } else { TargetMode::Internal })
                        .unwrap_or_default();

                    result.relationships.push(Relationship {
                        id,
                        rel_type,
                        target,
                        target_mode,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::xml("relationships", e)),
                _ => {}
            }
        }

        Ok(result)
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Get the first internal relationship of a given type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.get_all_by_type(rel_type).into_iter().next()
    }

    /// Get all internal relationships of a given type, in file order
    pub fn get_all_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.target_mode == TargetMode::Internal)
            .filter(|r| relationship_types::is(&r.rel_type, rel_type))
            .collect()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// Name of the .rels part that holds the relationships of `part`
///
/// `word/document.xml` -> `word/_rels/document.xml.rels`, and the package
/// itself (empty name) -> `_rels/.rels`.
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it
///
/// Absolute targets (`/word/header1.xml`) are taken from the package root;
/// relative ones are joined to the source part's directory with `.` and `..`
/// segments collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = source_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::namespaces;

    fn sample() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
    <Relationship Id="rId9" Type="{}" Target="footer1.xml"/>
    <Relationship Id="rId2" Type="{}" Target="header2.xml"/>
    <Relationship Id="rId10" Type="{}" Target="header1.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#,
            namespaces::PKG_REL,
            relationship_types::FOOTER,
            relationship_types::HEADER,
            relationship_types::HEADER,
        )
    }

    #[test]
    fn test_relationships_parsing() {
        let rels = Relationships::parse(&sample()).unwrap();
        assert_eq!(rels.len(), 4);

        let r1 = rels.get("rId9").unwrap();
        assert_eq!(r1.target, "footer1.xml");
        assert_eq!(r1.target_mode, TargetMode::Internal);

        let r3 = rels.get("rId3").unwrap();
        assert_eq!(r3.target, "https://example.com");
        assert_eq!(r3.target_mode, TargetMode::External);
    }

    #[test]
    fn test_get_all_by_type_keeps_file_order() {
        let rels = Relationships::parse(&sample()).unwrap();
        let headers: Vec<_> = rels
            .get_all_by_type(relationship_types::HEADER)
            .into_iter()
            .map(|r| r.target.as_str())
            .collect();
        assert_eq!(headers, vec!["header2.xml", "header1.xml"]);
    }

    #[test]
    fn test_rels_part_for() {
        assert_eq!(rels_part_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_part_for(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word/document.xml", "header1.xml"), "word/header1.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/footer1.xml"), "word/footer1.xml");
        assert_eq!(resolve_target("word/document.xml", "../customXml/item1.xml"), "customXml/item1.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
        assert_eq!(resolve_target("word/document.xml", "./media/image1.png"), "word/media/image1.png");
    }
}
