//! Fixture packages for integration tests

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use store::docx::{namespaces, relationship_types};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MEDIA_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff, 0x10, 0x80];

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/></Types>"#;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Paragraph with one run per fragment
pub fn para(fragments: &[&str]) -> String {
    let runs: String = fragments
        .iter()
        .map(|text| format!("<w:r><w:rPr><w:b/></w:rPr><w:t>{}</w:t></w:r>", text))
        .collect();
    format!("<w:p>{}</w:p>", runs)
}

pub fn cell(inner: &str) -> String {
    format!("<w:tc><w:tcPr><w:tcW w:w=\"2000\" w:type=\"dxa\"/></w:tcPr>{}</w:tc>", inner)
}

pub fn table(rows: &[Vec<String>]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| format!("<w:tr>{}</w:tr>", cells.concat()))
        .collect();
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows)
}

fn part(root: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{inner}</w:{root}>"#,
        namespaces::W
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"<Relationships xmlns="{}">"#, namespaces::PKG_REL);
    for (id, rel_type, target) in entries {
        xml.push_str(&format!(r#"<Relationship Id="{id}" Type="{rel_type}" Target="{target}"/>"#));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Builder for small but complete DOCX packages
#[derive(Default)]
pub struct DocxFixture {
    body: Vec<String>,
    headers: Vec<String>,
    footers: Vec<String>,
    footnotes: Vec<String>,
    comments: Vec<String>,
    media: bool,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw block XML (paragraphs or tables) to the body
    pub fn body(mut self, block: impl Into<String>) -> Self {
        self.body.push(block.into());
        self
    }

    pub fn header(mut self, text: &str) -> Self {
        self.headers.push(para(&[text]));
        self
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footers.push(para(&[text]));
        self
    }

    pub fn footnote(mut self, text: &str) -> Self {
        self.footnotes.push(para(&[text]));
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.comments.push(para(&[text]));
        self
    }

    pub fn media(mut self) -> Self {
        self.media = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc_rels: Vec<(String, &str, String)> = Vec::new();
        let mut entries: Vec<(String, Vec<u8>, CompressionMethod)> = Vec::new();
        let mut sect = String::new();

        for (i, xml) in self.headers.iter().enumerate() {
            let id = format!("rIdH{}", i + 1);
            sect.push_str(&format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, id));
            doc_rels.push((id, relationship_types::HEADER, format!("header{}.xml", i + 1)));
            entries.push((format!("word/header{}.xml", i + 1), part("hdr", xml).into_bytes(), CompressionMethod::Deflated));
        }
        for (i, xml) in self.footers.iter().enumerate() {
            let id = format!("rIdF{}", i + 1);
            sect.push_str(&format!(r#"<w:footerReference w:type="default" r:id="{}"/>"#, id));
            doc_rels.push((id, relationship_types::FOOTER, format!("footer{}.xml", i + 1)));
            entries.push((format!("word/footer{}.xml", i + 1), part("ftr", xml).into_bytes(), CompressionMethod::Deflated));
        }
        if !self.footnotes.is_empty() {
            let mut notes = String::from(
                r#"<w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>"#,
            );
            for (i, xml) in self.footnotes.iter().enumerate() {
                notes.push_str(&format!(r#"<w:footnote w:id="{}">{}</w:footnote>"#, i + 1, xml));
            }
            doc_rels.push(("rIdN".to_string(), relationship_types::FOOTNOTES, "footnotes.xml".to_string()));
            entries.push(("word/footnotes.xml".to_string(), part("footnotes", &notes).into_bytes(), CompressionMethod::Deflated));
        }
        if !self.comments.is_empty() {
            let comments: String = self
                .comments
                .iter()
                .enumerate()
                .map(|(i, xml)| format!(r#"<w:comment w:id="{}" w:author="Reviewer">{}</w:comment>"#, i, xml))
                .collect();
            doc_rels.push(("rIdC".to_string(), relationship_types::COMMENTS, "comments.xml".to_string()));
            entries.push(("word/comments.xml".to_string(), part("comments", &comments).into_bytes(), CompressionMethod::Deflated));
        }
        if self.media {
            doc_rels.push((
                "rIdM".to_string(),
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image",
                "media/image1.png".to_string(),
            ));
            entries.push(("word/media/image1.png".to_string(), MEDIA_BYTES.to_vec(), CompressionMethod::Stored));
        }

        let body = format!("<w:body>{}<w:sectPr>{}</w:sectPr></w:body>", self.body.concat(), sect);
        let doc_rels: Vec<(&str, &str, &str)> = doc_rels
            .iter()
            .map(|(id, rel_type, target)| (id.as_str(), *rel_type, target.as_str()))
            .collect();

        let mut all = vec![
            ("[Content_Types].xml".to_string(), CONTENT_TYPES.as_bytes().to_vec(), CompressionMethod::Deflated),
            (
                "_rels/.rels".to_string(),
                rels(&[("rId1", relationship_types::DOCUMENT, "word/document.xml")]).into_bytes(),
                CompressionMethod::Deflated,
            ),
            ("word/document.xml".to_string(), part("document", &body).into_bytes(), CompressionMethod::Deflated),
            ("word/_rels/document.xml.rels".to_string(), rels(&doc_rels).into_bytes(), CompressionMethod::Deflated),
        ];
        all.extend(entries);
        zip_entries(&all)
    }
}

fn zip_entries(entries: &[(String, Vec<u8>, CompressionMethod)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data, method) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default().compression_method(*method))
            .unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// The package every end-to-end test starts from
pub fn sample_template() -> Vec<u8> {
    let nested = table(&[vec![cell(&para(&["nested {{SUB1}}"]))]]);
    DocxFixture::new()
        .body(para(&["{{SUB1}} and {{SUB2}}"]))
        .body(para(&["{{SU", "B1}}"]))
        .body(para(&["{{MULTILINE}}"]))
        .body(para(&["keep{{EMPTY}}this"]))
        .body(table(&[
            vec![cell(&para(&["{{SUB1}}"])), cell(&format!("{}{}", para(&["{{SUB2}}"]), nested))],
            vec![cell(&para(&["plain"])), cell(&para(&["{{SUB2}}!"]))],
        ]))
        .header("Header {{SUB1}}")
        .footer("Footer {{SUB2}}")
        .footnote("Note {{SUB1}}")
        .comment("Comment {{SUB1}}")
        .media()
        .build()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Uncompressed bytes of one archive entry
pub fn entry_bytes(archive: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = ZipArchive::new(file).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

/// Compression method and CRC-32 of one archive entry
pub fn entry_header(archive: &Path, name: &str) -> (CompressionMethod, u32) {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = ZipArchive::new(file).unwrap();
    let entry = zip.by_name(name).unwrap();
    (entry.compression(), entry.crc32())
}
