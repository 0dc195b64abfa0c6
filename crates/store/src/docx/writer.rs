//! DOCX Writer
//!
//! Re-emits the source archive entry by entry. Parts whose text changed are
//! re-encoded by splicing the new fragment text into the original XML; all
//! other entries are raw-copied, keeping their compressed bytes and CRC.

use crate::docx::document::TextFragment;
use crate::docx::error::DocxResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compression used for parts that have to be re-encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCompression {
    /// Stored if the source entry was stored, deflated otherwise
    #[default]
    Inherit,
    Stored,
    Deflated,
}

/// Options for writing a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Compression for rewritten parts
    pub rewritten_compression: EntryCompression,
}

impl WriteOptions {
    pub fn with_compression(mut self, compression: EntryCompression) -> Self {
        self.rewritten_compression = compression;
        self
    }

    fn method_for(&self, source: CompressionMethod) -> CompressionMethod {
        match self.rewritten_compression {
            EntryCompression::Stored => CompressionMethod::Stored,
            EntryCompression::Deflated => CompressionMethod::Deflated,
            EntryCompression::Inherit if source == CompressionMethod::Stored => CompressionMethod::Stored,
            EntryCompression::Inherit => CompressionMethod::Deflated,
        }
    }
}

const PRESERVE_ATTR: &str = r#" xml:space="preserve""#;

/// Rebuild `xml` with the text of every modified fragment
pub(crate) fn splice_fragments(xml: &str, fragments: &[&TextFragment]) -> String {
    let mut changed: Vec<&TextFragment> = fragments.iter().copied().filter(|f| f.is_modified()).collect();
    changed.sort_by_key(|f| f.open_tag.start);

    let mut out = String::with_capacity(xml.len() + 64);
    let mut cursor = 0;

    for fragment in changed {
        out.push_str(&xml[cursor..fragment.open_tag.start]);
        let open_tag = &xml[fragment.open_tag.clone()];
        let add_preserve = fragment.needs_preserve() && !fragment.preserves_space;
        let escaped = quick_xml::escape::partial_escape(fragment.text());

        match &fragment.content {
            Some(content) => {
                push_open_tag(&mut out, open_tag, &fragment.qname, add_preserve);
                out.push_str(&escaped);
                cursor = content.end;
            }
            None => {
                // <w:t/> becomes <w:t>text</w:t>
                let head = open_tag.trim_end_matches('>').trim_end_matches('/').trim_end();
                push_open_tag(&mut out, &format!("{}>", head), &fragment.qname, add_preserve);
                out.push_str(&escaped);
                out.push_str("</");
                out.push_str(&fragment.qname);
                out.push('>');
                cursor = fragment.open_tag.end;
            }
        }
    }

    out.push_str(&xml[cursor..]);
    out
}

fn push_open_tag(out: &mut String, open_tag: &str, qname: &str, add_preserve: bool) {
    if add_preserve {
        let name_end = 1 + qname.len();
        out.push_str(&open_tag[..name_end]);
        out.push_str(PRESERVE_ATTR);
        out.push_str(&open_tag[name_end..]);
    } else {
        out.push_str(open_tag);
    }
}

/// Copy `source` into `writer`, replacing the entries named in `rewritten`
pub(crate) fn write_package<W: Write + Seek>(
    source: &[u8],
    rewritten: &HashMap<&str, String>,
    options: &WriteOptions,
    writer: W,
) -> DocxResult<W> {
    let mut archive = ZipArchive::new(Cursor::new(source))?;
    let mut zip = ZipWriter::new(writer);

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        match rewritten.get(entry.name()) {
            Some(xml) => {
                let name = entry.name().to_string();
                let method = options.method_for(entry.compression());
                drop(entry);

                let file_options = SimpleFileOptions::default().compression_method(method);
                zip.start_file(name.as_str(), file_options)?;
                zip.write_all(xml.as_bytes())?;
                debug!(part = %name, bytes = xml.len(), "rewrote part");
            }
            None => zip.raw_copy_file(entry)?,
        }
    }

    Ok(zip.finish()?)
}
