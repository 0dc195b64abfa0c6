//! ZIP archive reading and XML attribute helpers

use crate::docx::error::{DocxError, DocxResult};
use quick_xml::events::BytesStart;
use quick_xml::name::ResolveResult;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A wrapper around a ZIP archive for reading DOCX files
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    /// Create a new DOCX reader from a source that implements Read + Seek
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read a file from the archive as a string
    pub fn read_file_as_string(&mut self, path: &str) -> DocxResult<String> {
        let bytes = self.read_file_as_bytes(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a file from the archive as bytes
    pub fn read_file_as_bytes(&mut self, path: &str) -> DocxResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                DocxError::MissingPart(path.to_string())
            } else {
                DocxError::from(e)
            }
        })?;

        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Check if a file exists in the archive
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Entry names in central directory order
    pub fn file_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(str::to_string))
            .collect()
    }

    /// Check if this is a valid DOCX file
    pub fn is_valid_docx(&self) -> bool {
        self.file_exists("[Content_Types].xml")
    }
}

/// XML helpers shared by the part parsers
pub struct XmlParser;

impl XmlParser {
    /// Get an attribute value from an event
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Get an attribute value with a namespace prefix
    pub fn get_prefixed_attribute(event: &BytesStart, prefix: &str, local: &str) -> Option<String> {
        let key = format!("{}:{}", prefix, local);
        Self::get_attribute(event, key.as_bytes())
    }

    /// Get a r: namespaced attribute
    pub fn get_r_attribute(event: &BytesStart, name: &str) -> Option<String> {
        Self::get_prefixed_attribute(event, "r", name)
    }

    /// Whether the element carries `xml:space="preserve"`
    pub fn preserves_space(event: &BytesStart) -> bool {
        Self::get_attribute(event, b"xml:space").as_deref() == Some("preserve")
    }

    /// Local name of a WordprocessingML element, `None` for other namespaces
    pub fn w_local_name<'a>(ns: &ResolveResult, event_local: &'a [u8]) -> Option<&'a [u8]> {
        match ns {
            ResolveResult::Bound(namespace)
                if namespace.as_ref() == crate::docx::namespaces::W.as_bytes()
                    || namespace.as_ref() == crate::docx::namespaces::W_STRICT.as_bytes() =>
            {
                Some(event_local)
            }
            _ => None,
        }
    }
}
