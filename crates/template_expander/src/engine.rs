//! Template Expansion Engine
//!
//! Orchestrates one expansion: check the destination, read the template,
//! walk it with the rules, then write the result next to the destination
//! and move it into place.

use crate::error::{ExpanderError, Result};
use crate::model::DocumentPackage;
use crate::substitution::RuleSet;
use crate::walker::walk;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use store::DocxPackage;
use tempfile::Builder;
use tracing::{debug, info};

#[derive(Debug, Clone)]
enum TemplateSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl TemplateSource {
    fn describe(&self) -> String {
        match self {
            TemplateSource::File(path) => path.display().to_string(),
            TemplateSource::Bytes(bytes) => format!("<{} byte template>", bytes.len()),
        }
    }
}

/// Outcome of a successful [`TemplateProcessor::process`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub paragraphs: usize,
    pub fragments: usize,
    pub rewritten_fragments: usize,
    pub rewritten_parts: usize,
}

/// Fills a template package with substitution rules
#[derive(Debug, Clone)]
pub struct TemplateProcessor {
    source: TemplateSource,
}

impl TemplateProcessor {
    /// Use the package at `path`
    ///
    /// Only the path itself is checked here; whether the file exists and is
    /// a valid package is decided when [`process`](Self::process) runs.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ExpanderError::InvalidArgument("template path is empty".to_string()));
        }
        Ok(Self {
            source: TemplateSource::File(path.to_path_buf()),
        })
    }

    /// Use an in-memory package
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ExpanderError::InvalidArgument("template stream is empty".to_string()));
        }
        Ok(Self {
            source: TemplateSource::Bytes(bytes),
        })
    }

    /// Write the template with `rules` applied to `destination`
    pub fn process(&self, rules: &RuleSet, destination: impl AsRef<Path>) -> Result<ProcessReport> {
        self.process_with::<DocxPackage>(rules, destination.as_ref())
    }

    /// [`process`](Self::process) against any document model
    pub fn process_with<D: DocumentPackage>(&self, rules: &RuleSet, destination: &Path) -> Result<ProcessReport> {
        let destination = &resolve_destination(destination);
        check_destination(destination)?;
        let bytes = self.read_source()?;

        let mut document = D::load(&bytes).map_err(|e| ExpanderError::io(self.source.describe(), e))?;
        let stats = walk(&mut document, rules);
        let report = ProcessReport {
            paragraphs: stats.paragraphs,
            fragments: stats.fragments,
            rewritten_fragments: stats.rewritten,
            rewritten_parts: document.modified_part_count(),
        };
        debug!(
            source = %self.source.describe(),
            rules = rules.len(),
            paragraphs = report.paragraphs,
            fragments = report.fragments,
            rewritten = report.rewritten_fragments,
            "walked template"
        );

        write_atomically(destination, |writer| document.save(writer).map(drop))?;

        info!(
            destination = %destination.display(),
            parts = report.rewritten_parts,
            "expanded template"
        );
        Ok(report)
    }

    fn read_source(&self) -> Result<Cow<'_, [u8]>> {
        match &self.source {
            TemplateSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            TemplateSource::File(path) => {
                let unreadable = |reason: String| {
                    ExpanderError::PreconditionViolation(format!("template {} is not readable: {}", path.display(), reason))
                };
                let metadata = fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
                if !metadata.is_file() {
                    return Err(unreadable("not a regular file".to_string()));
                }
                let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
                Ok(Cow::Owned(bytes))
            }
        }
    }
}

/// Directory a new file at `path` would be created in
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Follow symlinks so the output lands in the file they point to
fn resolve_destination(destination: &Path) -> PathBuf {
    fs::canonicalize(destination).unwrap_or_else(|_| destination.to_path_buf())
}

fn check_destination(destination: &Path) -> Result<()> {
    let invalid = |reason: &str| {
        ExpanderError::InvalidArgument(format!("destination {} {}", destination.display(), reason))
    };

    if destination.as_os_str().is_empty() {
        return Err(ExpanderError::InvalidArgument("destination path is empty".to_string()));
    }

    match fs::metadata(destination) {
        Ok(metadata) if metadata.is_dir() => return Err(invalid("is a directory")),
        Ok(_) => {
            OpenOptions::new()
                .write(true)
                .open(destination)
                .map_err(|e| invalid(&format!("is not writable: {}", e)))?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(invalid(&format!("cannot be inspected: {}", e))),
    }

    let parent = parent_dir(destination);
    match fs::metadata(parent) {
        Ok(metadata) if !metadata.is_dir() => return Err(invalid("is not inside a directory")),
        Ok(_) => {}
        Err(_) => return Err(invalid("is in a directory that does not exist")),
    }
    // The output is renamed into place, so the directory must take new files
    tempfile::tempfile_in(parent).map_err(|e| invalid(&format!("is in a directory that is not writable: {}", e)))?;
    Ok(())
}

/// Write through a temporary file in the destination directory and rename
/// it over `destination` once complete
///
/// An existing destination keeps its permissions; a new one gets the same
/// mode a plain file create would give it.
fn write_atomically<F, E>(destination: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> std::result::Result<(), E>,
    E: Into<crate::error::BoxError>,
{
    let target = destination.display().to_string();
    let existing = fs::metadata(destination).ok().map(|metadata| metadata.permissions());

    #[allow(unused_mut)]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder
        .tempfile_in(parent_dir(destination))
        .map_err(|e| ExpanderError::io(&target, e))?;
    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions).map_err(|e| ExpanderError::io(&target, e))?;
    }

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer).map_err(|e| ExpanderError::io(&target, e))?;
        writer.flush().map_err(|e| ExpanderError::io(&target, e))?;
    }
    temp.as_file().sync_all().map_err(|e| ExpanderError::io(&target, e))?;

    temp.persist(destination).map_err(|e| ExpanderError::io(&target, e.error))?;
    Ok(())
}
