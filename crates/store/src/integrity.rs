//! Archive equivalence checking
//!
//! Decides whether two zip archives hold the same entries with the same
//! bytes, ignoring the physical order of entries and how each one was
//! compressed. Used to check generated packages against golden files.

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Which archive of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveSide {
    Left,
    Right,
}

/// A reason two archives are not equivalent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArchiveDifference {
    /// An entry exists in only one archive
    MissingEntry { name: String, missing_from: ArchiveSide },
    /// One side is a directory entry, the other is not
    DirectoryMismatch { name: String },
    /// Both entries exist but their uncompressed bytes differ
    ContentMismatch { name: String },
}

/// Outcome of a full comparison
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Whether the archives are equivalent
    pub is_equal: bool,
    /// Entries present in both archives
    pub shared_entries: usize,
    /// Shared entries accepted on matching CRC-32 alone
    pub checksum_matches: usize,
    /// Shared entries whose content had to be read
    pub content_comparisons: usize,
    /// Every difference found
    pub differences: Vec<ArchiveDifference>,
}

enum EntryVerdict {
    ChecksumMatch,
    ContentMatch,
    Differs(ArchiveDifference),
}

struct OpenArchive {
    path: String,
    archive: ZipArchive<BufReader<File>>,
}

impl OpenArchive {
    fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let archive = File::open(path)
            .map_err(ZipError::from)
            .and_then(|file| ZipArchive::new(BufReader::new(file)))
            .map_err(|source| StoreError::Archive {
                path: display.clone(),
                source,
            })?;
        Ok(Self { path: display, archive })
    }

    fn names(&self) -> BTreeSet<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Directory flag and stored CRC-32 of an entry
    ///
    /// The file type in the recorded unix mode wins over the trailing slash
    /// of the name, so a regular file named `media/` is not a directory.
    fn header(&mut self, name: &str) -> Result<(bool, u32)> {
        let path = &self.path;
        let entry = self.archive.by_name(name).map_err(|source| entry_error(path, name, source))?;
        let is_dir = match entry.unix_mode() {
            Some(mode) => mode & S_IFMT == S_IFDIR,
            None => entry.is_dir(),
        };
        Ok((is_dir, entry.crc32()))
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

fn entry_error(path: &str, name: &str, source: ZipError) -> StoreError {
    StoreError::Entry {
        path: path.to_string(),
        name: name.to_string(),
        source,
    }
}

/// Compares zip archives entry by entry
pub struct ArchiveComparator;

impl ArchiveComparator {
    /// Whether two archives are equivalent
    ///
    /// Entry names must match as sets. For every shared entry the directory
    /// flags must agree, and then either both CRC-32 values are non-zero and
    /// equal, or the uncompressed bytes are identical.
    pub fn equal(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<bool> {
        Ok(Self::run(a.as_ref(), b.as_ref(), true)?.is_equal)
    }

    /// Same checks as [`ArchiveComparator::equal`], reporting every difference
    pub fn compare(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<ComparisonReport> {
        Self::run(a.as_ref(), b.as_ref(), false)
    }

    fn run(a: &Path, b: &Path, stop_at_first: bool) -> Result<ComparisonReport> {
        let mut left = OpenArchive::open(a)?;
        let mut right = OpenArchive::open(b)?;
        let left_names = left.names();
        let right_names = right.names();

        let mut report = ComparisonReport::default();

        let only_left = left_names.difference(&right_names).map(|name| ArchiveDifference::MissingEntry {
            name: name.clone(),
            missing_from: ArchiveSide::Right,
        });
        let only_right = right_names.difference(&left_names).map(|name| ArchiveDifference::MissingEntry {
            name: name.clone(),
            missing_from: ArchiveSide::Left,
        });
        report.differences.extend(only_left.chain(only_right));

        if report.differences.is_empty() || !stop_at_first {
            for name in left_names.intersection(&right_names) {
                report.shared_entries += 1;
                match compare_entry(&mut left, &mut right, name)? {
                    EntryVerdict::ChecksumMatch => report.checksum_matches += 1,
                    EntryVerdict::ContentMatch => report.content_comparisons += 1,
                    EntryVerdict::Differs(difference) => {
                        report.differences.push(difference);
                        if stop_at_first {
                            break;
                        }
                    }
                }
            }
        }

        report.is_equal = report.differences.is_empty();
        if let Some(first) = report.differences.first() {
            debug!(left = %left.path, right = %right.path, ?first, "archives differ");
        }
        Ok(report)
    }
}

fn compare_entry(left: &mut OpenArchive, right: &mut OpenArchive, name: &str) -> Result<EntryVerdict> {
    let (left_dir, left_crc) = left.header(name)?;
    let (right_dir, right_crc) = right.header(name)?;

    if left_dir != right_dir {
        return Ok(EntryVerdict::Differs(ArchiveDifference::DirectoryMismatch {
            name: name.to_string(),
        }));
    }
    if left_crc != 0 && right_crc != 0 && left_crc == right_crc {
        return Ok(EntryVerdict::ChecksumMatch);
    }

    let left_path = &left.path;
    let right_path = &right.path;
    let mut left_entry = left.archive.by_name(name).map_err(|source| entry_error(left_path, name, source))?;
    let mut right_entry = right.archive.by_name(name).map_err(|source| entry_error(right_path, name, source))?;

    let same = streams_equal(&mut left_entry, &mut right_entry).map_err(|(side, e)| {
        let path = match side {
            ArchiveSide::Left => left_path,
            ArchiveSide::Right => right_path,
        };
        entry_error(path, name, ZipError::Io(e))
    })?;
    if same {
        Ok(EntryVerdict::ContentMatch)
    } else {
        Ok(EntryVerdict::Differs(ArchiveDifference::ContentMismatch {
            name: name.to_string(),
        }))
    }
}

/// Byte-for-byte comparison of two streams; a read error names its side
fn streams_equal(a: &mut impl Read, b: &mut impl Read) -> std::result::Result<bool, (ArchiveSide, io::Error)> {
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n_a = fill(a, &mut buf_a).map_err(|e| (ArchiveSide::Left, e))?;
        let n_b = fill(b, &mut buf_b).map_err(|e| (ArchiveSide::Right, e))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the stream ends
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_zip(dir: &TempDir, file: &str, entries: &[(&str, &str, CompressionMethod)]) -> PathBuf {
        let path = dir.path().join(file);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for (name, data, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
        path
    }

    const STORED: CompressionMethod = CompressionMethod::Stored;
    const DEFLATED: CompressionMethod = CompressionMethod::Deflated;

    #[test]
    fn test_order_and_compression_do_not_matter() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("one.xml", "<one/>", STORED), ("media/", "", STORED), ("two.bin", "\u{0}\u{1}", DEFLATED)]);
        let b = write_zip(&dir, "b.zip", &[("two.bin", "\u{0}\u{1}", STORED), ("one.xml", "<one/>", DEFLATED), ("media/", "", STORED)]);

        assert!(ArchiveComparator::equal(&a, &b).unwrap());
        assert!(ArchiveComparator::equal(&b, &a).unwrap());
    }

    #[test]
    fn test_extra_entry_is_unequal_in_both_directions() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("one.xml", "<one/>", DEFLATED)]);
        let b = write_zip(&dir, "b.zip", &[("one.xml", "<one/>", DEFLATED), ("extra.xml", "<one/>", DEFLATED)]);

        assert!(!ArchiveComparator::equal(&a, &b).unwrap());
        assert!(!ArchiveComparator::equal(&b, &a).unwrap());

        let report = ArchiveComparator::compare(&a, &b).unwrap();
        assert_eq!(
            report.differences,
            vec![ArchiveDifference::MissingEntry {
                name: "extra.xml".into(),
                missing_from: ArchiveSide::Left,
            }]
        );
    }

    #[test]
    fn test_different_bytes_are_unequal() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("doc.xml", "<w:t>old</w:t>", DEFLATED), ("same", "x", STORED)]);
        let b = write_zip(&dir, "b.zip", &[("doc.xml", "<w:t>new</w:t>", DEFLATED), ("same", "x", STORED)]);

        assert!(!ArchiveComparator::equal(&a, &b).unwrap());

        let report = ArchiveComparator::compare(&a, &b).unwrap();
        assert!(!report.is_equal);
        assert_eq!(report.shared_entries, 2);
        assert_eq!(report.checksum_matches, 1);
        assert_eq!(
            report.differences,
            vec![ArchiveDifference::ContentMismatch { name: "doc.xml".into() }]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["differences"][0]["type"], "ContentMismatch");
        assert_eq!(json["differences"][0]["name"], "doc.xml");
    }

    #[test]
    fn test_empty_entries_fall_back_to_content() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("empty.txt", "", STORED)]);
        let b = write_zip(&dir, "b.zip", &[("empty.txt", "", DEFLATED)]);

        let report = ArchiveComparator::compare(&a, &b).unwrap();
        assert!(report.is_equal);
        assert_eq!(report.checksum_matches, 0);
        assert_eq!(report.content_comparisons, 1);
    }

    #[test]
    fn test_large_entries_compare_across_buffer_boundaries() {
        let dir = TempDir::new().unwrap();
        let big: String = (0..50_000u32).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let mut other = big.clone().into_bytes();
        other[40_000] = b'!';
        let other = String::from_utf8(other).unwrap();
        let a = write_zip(&dir, "a.zip", &[("big.bin", &big, DEFLATED)]);
        let b = write_zip(&dir, "b.zip", &[("big.bin", &other, STORED)]);
        let c = write_zip(&dir, "c.zip", &[("big.bin", &big, STORED)]);

        assert!(!ArchiveComparator::equal(&a, &b).unwrap());
        assert!(ArchiveComparator::equal(&a, &c).unwrap());
    }

    #[test]
    fn test_streams_equal_detects_length_difference() {
        let mut a: &[u8] = b"abc";
        let mut b: &[u8] = b"abcd";
        assert!(!streams_equal(&mut a, &mut b).unwrap());
    }

    #[test]
    fn test_directory_and_file_with_same_name_are_unequal() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("media/", "", STORED), ("one.xml", "<one/>", STORED)]);

        let b = dir.path().join("b.zip");
        let mut zip = ZipWriter::new(File::create(&b).unwrap());
        let options = SimpleFileOptions::default().compression_method(STORED);
        zip.start_file("media/", options).unwrap();
        zip.start_file("one.xml", options).unwrap();
        zip.write_all(b"<one/>").unwrap();
        zip.finish().unwrap();

        assert!(!ArchiveComparator::equal(&a, &b).unwrap());
        assert!(!ArchiveComparator::equal(&b, &a).unwrap());

        let report = ArchiveComparator::compare(&a, &b).unwrap();
        assert_eq!(report.shared_entries, 2);
        assert_eq!(
            report.differences,
            vec![ArchiveDifference::DirectoryMismatch { name: "media/".into() }]
        );
    }

    #[test]
    fn test_corrupt_entry_names_archive_and_entry() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("doc.xml", "<w:t>old</w:t>", STORED)]);
        let b = write_zip(&dir, "b.zip", &[("doc.xml", "<w:t>new</w:t>", STORED)]);

        let mut bytes = std::fs::read(&a).unwrap();
        let at = bytes.windows(8).position(|w| w == b"<w:t>old").unwrap() + 6;
        bytes[at] = b'd';
        std::fs::write(&a, bytes).unwrap();

        let err = ArchiveComparator::compare(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Entry { ref path, ref name, .. } if path.ends_with("a.zip") && name == "doc.xml"
        ));
        assert!(err.to_string().contains("a.zip"));

        let err = ArchiveComparator::equal(&b, &a).unwrap_err();
        assert!(matches!(err, StoreError::Entry { ref path, .. } if path.ends_with("a.zip")));
    }

    #[test]
    fn test_unreadable_archive_names_the_file() {
        let dir = TempDir::new().unwrap();
        let a = write_zip(&dir, "a.zip", &[("one.xml", "<one/>", DEFLATED)]);
        let missing = dir.path().join("missing.zip");

        let err = ArchiveComparator::equal(&a, &missing).unwrap_err();
        assert!(matches!(err, StoreError::Archive { ref path, .. } if path.ends_with("missing.zip")));

        let garbage = dir.path().join("garbage.zip");
        std::fs::write(&garbage, b"not a zip at all").unwrap();
        let err = ArchiveComparator::equal(&garbage, &a).unwrap_err();
        assert!(matches!(err, StoreError::Archive { ref path, .. } if path.ends_with("garbage.zip")));
    }
}
