//! File I/O: discovering markdown files under a project root and reading
//! them into resource metadata.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::domain::ResourceMetadata;
use crate::infra::content_hash::ContentHash;
use crate::infra::markdown::extract_with_checksum;
use crate::infra::paths::to_project_path;

/// Errors during file system operations on resources.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },
}

impl FsError {
    /// Creates an appropriate FsError from an io::Error.
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// A document's decoded text together with facts about its raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceText {
    /// UTF-8 text with any byte order mark removed.
    pub text: String,
    /// Hash of the raw bytes as read from disk.
    pub checksum: ContentHash,
    /// Length of the raw bytes.
    pub size_bytes: usize,
}

/// Reads and decodes a document.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the file doesn't exist.
/// Returns `FsError::PermissionDenied` if access is denied.
/// Returns `FsError::InvalidEncoding` if the file is not valid UTF-8.
pub fn read_source(path: &Path) -> Result<SourceText, FsError> {
    let bytes = std::fs::read(path).map_err(|e| FsError::from_io(path, e))?;
    decode_source(bytes, path)
}

/// Decodes already-read bytes.
///
/// The checksum covers the raw bytes, before BOM stripping, so it matches
/// what any other tool hashing the file would see.
///
/// # Errors
///
/// Returns `FsError::InvalidEncoding` for UTF-16 byte order marks and
/// invalid UTF-8.
pub fn decode_source(bytes: Vec<u8>, path: &Path) -> Result<SourceText, FsError> {
    let checksum = ContentHash::compute(&bytes);
    let size_bytes = bytes.len();

    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(FsError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 LE detected (byte order mark FF FE); convert to UTF-8".into(),
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(FsError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 BE detected (byte order mark FE FF); convert to UTF-8".into(),
        });
    }

    let mut text = String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;
    if text.starts_with('\u{FEFF}') {
        text.drain(..'\u{FEFF}'.len_utf8());
    }

    Ok(SourceText {
        text,
        checksum,
        size_bytes,
    })
}

/// Reads the document at `relative` (under `root`) into resource metadata.
///
/// Parse-local problems such as broken frontmatter end up in the metadata;
/// only I/O and encoding failures are errors.
pub fn read_resource(root: &Path, relative: &Path) -> Result<ResourceMetadata, FsError> {
    let source = read_source(&root.join(relative))?;
    let extracted = extract_with_checksum(&source.text, source.checksum, source.size_bytes);
    Ok(ResourceMetadata::from_extracted(
        to_project_path(relative),
        extracted,
    ))
}

/// Scans a directory recursively for markdown (.md) files.
///
/// Skips hidden files and directories (starting with `.`), which keeps
/// `.git/` and editor state out of the corpus.
///
/// Returns paths relative to the input directory, sorted.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the directory doesn't exist.
/// Returns `FsError::NotADirectory` if the path is not a directory.
pub fn scan_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    if !dir.exists() {
        return Err(FsError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(FsError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(has_md_extension)
        .filter_map(|e| e.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect();
    paths.sort();

    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn has_md_extension(entry: &DirEntry) -> bool {
    entry.path().extension().is_some_and(|e| e == "md")
}
