//! Filesystem capabilities consumed by the completion walk and listings.
//!
//! Both are traits so that directory walks can run against an in-memory tree
//! in tests:
//! - [`DirectorySource`] enumerates the children of a directory
//! - [`ImageSniffer`] decides whether a file is an image by looking at its bytes

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::transform::ImageDimensions;

/// Number of leading bytes handed to format detection.
const SNIFF_LEN: u64 = 64;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryChild {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirectoryChild {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// Enumerates directory contents.
pub trait DirectorySource {
    /// List the direct children of `dir`, in no particular order.
    fn list(&self, dir: &Path) -> std::io::Result<Vec<DirectoryChild>>;

    /// Whether a regular file exists at `path`.
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Resolve a directory to a canonical identity, following links.
    ///
    /// Two paths resolving to the same value are the same directory. Paths
    /// that cannot be resolved stand for themselves.
    fn resolve(&self, dir: &Path) -> PathBuf {
        std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
    }
}

/// [`DirectorySource`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectorySource;

impl DirectorySource for FsDirectorySource {
    fn list(&self, dir: &Path) -> std::io::Result<Vec<DirectoryChild>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let path = entry.path();
            // Follow symlinks so linked folders are walked like real ones
            let is_dir = path.is_dir();
            children.push(DirectoryChild { path, is_dir });
        }
        Ok(children)
    }
}

/// Decides whether a file holds an image.
pub trait ImageSniffer {
    fn is_image(&self, path: &Path) -> bool;
}

impl<F> ImageSniffer for F
where
    F: Fn(&Path) -> bool,
{
    fn is_image(&self, path: &Path) -> bool {
        self(path)
    }
}

/// [`ImageSniffer`] that sniffs the file's magic bytes.
///
/// File extensions are ignored entirely: `photo.txt` holding PNG data is an
/// image and `notes.jpg` holding text is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl ImageSniffer for MagicSniffer {
    fn is_image(&self, path: &Path) -> bool {
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        let read = std::fs::File::open(path).and_then(|f| f.take(SNIFF_LEN).read_to_end(&mut head));
        if let Err(e) = read {
            log::warn!("Failed to read {:?} for type check: {}", path, e);
            return false;
        }
        image::guess_format(&head).is_ok()
    }
}

/// Read an image's pixel dimensions from its header without decoding pixels.
pub fn read_image_dimensions(path: &Path) -> image::ImageResult<ImageDimensions> {
    let (width, height) = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ImageDimensions::new(width, height))
}
