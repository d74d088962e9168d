//! Recursive annotation progress per directory.
//!
//! An image is complete when its save file exists. A directory's completion is
//! the sum over every image below it, at any depth. The walk is a pure
//! function of the injected [`DirectorySource`] and [`ImageSniffer`]; a directory
//! that cannot be listed contributes nothing and is reported back instead of
//! aborting the walk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::format::save_path_for;
use crate::source::{DirectorySource, ImageSniffer};

/// Completed vs total image counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionData {
    pub completed: usize,
    pub total: usize,
}

impl CompletionData {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion of a single image.
    pub fn single(done: bool) -> Self {
        Self::new(usize::from(done), 1)
    }

    /// Fraction of completed images, 0.0 when there are none.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl std::ops::Add for CompletionData {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.completed + other.completed, self.total + other.total)
    }
}

impl std::ops::AddAssign for CompletionData {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for CompletionData {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}

impl std::fmt::Display for CompletionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

/// A directory that could not be listed during a walk.
#[derive(Error, Debug)]
#[error("Failed to list {path:?}: {source}")]
pub struct EnumerationFailure {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Result of a completion walk.
#[derive(Debug, Default)]
pub struct Aggregate {
    /// Counts over every listable directory in the subtree
    pub completion: CompletionData,
    /// Directories that were skipped, counted as empty
    pub failures: Vec<EnumerationFailure>,
}

impl Aggregate {
    fn failed(path: &Path, source: std::io::Error) -> Self {
        Self {
            completion: CompletionData::default(),
            failures: vec![EnumerationFailure {
                path: path.to_path_buf(),
                source,
            }],
        }
    }

    fn absorb(&mut self, other: Aggregate) {
        self.completion += other.completion;
        self.failures.extend(other.failures);
    }
}

/// Computes completion for images and directories under one image root.
pub struct CompletionAggregator<'a> {
    image_root: &'a Path,
    save_root: &'a Path,
    source: &'a dyn DirectorySource,
    sniffer: &'a dyn ImageSniffer,
}

impl<'a> CompletionAggregator<'a> {
    pub fn new(
        image_root: &'a Path,
        save_root: &'a Path,
        source: &'a dyn DirectorySource,
        sniffer: &'a dyn ImageSniffer,
    ) -> Self {
        Self {
            image_root,
            save_root,
            source,
            sniffer,
        }
    }

    /// Whether an image's save file exists.
    pub fn image_completed(&self, image_path: &Path) -> bool {
        match save_path_for(self.image_root, self.save_root, image_path) {
            Ok(save_path) => self.source.file_exists(&save_path),
            Err(e) => {
                log::warn!("No save path for {:?}: {}", image_path, e);
                false
            }
        }
    }

    /// Whether a file is an image.
    pub fn is_image(&self, path: &Path) -> bool {
        self.sniffer.is_image(path)
    }

    /// Recursively count completed and total images under `dir`.
    ///
    /// A subdirectory that links back to one of its own ancestors is not
    /// entered again; it counts as empty and is reported as a failure.
    pub fn aggregate(&self, dir: &Path) -> Aggregate {
        let mut ancestors = vec![self.source.resolve(dir)];
        self.aggregate_below(dir, &mut ancestors)
    }

    fn aggregate_below(&self, dir: &Path, ancestors: &mut Vec<PathBuf>) -> Aggregate {
        let children = match self.source.list(dir) {
            Ok(children) => children,
            Err(source) => {
                log::warn!("Failed to list {:?}: {}", dir, source);
                return Aggregate::failed(dir, source);
            }
        };

        let mut result = Aggregate::default();
        for child in children {
            if child.is_dir {
                let resolved = self.source.resolve(&child.path);
                if ancestors.contains(&resolved) {
                    log::warn!("Skipping {:?}: links back to {:?}", child.path, resolved);
                    let cycle = std::io::Error::other(format!(
                        "directory cycle through {}",
                        resolved.display()
                    ));
                    result.absorb(Aggregate::failed(&child.path, cycle));
                    continue;
                }
                ancestors.push(resolved);
                result.absorb(self.aggregate_below(&child.path, ancestors));
                ancestors.pop();
            } else if self.sniffer.is_image(&child.path) {
                result.completion += CompletionData::single(self.image_completed(&child.path));
            }
        }

        log::trace!("Completion of {:?}: {}", dir, result.completion);
        result
    }
}
