//! Directory explorer.
//!
//! Lists one directory of the image tree at a time: a backtrack entry to the
//! parent (except at the image root), every subdirectory that holds at least
//! one image somewhere below it, and every image file. Each entry carries its
//! completion so the listing can show progress at a glance.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::completion::{CompletionAggregator, CompletionData, EnumerationFailure};
use crate::constants::BACKTRACK_NAME;
use crate::editor::{EditorError, ImageEditor};
use crate::list_window::{DirectoryEntry, EntryKind, ListWindow};
use crate::source::{DirectorySource, ImageSniffer, read_image_dimensions};

/// Errors raised while navigating the image tree.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Directory {path:?} is outside image root {root:?}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Failed to list {path:?}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// An image the explorer wants opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub path: PathBuf,
    /// Whether a save file exists, so saved rectangles should be loaded
    pub completed: bool,
}

/// Browses the image root and tracks per-entry completion.
pub struct Explorer {
    image_root: PathBuf,
    save_root: PathBuf,
    current_dir: PathBuf,
    list: ListWindow,
    source: Box<dyn DirectorySource>,
    sniffer: Box<dyn ImageSniffer>,
    /// Subdirectories skipped by the last listing or reload
    failures: Vec<EnumerationFailure>,
    /// Image last opened in the editor through this explorer
    open_image: Option<PathBuf>,
}

impl Explorer {
    /// Create an explorer positioned at the image root.
    pub fn new(
        image_root: impl Into<PathBuf>,
        save_root: impl Into<PathBuf>,
        source: Box<dyn DirectorySource>,
        sniffer: Box<dyn ImageSniffer>,
        available_height: f32,
        item_height: f32,
    ) -> Result<Self, ExplorerError> {
        let image_root = image_root.into();
        let mut explorer = Self {
            current_dir: image_root.clone(),
            image_root,
            save_root: save_root.into(),
            list: ListWindow::new(available_height, item_height),
            source,
            sniffer,
            failures: Vec::new(),
            open_image: None,
        };
        let root = explorer.image_root.clone();
        explorer.set_dir(&root)?;
        Ok(explorer)
    }

    fn aggregator(&self) -> CompletionAggregator<'_> {
        CompletionAggregator::new(
            &self.image_root,
            &self.save_root,
            self.source.as_ref(),
            self.sniffer.as_ref(),
        )
    }

    /// Enter a directory and rebuild the listing.
    ///
    /// Directories outside the image root are refused. On failure the current
    /// listing is kept.
    pub fn set_dir(&mut self, dir: &Path) -> Result<(), ExplorerError> {
        if !dir.starts_with(&self.image_root) {
            log::warn!("Refusing to leave image root for {:?}", dir);
            return Err(ExplorerError::OutsideRoot {
                path: dir.to_path_buf(),
                root: self.image_root.clone(),
            });
        }

        let (entries, failures) = self.build_entries(dir)?;
        self.current_dir = dir.to_path_buf();
        self.failures = failures;
        self.list.rebuild(entries);

        log::info!(
            "Listing {:?}: {} entries, {} unreadable subdirectories",
            self.current_dir,
            self.list.len(),
            self.failures.len()
        );
        Ok(())
    }

    fn build_entries(
        &self,
        dir: &Path,
    ) -> Result<(Vec<DirectoryEntry>, Vec<EnumerationFailure>), ExplorerError> {
        let children = self
            .source
            .list(dir)
            .map_err(|source| ExplorerError::Listing {
                path: dir.to_path_buf(),
                source,
            })?;
        let aggregator = self.aggregator();

        let mut entries = Vec::with_capacity(children.len() + 1);
        let mut failures = Vec::new();

        if dir != self.image_root {
            if let Some(parent) = dir.parent() {
                entries.push(DirectoryEntry::backtrack(parent, BACKTRACK_NAME));
            }
        }

        for child in children {
            let name = display_name(&child.path);
            if child.is_dir {
                let agg = aggregator.aggregate(&child.path);
                failures.extend(agg.failures);
                if agg.completion.total > 0 {
                    entries.push(DirectoryEntry::directory(child.path, name, agg.completion));
                }
            } else if aggregator.is_image(&child.path) {
                let done = aggregator.image_completed(&child.path);
                let open = self.open_image.as_deref() == Some(child.path.as_path());
                entries.push(DirectoryEntry::file(child.path, name, done).with_open(open));
            }
        }

        Ok((entries, failures))
    }

    /// Recompute the completion of every listed entry, keeping order and scroll.
    pub fn reload(&mut self) {
        let aggregator = CompletionAggregator::new(
            &self.image_root,
            &self.save_root,
            self.source.as_ref(),
            self.sniffer.as_ref(),
        );
        let mut failures = Vec::new();

        self.list.refresh(|entry| match entry.kind {
            EntryKind::File => {
                entry.completion = CompletionData::single(aggregator.image_completed(&entry.path));
            }
            EntryKind::Directory => {
                let agg = aggregator.aggregate(&entry.path);
                failures.extend(agg.failures);
                entry.completion = agg.completion;
            }
            EntryKind::Backtrack => {}
        });

        self.failures = failures;
        log::debug!("Reloaded completion for {:?}", self.current_dir);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Act on the selected entry.
    ///
    /// Directories are entered and yield None; images are returned for the
    /// caller to open.
    pub fn open_selected(&mut self) -> Result<Option<ImageTarget>, ExplorerError> {
        let Some(entry) = self.list.selected() else {
            return Ok(None);
        };
        let (kind, path, completed) = (
            entry.kind,
            entry.path.clone(),
            entry.completion.is_complete(),
        );

        match kind {
            EntryKind::File => Ok(Some(ImageTarget { path, completed })),
            EntryKind::Directory | EntryKind::Backtrack => {
                self.set_dir(&path)?;
                Ok(None)
            }
        }
    }

    /// Select the entry under a y offset and act on it, as on a double click.
    pub fn open_at_offset(&mut self, y: f32) -> Result<Option<ImageTarget>, ExplorerError> {
        if self.list.select_at_offset(y).is_none() {
            return Ok(None);
        }
        self.open_selected()
    }

    /// Move the selection one entry forward.
    ///
    /// Returns the newly selected image, or None when the selection could not
    /// move or landed on a directory.
    pub fn select_next_image(&mut self) -> Option<ImageTarget> {
        let entry = self.list.select_next()?;
        (entry.kind == EntryKind::File).then(|| ImageTarget {
            path: entry.path.clone(),
            completed: entry.completion.is_complete(),
        })
    }

    /// Open a target in the editor, loading saved rectangles for completed images.
    ///
    /// The listing's open flag follows whatever the editor holds afterwards.
    pub fn open_in(
        &mut self,
        editor: &mut ImageEditor,
        target: &ImageTarget,
    ) -> Result<bool, ExplorerError> {
        let opened = Self::load_into(editor, target);
        self.mark_open(editor.image().map(|img| img.path.clone()));
        opened
    }

    fn load_into(editor: &mut ImageEditor, target: &ImageTarget) -> Result<bool, ExplorerError> {
        if !target.completed {
            return Ok(editor.open_image_file(&target.path)?);
        }
        if editor.is_open(&target.path) {
            return Ok(false);
        }
        let dimensions =
            read_image_dimensions(&target.path).map_err(|source| EditorError::Image {
                path: target.path.clone(),
                source,
            })?;
        Ok(editor.open_completed_image(&target.path, dimensions)?)
    }

    /// Record which image is open and flag its listing entry.
    pub fn mark_open(&mut self, path: Option<PathBuf>) {
        self.list
            .refresh(|entry| entry.open = path.as_ref() == Some(&entry.path));
        if path != self.open_image {
            log::debug!("Open image: {:?}", path);
        }
        self.open_image = path;
    }

    /// Save the open image, refresh completion and open the next image.
    ///
    /// Returns the image that was opened, if any.
    pub fn save_and_next(
        &mut self,
        editor: &mut ImageEditor,
    ) -> Result<Option<ImageTarget>, ExplorerError> {
        editor.save()?;
        self.reload();

        let Some(target) = self.select_next_image() else {
            return Ok(None);
        };
        self.open_in(editor, &target)?;
        Ok(Some(target))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    pub fn save_root(&self) -> &Path {
        &self.save_root
    }

    pub fn at_root(&self) -> bool {
        self.current_dir == self.image_root
    }

    pub fn list(&self) -> &ListWindow {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListWindow {
        &mut self.list
    }

    pub fn open_image(&self) -> Option<&Path> {
        self.open_image.as_deref()
    }

    /// Subdirectories that could not be listed, counted as empty.
    pub fn failures(&self) -> &[EnumerationFailure] {
        &self.failures
    }

    /// Completion of everything in the current directory.
    pub fn completion(&self) -> CompletionData {
        self.list
            .entries()
            .iter()
            .filter(|e| e.kind != EntryKind::Backtrack)
            .map(|e| e.completion)
            .sum()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, RectKind};
    use crate::editor::EditMode;
    use crate::format::FormatError;
    use crate::source::{FsDirectorySource, MagicSniffer};
    use crate::test_image::ScratchDir;

    const ITEM: f32 = 30.0;

    fn explorer_for(dir: &ScratchDir) -> Explorer {
        Explorer::new(
            dir.join("images"),
            dir.join("saves"),
            Box::new(FsDirectorySource),
            Box::new(MagicSniffer),
            10.0 * ITEM,
            ITEM,
        )
        .unwrap()
    }

    fn names(explorer: &Explorer) -> Vec<String> {
        explorer
            .list()
            .entries()
            .iter()
            .map(|e| e.display_name.clone())
            .collect()
    }

    /// images/
    ///   b.png (done), a.png, notes.txt, empty/, docs/readme.md,
    ///   set/ { c.png (done), d.png, deep/e.png }
    fn tree() -> ScratchDir {
        let dir = ScratchDir::new("explorer");
        dir.png_stub("images/b.png");
        dir.png_stub("images/a.png");
        dir.file("images/notes.txt", b"not an image");
        dir.mkdir("images/empty");
        dir.file("images/docs/readme.md", b"# docs");
        dir.png_stub("images/set/c.png");
        dir.png_stub("images/set/d.png");
        dir.png_stub("images/set/deep/e.png");
        dir.file("saves/b.txt", b"b.png\n1,1\n0\n");
        dir.file("saves/set/c.txt", b"set/c.png\n1,1\n0\n");
        dir
    }

    #[test]
    fn test_root_listing() {
        let dir = tree();
        let ex = explorer_for(&dir);
        assert!(ex.at_root());
        // No backtrack at the root; image-free directories are hidden
        assert_eq!(names(&ex), vec!["a.png", "b.png", "set"]);

        let entries = ex.list().entries();
        assert_eq!(entries[0].completion, CompletionData::new(0, 1));
        assert_eq!(entries[1].completion, CompletionData::new(1, 1));
        assert_eq!(entries[2].kind, EntryKind::Directory);
        assert_eq!(entries[2].completion, CompletionData::new(1, 3));
        assert_eq!(ex.completion(), CompletionData::new(2, 5));
        assert!(ex.failures().is_empty());
    }

    #[test]
    fn test_enter_and_leave_subdirectory() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        ex.set_dir(&dir.join("images/set")).unwrap();
        assert_eq!(names(&ex), vec!["..", "c.png", "d.png", "deep"]);
        assert_eq!(ex.list().entries()[0].path, dir.join("images"));

        // Backtrack entry is selectable and leads back up
        ex.list_mut().select_index(0);
        assert_eq!(ex.open_selected().unwrap(), None);
        assert!(ex.at_root());
    }

    #[test]
    fn test_cannot_leave_image_root() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        let err = ex.set_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ExplorerError::OutsideRoot { .. }));
        assert!(ex.at_root());
        assert_eq!(ex.list().len(), 3);
    }

    #[test]
    fn test_missing_directory_keeps_listing() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        let err = ex.set_dir(&dir.join("images/gone")).unwrap_err();
        assert!(matches!(err, ExplorerError::Listing { .. }));
        assert!(ex.at_root());
    }

    #[test]
    fn test_open_selected_image() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        let target = ex.open_at_offset(1.5 * ITEM).unwrap().unwrap();
        assert_eq!(target.path, dir.join("images/b.png"));
        assert!(target.completed);

        assert_eq!(ex.open_at_offset(2.5 * ITEM).unwrap(), None);
        assert_eq!(ex.current_dir(), dir.join("images/set"));
    }

    #[test]
    fn test_select_next_image() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        assert!(ex.select_next_image().is_none());

        ex.list_mut().select_index(0);
        let next = ex.select_next_image().unwrap();
        assert_eq!(next.path, dir.join("images/b.png"));
        // Next entry is a directory
        assert!(ex.select_next_image().is_none());
        assert_eq!(ex.list().selected_index(), Some(2));
        // End of list
        assert!(ex.select_next_image().is_none());
        assert_eq!(ex.list().selected_index(), Some(2));
    }

    #[test]
    fn test_reload_after_save_updates_completion() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        dir.file("saves/a.txt", b"a.png\n1,1\n0\n");
        dir.file("saves/set/deep/e.txt", b"deep/e.png\n1,1\n0\n");
        ex.list_mut().scroll_to_fraction(0.5);

        ex.reload();
        let entries = ex.list().entries();
        assert!(entries[0].is_complete());
        assert_eq!(entries[2].completion, CompletionData::new(2, 3));
        assert_eq!(names(&ex), vec!["a.png", "b.png", "set"]);
    }

    #[test]
    fn test_save_and_next() {
        let dir = ScratchDir::new("explorer_next");
        dir.png("images/one.png", 40, 20);
        dir.png("images/two.png", 20, 40);
        let mut ex = explorer_for(&dir);

        let mut editor = ImageEditor::new(dir.join("images"), dir.join("saves"));
        editor.resize_container(80, 80);
        editor.set_mode(Some(EditMode::Draw(RectKind::Primary)));

        ex.list_mut().select_index(0);
        let first = ex.open_selected().unwrap().unwrap();
        assert!(ex.open_in(&mut editor, &first).unwrap());

        // Scale 2, image drawn at y in [20, 60]
        editor.pointer_pressed(Point::new(5.0, 22.0));
        editor.pointer_dragged(Point::new(15.0, 32.0));
        editor.pointer_released();
        assert_eq!(editor.session().len(), 1);

        let next = ex.save_and_next(&mut editor).unwrap().unwrap();
        assert_eq!(next.path, dir.join("images/two.png"));
        assert!(editor.is_open(&dir.join("images/two.png")));
        assert!(editor.session().is_empty());
        assert!(ex.list().entries()[0].is_complete());

        // Coming back to the first image loads its saved rectangle
        let first = ImageTarget {
            path: dir.join("images/one.png"),
            completed: true,
        };
        assert!(ex.open_in(&mut editor, &first).unwrap());
        assert_eq!(editor.session().len(), 1);
    }

    #[test]
    fn test_save_and_next_without_image_fails() {
        let dir = tree();
        let mut ex = explorer_for(&dir);
        let mut editor = ImageEditor::new(dir.join("images"), dir.join("saves"));
        let err = ex.save_and_next(&mut editor).unwrap_err();
        assert!(matches!(err, ExplorerError::Editor(EditorError::NoImage)));
    }

    #[test]
    fn test_broken_save_surfaces_as_error() {
        let dir = ScratchDir::new("explorer_broken");
        dir.png("images/pic.png", 8, 8);
        dir.file("saves/pic.txt", b"pic.png\n8,8\n1\n1,2\n");
        let mut ex = explorer_for(&dir);
        let mut editor = ImageEditor::new(dir.join("images"), dir.join("saves"));

        let target = ImageTarget {
            path: dir.join("images/pic.png"),
            completed: true,
        };
        let err = ex.open_in(&mut editor, &target).unwrap_err();
        assert!(matches!(
            err,
            ExplorerError::Editor(EditorError::Format(FormatError::Malformed { line: 4, .. }))
        ));
        assert!(editor.image().is_none());
        assert!(ex.list().entries().iter().all(|e| !e.open));
    }

    fn open_flags(explorer: &Explorer) -> Vec<bool> {
        explorer.list().entries().iter().map(|e| e.open).collect()
    }

    #[test]
    fn test_open_flag_follows_editor() {
        let dir = ScratchDir::new("explorer_open");
        dir.png("images/a.png", 40, 20);
        dir.png("images/b.png", 20, 40);
        dir.png("images/set/c.png", 10, 10);
        let mut ex = explorer_for(&dir);
        let mut editor = ImageEditor::new(dir.join("images"), dir.join("saves"));
        assert_eq!(open_flags(&ex), vec![false, false, false]);

        ex.list_mut().select_index(0);
        let first = ex.open_selected().unwrap().unwrap();
        ex.open_in(&mut editor, &first).unwrap();
        assert_eq!(open_flags(&ex), vec![true, false, false]);
        assert_eq!(ex.open_image(), Some(dir.join("images/a.png").as_path()));

        let second = ex.select_next_image().unwrap();
        ex.open_in(&mut editor, &second).unwrap();
        assert_eq!(open_flags(&ex), vec![false, true, false]);

        // Reopening the same image keeps the flag
        assert!(!ex.open_in(&mut editor, &second).unwrap());
        assert_eq!(open_flags(&ex), vec![false, true, false]);

        // The flag survives leaving and re-entering the directory
        ex.set_dir(&dir.join("images/set")).unwrap();
        assert_eq!(open_flags(&ex), vec![false, false]);
        ex.set_dir(&dir.join("images")).unwrap();
        assert_eq!(open_flags(&ex), vec![false, true, false]);
    }

    #[test]
    fn test_save_and_next_moves_open_flag() {
        let dir = ScratchDir::new("explorer_open_next");
        dir.png("images/one.png", 40, 20);
        dir.png("images/two.png", 20, 40);
        let mut ex = explorer_for(&dir);
        let mut editor = ImageEditor::new(dir.join("images"), dir.join("saves"));

        ex.list_mut().select_index(0);
        let first = ex.open_selected().unwrap().unwrap();
        ex.open_in(&mut editor, &first).unwrap();
        ex.save_and_next(&mut editor).unwrap().unwrap();

        assert_eq!(open_flags(&ex), vec![false, true]);
        assert!(ex.list().entries()[0].is_complete());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_listed_once() {
        let dir = ScratchDir::new("explorer_loop");
        dir.png_stub("images/sub/a.png");
        std::os::unix::fs::symlink(dir.join("images/sub"), dir.join("images/sub/loop")).unwrap();

        let ex = explorer_for(&dir);
        assert_eq!(names(&ex), vec!["sub"]);
        assert_eq!(ex.list().entries()[0].completion, CompletionData::new(0, 1));
        assert_eq!(ex.failures().len(), 1);
        assert_eq!(ex.failures()[0].path, dir.join("images/sub/loop"));
    }
}
