//! Virtualized directory listing.
//!
//! A directory can hold tens of thousands of images. [`ListWindow`] keeps the
//! full sorted entry list but exposes only the slice that fits the available
//! height, and moves that slice in response to a proportional scroll
//! indicator. Nothing outside the slice is ever handed to a renderer.
//!
//! Invariants, with `window_size == min(capacity, len)`:
//! - `0 <= window_start <= max(0, len - window_size)`
//! - the visible slice is `entries[window_start..window_start + window_size]`

use std::path::PathBuf;

use crate::completion::CompletionData;
use crate::constants::SCROLL_STEP;

// ============================================================================
// Entries
// ============================================================================

/// What a listing row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// An image file
    File,
    /// A subdirectory containing at least one image
    Directory,
    /// The parent directory
    Backtrack,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    /// Full path of the file or directory
    pub path: PathBuf,
    /// Name shown in the listing, also the sort key
    pub display_name: String,
    pub kind: EntryKind,
    /// `{0|1, 1}` for files, recursive counts for directories
    pub completion: CompletionData,
    /// Set on the image currently open in the editor
    pub open: bool,
}

impl DirectoryEntry {
    pub fn file(path: impl Into<PathBuf>, name: impl Into<String>, done: bool) -> Self {
        Self {
            path: path.into(),
            display_name: name.into(),
            kind: EntryKind::File,
            completion: CompletionData::single(done),
            open: false,
        }
    }

    pub fn directory(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        completion: CompletionData,
    ) -> Self {
        Self {
            path: path.into(),
            display_name: name.into(),
            kind: EntryKind::Directory,
            completion,
            open: false,
        }
    }

    pub fn backtrack(parent: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: parent.into(),
            display_name: name.into(),
            kind: EntryKind::Backtrack,
            completion: CompletionData::default(),
            open: false,
        }
    }

    /// Builder-style setter for the open flag.
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Whether the entry opens as a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory | EntryKind::Backtrack)
    }

    /// Whether the entry counts as done. The backtrack entry never does.
    pub fn is_complete(&self) -> bool {
        self.kind != EntryKind::Backtrack && self.completion.is_complete()
    }
}

/// Sort entries: backtrack first, then by display name (case-sensitive).
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        (a.kind != EntryKind::Backtrack)
            .cmp(&(b.kind != EntryKind::Backtrack))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
}

// ============================================================================
// Scroll Indicator
// ============================================================================

/// Proportional scroll thumb over a vertical track.
///
/// The thumb's height is the visible share of the list; its position is kept
/// by its center, which is clamped so the thumb never leaves the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollIndicator {
    track_height: f32,
    ratio: f32,
    center: f32,
}

impl ScrollIndicator {
    pub fn new(track_height: f32) -> Self {
        Self {
            track_height: track_height.max(0.0),
            ratio: 1.0,
            center: 0.0,
        }
    }

    /// Visible share of the list, 1.0 when everything fits.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Whether there is anything to scroll.
    pub fn is_visible(&self) -> bool {
        self.ratio < 1.0
    }

    pub fn track_height(&self) -> f32 {
        self.track_height
    }

    /// Thumb height in pixels; zero while hidden.
    pub fn thumb_height(&self) -> f32 {
        if self.is_visible() {
            self.track_height * self.ratio
        } else {
            0.0
        }
    }

    pub fn center(&self) -> f32 {
        self.center
    }

    /// Top edge of the thumb.
    pub fn thumb_top(&self) -> f32 {
        self.center - self.thumb_height() / 2.0
    }

    /// Scroll fraction the thumb stands for, in `[0, 1 - ratio]`.
    pub fn fraction(&self) -> f32 {
        if self.track_height <= 0.0 {
            return 0.0;
        }
        (self.thumb_top() / self.track_height).clamp(0.0, 1.0)
    }

    /// Whether a track-relative y coordinate hits the thumb.
    pub fn contains(&self, y: f32) -> bool {
        let half = self.thumb_height() / 2.0;
        self.is_visible() && y >= self.center - half && y <= self.center + half
    }

    /// Move the thumb center, clamped to keep the thumb inside the track.
    fn set_center(&mut self, center: f32) {
        let half = self.thumb_height() / 2.0;
        let lowest = self.track_height - half;
        self.center = if center.is_nan() || center < half {
            half
        } else if center > lowest {
            lowest
        } else {
            center
        };
    }

    /// Hide the thumb and return it to the top.
    fn reset(&mut self) {
        self.ratio = 1.0;
        self.center = 0.0;
    }

    /// Match the thumb to a window showing `visible` of `total` entries from `start`.
    fn sync(&mut self, start: usize, visible: usize, total: usize) {
        if total == 0 || visible >= total {
            self.reset();
            return;
        }
        self.ratio = visible as f32 / total as f32;
        let top = self.track_height * (start as f32 / total as f32);
        self.set_center(top + self.thumb_height() / 2.0);
    }
}

// ============================================================================
// List Window
// ============================================================================

/// The sorted entries of one listing plus the slice currently on screen.
#[derive(Debug, Clone)]
pub struct ListWindow {
    entries: Vec<DirectoryEntry>,
    window_start: usize,
    window_len: usize,
    capacity: usize,
    item_height: f32,
    indicator: ScrollIndicator,
    /// Offset from the pointer to the thumb center while dragging
    grab_offset: Option<f32>,
    selected: Option<usize>,
}

/// How many rows of `item_height` fit in `available_height`.
pub fn capacity_for(available_height: f32, item_height: f32) -> usize {
    if item_height <= 0.0 || available_height.is_nan() {
        return 0;
    }
    // Float-to-int `as` saturates negatives at zero
    (available_height / item_height).floor() as usize
}

impl ListWindow {
    /// Create an empty window over `available_height` pixels.
    pub fn new(available_height: f32, item_height: f32) -> Self {
        Self {
            entries: Vec::new(),
            window_start: 0,
            window_len: 0,
            capacity: capacity_for(available_height, item_height),
            item_height,
            indicator: ScrollIndicator::new(available_height),
            grab_offset: None,
            selected: None,
        }
    }

    /// Replace all entries, sort them and show the first page.
    pub fn rebuild(&mut self, mut entries: Vec<DirectoryEntry>) {
        sort_entries(&mut entries);
        self.entries = entries;
        self.window_start = 0;
        self.window_len = self.capacity.min(self.entries.len());
        self.selected = None;
        self.grab_offset = None;
        self.sync_indicator();
        log::debug!(
            "List rebuilt: {} entries, {} visible",
            self.entries.len(),
            self.window_len
        );
    }

    /// Adapt to a new available height.
    ///
    /// Shrinking drops rows from the tail. Growing appends rows from the tail
    /// and, once the tail is exhausted, pulls the start back so the window
    /// stays full.
    pub fn resize(&mut self, available_height: f32) {
        self.capacity = capacity_for(available_height, self.item_height);
        self.indicator.track_height = available_height.max(0.0);

        if self.window_len > self.capacity {
            self.window_len = self.capacity;
        } else if self.window_len < self.capacity {
            let tail_room = self.entries.len() - self.window_start;
            self.window_len = self.capacity.min(tail_room);

            let wanted = self.capacity.min(self.entries.len());
            if self.window_len < wanted {
                let pull = (wanted - self.window_len).min(self.window_start);
                self.window_start -= pull;
                self.window_len += pull;
            }
        }

        self.sync_indicator();
    }

    /// Move the window to start at `floor(len * frac)`.
    ///
    /// The start is clamped so the window stays full. Returns false when the
    /// start did not change.
    pub fn scroll_to_fraction(&mut self, frac: f32) -> bool {
        let moved = self.apply_fraction(frac);
        if moved {
            self.sync_indicator();
        }
        moved
    }

    fn apply_fraction(&mut self, frac: f32) -> bool {
        let frac = if frac.is_nan() { 0.0 } else { frac.clamp(0.0, 1.0) };
        let total = self.entries.len();
        let size = self.capacity.min(total);
        let start = ((total as f32 * frac).floor() as usize).min(total - size);

        if start == self.window_start {
            return false;
        }
        self.window_start = start;
        self.window_len = size;
        log::trace!("List scrolled to {} of {}", start, total);
        true
    }

    /// Move the indicator by a pixel amount (positive scrolls down).
    pub fn scroll_by(&mut self, pixels: f32) -> bool {
        if !self.indicator.is_visible() {
            return false;
        }
        let center = self.indicator.center + pixels;
        self.move_indicator(center)
    }

    /// Step the indicator toward a track position, as on a click beside it.
    pub fn scroll_toward(&mut self, y: f32, step: f32) -> bool {
        if y > self.indicator.center {
            self.scroll_by(step)
        } else if y < self.indicator.center {
            self.scroll_by(-step)
        } else {
            false
        }
    }

    /// Pointer pressed on the track: grab the thumb or step toward the pointer.
    pub fn press_indicator(&mut self, y: f32) -> bool {
        if self.indicator.contains(y) {
            self.grab_offset = Some(self.indicator.center - y);
            false
        } else {
            self.scroll_toward(y, SCROLL_STEP)
        }
    }

    /// Pointer dragged on the track; moves the thumb only while grabbed.
    pub fn drag_indicator(&mut self, y: f32) -> bool {
        match self.grab_offset {
            Some(offset) => self.move_indicator(y + offset),
            None => false,
        }
    }

    /// Pointer released.
    pub fn release_indicator(&mut self) {
        self.grab_offset = None;
    }

    fn move_indicator(&mut self, center: f32) -> bool {
        self.indicator.set_center(center);
        self.apply_fraction(self.indicator.fraction())
    }

    fn sync_indicator(&mut self) {
        self.indicator
            .sync(self.window_start, self.window_len, self.entries.len());
    }

    /// Entry drawn at a y offset within the list area.
    pub fn entry_at_offset(&self, y: f32) -> Option<&DirectoryEntry> {
        self.index_at_offset(y).map(|i| &self.entries[i])
    }

    fn index_at_offset(&self, y: f32) -> Option<usize> {
        if self.item_height <= 0.0 || y.is_nan() || y < 0.0 {
            return None;
        }
        let row = (y / self.item_height).floor() as usize;
        (row < self.window_len).then_some(self.window_start + row)
    }

    /// Select the entry at a y offset. Misses keep the current selection.
    pub fn select_at_offset(&mut self, y: f32) -> Option<&DirectoryEntry> {
        let idx = self.index_at_offset(y)?;
        self.selected = Some(idx);
        Some(&self.entries[idx])
    }

    /// Select the entry at an index of the full sorted list.
    pub fn select_index(&mut self, idx: usize) -> Option<&DirectoryEntry> {
        let entry = self.entries.get(idx)?;
        self.selected = Some(idx);
        Some(entry)
    }

    /// Advance the selection along the full sorted order.
    ///
    /// Returns None, leaving the selection alone, when nothing is selected or
    /// the selection is already the last entry.
    pub fn select_next(&mut self) -> Option<&DirectoryEntry> {
        let next = self.selected? + 1;
        self.select_index(next)
    }

    pub fn selected(&self) -> Option<&DirectoryEntry> {
        self.selected.map(|i| &self.entries[i])
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Update entries in place without reordering, e.g. after a save.
    pub fn refresh(&mut self, mut update: impl FnMut(&mut DirectoryEntry)) {
        for entry in &mut self.entries {
            update(entry);
        }
    }

    /// Visible slice.
    pub fn window(&self) -> &[DirectoryEntry] {
        &self.entries[self.window_start..self.window_start + self.window_len]
    }

    /// All entries in sorted order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Number of visible entries.
    pub fn window_size(&self) -> usize {
        self.window_len
    }

    /// Rows that fit the available height.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether some entries are off screen.
    pub fn is_scrollable(&self) -> bool {
        self.entries.len() > self.capacity
    }

    /// Visible share of the list, 1.0 when everything fits.
    pub fn indicator_ratio(&self) -> f32 {
        if self.entries.is_empty() {
            1.0
        } else {
            self.window_len as f32 / self.entries.len() as f32
        }
    }

    pub fn indicator(&self) -> &ScrollIndicator {
        &self.indicator
    }
}

// ============================================================================
// Tests
// ============================================================================
