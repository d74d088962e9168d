//! Annotation session and its undo/redo history.
//!
//! A session holds the rectangles of the currently open image together with
//! the history needed to step back and forth through edits. History is two
//! ordered stacks plus one flag:
//! - `committed`: rectangles currently on the image (most recent first)
//! - `redo_buffer`: rectangles that were undone or deleted (most recent first)
//! - `cleared_last`: whether the last history-affecting action was a clear
//!
//! A clear moves everything into the redo buffer at once. Only undo can bring
//! it back, and only until the next draw, which forfeits the cleared set for
//! good.

use std::collections::VecDeque;

use crate::annotation::{Point, Rect, RectKind};

// ============================================================================
// Session
// ============================================================================

/// Rectangles and edit history of one open image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSession {
    committed: VecDeque<Rect>,
    redo_buffer: VecDeque<Rect>,
    cleared_last: bool,
}

impl AnnotationSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session holding previously saved rectangles.
    ///
    /// `rects` is expected in committed order (most recent first), which is
    /// the order save files are written in.
    pub fn with_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            committed: rects.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Replace all contents with persisted rectangles, dropping any history.
    pub fn load(&mut self, rects: impl IntoIterator<Item = Rect>) {
        *self = Self::with_rects(rects);
        log::debug!("📝 Session: loaded {} rectangles", self.committed.len());
    }

    /// Commit a newly drawn rectangle.
    pub fn draw(&mut self, rect: Rect) {
        self.forfeit_clear();
        self.committed.push_front(rect);
        log::debug!(
            "📝 Session: drew {} at ({:.1}, {:.1})",
            rect.kind.name(),
            rect.x,
            rect.y
        );
    }

    /// Mark the start of a draw gesture.
    ///
    /// Starting to draw forfeits a pending clear exactly like committing a
    /// rectangle does, even if the gesture is later discarded.
    pub fn begin_draw(&mut self) {
        self.forfeit_clear();
    }

    fn forfeit_clear(&mut self) {
        if self.cleared_last {
            log::debug!(
                "🗑️ Session: dropped {} cleared rectangles",
                self.redo_buffer.len()
            );
            self.redo_buffer.clear();
            self.cleared_last = false;
        }
    }

    /// Undo the last clear, or the most recently drawn rectangle.
    pub fn undo(&mut self) {
        if self.cleared_last {
            self.committed = std::mem::take(&mut self.redo_buffer);
            self.cleared_last = false;
            log::debug!("⏪ Session: restored {} cleared rectangles", self.committed.len());
        } else if let Some(rect) = self.committed.pop_front() {
            self.redo_buffer.push_front(rect);
            log::debug!("⏪ Session: undid {}", rect.kind.name());
        }
    }

    /// Redo the most recently undone or deleted rectangle.
    ///
    /// Does nothing right after a clear.
    pub fn redo(&mut self) {
        if self.cleared_last {
            return;
        }
        if let Some(rect) = self.redo_buffer.pop_front() {
            self.committed.push_front(rect);
            log::debug!("⏩ Session: redid {}", rect.kind.name());
        }
    }

    /// Remove every rectangle, keeping them for a single undo.
    pub fn clear(&mut self) {
        self.redo_buffer = self.committed.clone();
        self.committed.clear();
        self.cleared_last = true;
        log::debug!("🗑️ Session: cleared {} rectangles", self.redo_buffer.len());
    }

    /// Remove every rectangle containing `point`.
    ///
    /// Removed rectangles go to the front of the redo buffer in the order they
    /// were found. Returns how many were removed.
    pub fn delete_at(&mut self, point: Point) -> usize {
        let before = self.committed.len();
        let mut kept = VecDeque::with_capacity(before);
        for rect in self.committed.drain(..) {
            if rect.contains(point) {
                self.redo_buffer.push_front(rect);
            } else {
                kept.push_back(rect);
            }
        }
        self.committed = kept;

        let removed = before - self.committed.len();
        if removed > 0 {
            log::debug!(
                "🗑️ Session: deleted {} rectangles at ({:.1}, {:.1})",
                removed,
                point.x,
                point.y
            );
        }
        removed
    }

    /// Committed rectangles, most recent first.
    pub fn rects(&self) -> impl ExactSizeIterator<Item = &Rect> {
        self.committed.iter()
    }

    /// Redo buffer contents, next-to-redo first.
    pub fn redo_rects(&self) -> impl ExactSizeIterator<Item = &Rect> {
        self.redo_buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_buffer.len()
    }

    pub fn cleared_last(&self) -> bool {
        self.cleared_last
    }

    /// Check if undo would change anything.
    pub fn can_undo(&self) -> bool {
        self.cleared_last || !self.committed.is_empty()
    }

    /// Check if redo would change anything.
    pub fn can_redo(&self) -> bool {
        !self.cleared_last && !self.redo_buffer.is_empty()
    }
}

// ============================================================================
// Draw Gesture
// ============================================================================

/// An in-progress rubber-band rectangle.
///
/// The anchor is where the pointer went down; the rectangle always spans the
/// anchor and the latest pointer position, whichever direction it was dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawGesture {
    anchor: Point,
    current: Point,
    kind: RectKind,
}

impl DrawGesture {
    pub fn start(anchor: Point, kind: RectKind) -> Self {
        Self {
            anchor,
            current: anchor,
            kind,
        }
    }

    /// Move the free corner.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// The rectangle as currently drawn.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.anchor, self.current, self.kind)
    }

    /// Finish the gesture, keeping the rectangle only if it is large enough.
    pub fn finish(self, min_area: f32) -> Option<Rect> {
        let rect = self.rect();
        if rect.area() >= min_area {
            Some(rect)
        } else {
            log::trace!(
                "Gesture discarded: area {:.1} below {:.1}",
                rect.area(),
                min_area
            );
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
