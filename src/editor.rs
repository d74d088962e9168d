//! Image editor controller.
//!
//! Owns the open image, its fit into the container and the annotation session,
//! and turns view-space pointer events into session edits. Rectangles are
//! stored in image space so they survive container resizes unchanged; the
//! minimum-area gate is applied to the gesture in view space, at the size the
//! user actually drew.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::annotation::{Point, Rect, RectKind};
use crate::constants::MIN_RECT_AREA;
use crate::format::{FormatError, SaveRecord, read_save_file, relative_image_path, save_path_for};
use crate::session::{AnnotationSession, DrawGesture};
use crate::source::read_image_dimensions;
use crate::transform::{
    ImageDimensions, ScaleState, TransformError, point_to_image_space, to_image_space,
    to_view_space,
};

/// Errors raised by editor operations.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No image is open")]
    NoImage,

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// What a pointer press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Draw rectangles of the given kind
    Draw(RectKind),
    /// Remove every rectangle under the pointer
    Delete,
}

/// The image currently open in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenImage {
    pub path: PathBuf,
    pub dimensions: ImageDimensions,
}

/// Editing state for one image at a time.
#[derive(Debug)]
pub struct ImageEditor {
    image_root: PathBuf,
    save_root: PathBuf,
    container: ImageDimensions,
    image: Option<OpenImage>,
    scale: Option<ScaleState>,
    session: AnnotationSession,
    /// In-progress rectangle, in view space
    gesture: Option<DrawGesture>,
    mode: Option<EditMode>,
    min_rect_area: f32,
}

impl ImageEditor {
    pub fn new(image_root: impl Into<PathBuf>, save_root: impl Into<PathBuf>) -> Self {
        Self {
            image_root: image_root.into(),
            save_root: save_root.into(),
            container: ImageDimensions::new(0, 0),
            image: None,
            scale: None,
            session: AnnotationSession::new(),
            gesture: None,
            mode: None,
            min_rect_area: MIN_RECT_AREA,
        }
    }

    /// Override the minimum area a drawn rectangle needs, in view pixels.
    pub fn with_min_rect_area(mut self, area: f32) -> Self {
        self.min_rect_area = area;
        self
    }

    // ========================================================================
    // Opening
    // ========================================================================

    /// Open an image with known dimensions, starting an empty session.
    ///
    /// Reopening the image that is already open keeps its unsaved edits.
    /// Returns false in that case.
    pub fn open_image(&mut self, path: impl Into<PathBuf>, dimensions: ImageDimensions) -> bool {
        let path = path.into();
        if self.image.as_ref().is_some_and(|img| img.path == path) {
            log::debug!("{:?} already open, keeping session", path);
            return false;
        }

        log::info!(
            "Opened {:?} ({}x{})",
            path,
            dimensions.width,
            dimensions.height
        );
        self.image = Some(OpenImage { path, dimensions });
        self.session = AnnotationSession::new();
        self.gesture = None;
        self.refit();
        true
    }

    /// Open an image, reading its dimensions from the file.
    pub fn open_image_file(&mut self, path: &Path) -> Result<bool, EditorError> {
        if self.is_open(path) {
            return Ok(false);
        }
        let dimensions = read_image_dimensions(path).map_err(|source| EditorError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.open_image(path, dimensions))
    }

    /// Open an already annotated image together with its saved rectangles.
    ///
    /// If the save file cannot be read the editor is left exactly as it was.
    pub fn open_completed_image(
        &mut self,
        path: impl Into<PathBuf>,
        dimensions: ImageDimensions,
    ) -> Result<bool, EditorError> {
        let path = path.into();
        if self.is_open(&path) {
            return Ok(false);
        }

        let save_path = save_path_for(&self.image_root, &self.save_root, &path)?;
        let rects = read_save_file(&save_path)?;

        self.open_image(path, dimensions);
        self.session.load(rects);
        Ok(true)
    }

    /// Whether `path` is the open image.
    pub fn is_open(&self, path: &Path) -> bool {
        self.image.as_ref().is_some_and(|img| img.path == path)
    }

    /// Close the open image, discarding unsaved edits.
    pub fn close(&mut self) {
        self.image = None;
        self.scale = None;
        self.gesture = None;
        self.session = AnnotationSession::new();
    }

    /// Set the container size and refit the image.
    pub fn resize_container(&mut self, width: u32, height: u32) {
        self.container = ImageDimensions::new(width, height);
        // A half-drawn rectangle would no longer line up with the image
        self.gesture = None;
        self.refit();
    }

    fn refit(&mut self) {
        self.scale = self.image.as_ref().and_then(|img| {
            match ScaleState::fit(img.dimensions, self.container) {
                Ok(scale) => Some(scale),
                Err(e) => {
                    log::debug!("Image not shown: {}", e);
                    None
                }
            }
        });
    }

    // ========================================================================
    // Pointer Input
    // ========================================================================

    pub fn set_mode(&mut self, mode: Option<EditMode>) {
        self.mode = mode;
        self.gesture = None;
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.mode
    }

    fn displayed(&self) -> Option<(ImageDimensions, ScaleState)> {
        Some((self.image.as_ref()?.dimensions, self.scale?))
    }

    /// Pointer went down at a view-space position.
    pub fn pointer_pressed(&mut self, point: Point) {
        let Some((dims, scale)) = self.displayed() else {
            return;
        };
        if !scale.contains_view_point(dims, point) {
            return;
        }

        match self.mode {
            Some(EditMode::Draw(kind)) => {
                self.session.begin_draw();
                self.gesture = Some(DrawGesture::start(point, kind));
            }
            Some(EditMode::Delete) => {
                self.session
                    .delete_at(point_to_image_space(point, &scale));
            }
            None => {}
        }
    }

    /// Pointer moved while down.
    ///
    /// Inside the image this grows the gesture, starting one if the drag
    /// entered from outside. Leaving the image commits the gesture as drawn,
    /// without the minimum-area check.
    pub fn pointer_dragged(&mut self, point: Point) {
        let Some((dims, scale)) = self.displayed() else {
            return;
        };
        let Some(EditMode::Draw(kind)) = self.mode else {
            return;
        };

        if scale.contains_view_point(dims, point) {
            match &mut self.gesture {
                Some(gesture) => gesture.update(point),
                None => {
                    self.session.begin_draw();
                    self.gesture = Some(DrawGesture::start(point, kind));
                }
            }
        } else if let Some(gesture) = self.gesture.take() {
            self.session.draw(to_image_space(&gesture.rect(), &scale));
        }
    }

    /// Pointer released; commits the gesture if it is large enough.
    pub fn pointer_released(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let Some(scale) = self.scale else {
            return;
        };
        if let Some(rect) = gesture.finish(self.min_rect_area) {
            self.session.draw(to_image_space(&rect, &scale));
        }
    }

    /// Rectangle being drawn, in view space.
    pub fn pending_rect(&self) -> Option<Rect> {
        self.gesture.map(|g| g.rect())
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) {
        self.session.undo();
    }

    pub fn redo(&mut self) {
        self.session.redo();
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Save path of the open image.
    pub fn save_path(&self) -> Result<PathBuf, EditorError> {
        let image = self.image.as_ref().ok_or(EditorError::NoImage)?;
        Ok(save_path_for(&self.image_root, &self.save_root, &image.path)?)
    }

    /// Write the open image's rectangles to its save file.
    ///
    /// Returns the save path. Failure leaves the session untouched.
    pub fn save(&self) -> Result<PathBuf, EditorError> {
        let image = self.image.as_ref().ok_or(EditorError::NoImage)?;
        let relative = relative_image_path(&self.image_root, &image.path)?;
        let save_path = self.save_path()?;

        SaveRecord::new(relative, image.dimensions, self.session.rects().copied().collect())
            .write(&save_path)?;
        Ok(save_path)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn image(&self) -> Option<&OpenImage> {
        self.image.as_ref()
    }

    pub fn scale(&self) -> Option<ScaleState> {
        self.scale
    }

    /// Fit of the open image into the current container.
    pub fn fitted_scale(&self) -> Result<ScaleState, EditorError> {
        let image = self.image.as_ref().ok_or(EditorError::NoImage)?;
        Ok(ScaleState::fit(image.dimensions, self.container)?)
    }

    pub fn session(&self) -> &AnnotationSession {
        &self.session
    }

    /// Committed rectangles in image space, most recent first.
    pub fn image_rects(&self) -> Vec<Rect> {
        self.session.rects().copied().collect()
    }

    /// Committed rectangles in view space, for drawing.
    pub fn view_rects(&self) -> Vec<Rect> {
        match self.scale {
            Some(scale) => self
                .session
                .rects()
                .map(|r| to_view_space(r, &scale))
                .collect(),
            None => Vec::new(),
        }
    }
}
