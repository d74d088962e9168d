//! Per-image save file format.
//!
//! One UTF-8 text file per annotated image, mirrored under the save root:
//!
//! ```text
//! birds/heron.jpg        <- image path relative to the image root
//! 1920,1080              <- image width,height in pixels
//! 2                      <- number of rectangles
//! 310.5,88,120,64,0      <- x,y,width,height,kind (image space)
//! 12,40.25,33,33,1
//! ```
//!
//! The kind token is optional on read; four-field lines are Primary. The
//! existence of the file is what marks the image as done, so nothing else ever
//! needs to open it to compute progress.

use std::path::{Path, PathBuf};

use crate::annotation::{Rect, RectKind};
use crate::format::error::FormatError;
use crate::transform::ImageDimensions;

/// Extension used for save files.
pub const SAVE_EXTENSION: &str = "txt";

/// Number of header lines before the rectangle lines.
pub const HEADER_LINES: usize = 3;

// ============================================================================
// Path Mapping
// ============================================================================

/// Derive the save file path for an image.
///
/// The image's path relative to `image_root` is re-rooted under `save_root`
/// and its extension swapped for `.txt`, so `images/x/y.jpg` maps to
/// `saves/x/y.txt`.
pub fn save_path_for(
    image_root: &Path,
    save_root: &Path,
    image_path: &Path,
) -> Result<PathBuf, FormatError> {
    let relative = relative_image_path(image_root, image_path)?;
    Ok(save_root.join(relative).with_extension(SAVE_EXTENSION))
}

/// Path of an image relative to the image root.
pub fn relative_image_path<'a>(
    image_root: &Path,
    image_path: &'a Path,
) -> Result<&'a Path, FormatError> {
    let outside = || FormatError::OutsideRoot {
        path: image_path.to_path_buf(),
        root: image_root.to_path_buf(),
    };
    let relative = image_path.strip_prefix(image_root).map_err(|_| outside())?;
    if relative.file_name().is_none() {
        return Err(outside());
    }
    Ok(relative)
}

/// Whether an image with this save path has been annotated.
pub fn is_completed(save_path: &Path) -> bool {
    save_path.is_file()
}

// ============================================================================
// Records
// ============================================================================

/// Everything written to one save file.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    /// Image path relative to the image root
    pub image_path: PathBuf,
    /// Native pixel size of the image
    pub dimensions: ImageDimensions,
    /// Rectangles in image space, most recent first
    pub rects: Vec<Rect>,
}

impl SaveRecord {
    pub fn new(image_path: impl Into<PathBuf>, dimensions: ImageDimensions, rects: Vec<Rect>) -> Self {
        Self {
            image_path: image_path.into(),
            dimensions,
            rects,
        }
    }

    /// Render the record as save file text.
    pub fn to_text(&self) -> String {
        encode(&self.image_path, self.dimensions, &self.rects)
    }

    /// Write the record to `save_path`, creating parent directories as needed.
    pub fn write(&self, save_path: &Path) -> Result<(), FormatError> {
        if let Some(parent) = save_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FormatError::io(parent, e))?;
        }
        std::fs::write(save_path, self.to_text()).map_err(|e| FormatError::io(save_path, e))?;

        log::info!(
            "Saved {} rectangles for {:?} to {:?}",
            self.rects.len(),
            self.image_path,
            save_path
        );
        Ok(())
    }
}

/// Render save file text: three header lines, then one line per rectangle.
pub fn encode(image_path: &Path, dimensions: ImageDimensions, rects: &[Rect]) -> String {
    let mut lines = Vec::with_capacity(HEADER_LINES + rects.len());
    lines.push(portable_path(image_path));
    lines.push(format!("{},{}", dimensions.width, dimensions.height));
    lines.push(rects.len().to_string());
    for r in rects {
        lines.push(format!(
            "{},{},{},{},{}",
            r.x,
            r.y,
            r.width,
            r.height,
            r.kind.code()
        ));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Write a record to its save path.
pub fn write_save_file(save_path: &Path, record: &SaveRecord) -> Result<(), FormatError> {
    record.write(save_path)
}

/// Header of a save file.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveHeader {
    /// Image path relative to the image root
    pub image_path: PathBuf,
    /// Native pixel size of the image
    pub dimensions: ImageDimensions,
    /// Rectangle count recorded by the writer
    pub count: usize,
}

/// Join path components with `/` so files move between platforms unchanged.
fn portable_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse the rectangles of a save file.
///
/// The header is skipped without inspection. Every remaining non-empty line
/// must be a rectangle; one bad line fails the whole decode.
pub fn decode(text: &str) -> Result<Vec<Rect>, FormatError> {
    let mut lines = text.lines();
    for n in 1..=HEADER_LINES {
        if lines.next().is_none() {
            return Err(FormatError::malformed(n, "missing header line"));
        }
    }

    let mut rects = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rects.push(parse_rect_line(line, HEADER_LINES + idx + 1)?);
    }
    Ok(rects)
}

/// Parse the three header lines of a save file.
pub fn decode_header(text: &str) -> Result<SaveHeader, FormatError> {
    let mut lines = text.lines();
    let mut next = |n: usize| {
        lines
            .next()
            .map(str::trim)
            .ok_or_else(|| FormatError::malformed(n, "missing header line"))
    };

    let image_path = PathBuf::from(next(1)?);

    let dims = next(2)?;
    let (w, h) = dims
        .split_once(',')
        .ok_or_else(|| FormatError::malformed(2, format!("expected 'width,height', got '{}'", dims)))?;
    let parse_dim = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| FormatError::malformed(2, format!("bad dimension '{}': {}", s, e)))
    };
    let dimensions = ImageDimensions::new(parse_dim(w)?, parse_dim(h)?);

    let count_line = next(3)?;
    let count = count_line
        .parse::<usize>()
        .map_err(|e| FormatError::malformed(3, format!("bad count '{}': {}", count_line, e)))?;

    Ok(SaveHeader {
        image_path,
        dimensions,
        count,
    })
}

/// Parse one `x,y,width,height[,kind]` line.
fn parse_rect_line(line: &str, line_no: usize) -> Result<Rect, FormatError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 4 && parts.len() != 5 {
        return Err(FormatError::malformed(
            line_no,
            format!("expected 4 or 5 fields, found {}", parts.len()),
        ));
    }

    let mut values = [0.0f32; 4];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse::<f32>()
            .map_err(|e| FormatError::malformed(line_no, format!("bad number '{}': {}", part, e)))?;
        if !value.is_finite() {
            return Err(FormatError::malformed(
                line_no,
                format!("non-finite value '{}'", part),
            ));
        }
    }
    let [x, y, width, height] = values;
    if width < 0.0 || height < 0.0 {
        return Err(FormatError::malformed(line_no, "negative size"));
    }

    let kind = match parts.get(4) {
        None => RectKind::Primary,
        Some(token) => token
            .parse::<u8>()
            .ok()
            .and_then(RectKind::from_code)
            .ok_or_else(|| FormatError::malformed(line_no, format!("unknown kind '{}'", token)))?,
    };

    Ok(Rect::new(x, y, width, height, kind))
}

/// Read and parse the rectangles of a save file.
pub fn read_save_file(save_path: &Path) -> Result<Vec<Rect>, FormatError> {
    let text = std::fs::read_to_string(save_path).map_err(|e| FormatError::io(save_path, e))?;
    let rects = decode(&text)?;

    if let Ok(header) = decode_header(&text) {
        if header.count != rects.len() {
            log::warn!(
                "{:?} declares {} rectangles but holds {}",
                save_path,
                header.count,
                rects.len()
            );
        }
    }

    log::debug!("Loaded {} rectangles from {:?}", rects.len(), save_path);
    Ok(rects)
}
