//! Global constants for framemark

/// Minimum area, in view pixels at drawing time, for a drawn rectangle to be kept
pub const MIN_RECT_AREA: f32 = 15.0;

/// Height of one row in a directory listing (pixels)
pub const DEFAULT_ITEM_HEIGHT: f32 = 30.0;

/// Distance the scroll indicator moves per wheel notch or track click (pixels)
pub const SCROLL_STEP: f32 = 10.0;

/// Display name of the entry leading to the parent directory
pub const BACKTRACK_NAME: &str = "..";

/// Default image root, relative to the working directory
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Default save root, relative to the working directory
pub const DEFAULT_SAVE_DIR: &str = "saves";
