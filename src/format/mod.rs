//! Save file persistence.
//!
//! Every annotated image gets one small text file under the save root, at a
//! path mirroring the image's location under the image root. The module
//! covers three concerns:
//!
//! - **Path mapping**: [`save_path_for`] turns an image path into its save path
//! - **Codec**: [`SaveRecord::to_text`] and [`decode`] convert to and from text
//! - **I/O**: [`SaveRecord::write`] and [`read_save_file`] touch the disk
//!
//! ## Usage
//!
//! ```rust,ignore
//! use framemark::format::{save_path_for, read_save_file, SaveRecord};
//!
//! let save_path = save_path_for(&image_root, &save_root, &image_path)?;
//! SaveRecord::new(rel_path, dims, rects).write(&save_path)?;
//! let rects = read_save_file(&save_path)?;
//! ```

mod error;
mod save_file;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use save_file::{
    HEADER_LINES, SAVE_EXTENSION, SaveHeader, SaveRecord, decode, decode_header, encode,
    is_completed, read_save_file, relative_image_path, save_path_for, write_save_file,
};
