//! Test image and directory fixtures.
//!
//! Provides scratch directories that clean up after themselves and helpers to
//! drop real or header-only image files into them.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// First bytes of every PNG file; enough for content sniffing.
pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// A unique directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "framemark_{}_{}_{}",
            label,
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create scratch dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Join a relative path onto the scratch dir.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.path.join(rel)
    }

    /// Create a directory (and parents) inside the scratch dir.
    pub fn mkdir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.join(rel);
        std::fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Write a file whose content sniffs as PNG but does not decode.
    pub fn png_stub(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.file(rel, PNG_SIGNATURE)
    }

    /// Write a real, decodable PNG of the given size.
    pub fn png(&self, rel: impl AsRef<Path>, width: u32, height: u32) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
        img.save_with_format(&path, image::ImageFormat::Png)
            .expect("write png");
        path
    }

    /// Write an arbitrary file.
    pub fn file(&self, rel: impl AsRef<Path>, contents: &[u8]) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
