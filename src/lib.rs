//! framemark - Bounding Box Annotation Core
//!
//! The non-visual core of an image bounding-box annotation tool: coordinate
//! mapping between image and view space, an undo/redo annotation session,
//! per-image save files, recursive completion tracking and a virtualized
//! directory listing.

pub mod annotation;
pub mod completion;
pub mod config;
pub mod constants;
pub mod editor;
pub mod explorer;
pub mod format;
pub mod list_window;
pub mod session;
pub mod source;
pub mod transform;

#[cfg(test)]
mod test_image;

pub use annotation::{Point, Rect, RectKind};
pub use completion::{Aggregate, CompletionAggregator, CompletionData, EnumerationFailure};
pub use config::{AppConfig, ConfigError, LogLevel};
pub use editor::{EditMode, EditorError, ImageEditor};
pub use explorer::{Explorer, ExplorerError, ImageTarget};
pub use format::FormatError;
pub use list_window::{DirectoryEntry, EntryKind, ListWindow, ScrollIndicator};
pub use session::{AnnotationSession, DrawGesture};
pub use source::{DirectorySource, FsDirectorySource, ImageSniffer, MagicSniffer};
pub use transform::{ImageDimensions, ScaleState, TransformError};
