//! PDF export pipeline.
//!
//! Two independent strategies share prompt-derived filenames:
//!
//! - **Text flow** ([`export_response`]): word-wraps the response under a
//!   title line and paginates it across as many A4 pages as needed.
//! - **Snapshot** ([`SnapshotExporter`]): rasterizes the conversation view
//!   to a bitmap and embeds it, aspect fit and centered, on one themed
//!   page with a watermark.
//!
//! The pagination and placement logic is engine-free; printpdf and
//! cosmic-text live behind the [`PageSink`], [`ViewRasterizer`], and
//! [`SnapshotWriter`] seams.

pub mod document;
pub mod error;
pub mod filename;
pub mod layout;
pub mod pdf;
pub mod raster;
pub mod snapshot;

pub use document::{PageSink, ResponseDocument, TextStyle};
pub use error::ExportError;
pub use pdf::{export_response, PdfPageSink, PdfSnapshotWriter};
pub use raster::TextRasterizer;
pub use snapshot::{
    Bitmap, ConversationView, ExportOutcome, SnapshotExporter, SnapshotPage, SnapshotWriter,
    ViewRasterizer,
};
