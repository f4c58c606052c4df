//! Snapshot export: rasterize the conversation view and embed it, aspect
//! fit and centered, on a single themed page.
//!
//! The exporter owns the in-flight guard: a second request while one is
//! running is dropped, and the flag is cleared on every exit path including
//! a panicking rasterizer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quill_core::config::ExportConfig;
use tracing::{debug, error, info};

use crate::error::ExportError;
use crate::filename;
use crate::layout::{self, FitRect, A4_HEIGHT_MM, A4_WIDTH_MM};

/// Slate-900, the theme color painted behind the snapshot.
pub const THEME_BACKGROUND: Rgb8 = Rgb8 {
    r: 15,
    g: 23,
    b: 42,
};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// RGBA8 pixel buffer, rows top to bottom.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// A bitmap filled with a single opaque color.
    pub fn solid(width: u32, height: u32, color: Rgb8) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// The conversation region captured by the snapshot strategy.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    pub prompt: String,
    pub response: String,
}

/// Produces a bitmap of the conversation view at an upscale factor.
pub trait ViewRasterizer: Send + Sync {
    fn rasterize(&self, view: &ConversationView, scale: u32) -> Result<Bitmap, ExportError>;
}

/// One fully specified snapshot page, ready for a writer to render.
#[derive(Debug, Clone)]
pub struct SnapshotPage {
    pub bitmap: Bitmap,
    pub image_rect: FitRect,
    pub background: Rgb8,
    pub watermark: String,
    pub page_width: f32,
    pub page_height: f32,
}

/// Renders a [`SnapshotPage`] to a file.
pub trait SnapshotWriter: Send + Sync {
    fn save(&self, page: &SnapshotPage, path: &Path) -> Result<(), ExportError>;
}

/// What an export request actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The document was written to this path.
    Saved(PathBuf),
    /// The request was dropped: nothing to export, or one already in flight.
    Skipped,
}

/// Drives the snapshot pipeline: rasterize, fit, hand off to the writer.
pub struct SnapshotExporter<R, W> {
    rasterizer: Arc<R>,
    writer: Arc<W>,
    config: ExportConfig,
    in_flight: Arc<AtomicBool>,
}

impl<R, W> SnapshotExporter<R, W>
where
    R: ViewRasterizer + 'static,
    W: SnapshotWriter + 'static,
{
    pub fn new(rasterizer: R, writer: W, config: ExportConfig) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            writer: Arc::new(writer),
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an export is currently in flight.
    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Rasterize the view and save it under a prompt-derived filename in
    /// `out_dir`.
    ///
    /// Returns [`ExportOutcome::Skipped`] without doing any work if another
    /// export is still running. The rasterize-and-encode step runs on the
    /// blocking pool so the caller's event loop keeps ticking.
    pub async fn export(
        &self,
        view: ConversationView,
        out_dir: &Path,
        prompt: &str,
    ) -> Result<ExportOutcome, ExportError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            debug!("Snapshot export already in flight, dropping request");
            return Ok(ExportOutcome::Skipped);
        }

        let path = out_dir.join(filename::snapshot_filename(prompt));
        let rasterizer = Arc::clone(&self.rasterizer);
        let writer = Arc::clone(&self.writer);
        let config = self.config.clone();
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let bitmap = rasterizer.rasterize(&view, config.raster_scale)?;
            let image_rect = layout::fit_within(
                bitmap.width,
                bitmap.height,
                A4_WIDTH_MM,
                A4_HEIGHT_MM,
                config.snapshot_margin_mm,
            );
            let page = SnapshotPage {
                bitmap,
                image_rect,
                background: THEME_BACKGROUND,
                watermark: config.watermark,
                page_width: A4_WIDTH_MM,
                page_height: A4_HEIGHT_MM,
            };
            writer.save(&page, &path)?;
            Ok::<PathBuf, ExportError>(path)
        });

        match task.await {
            Ok(Ok(path)) => {
                info!("Snapshot exported to {}", path.display());
                Ok(ExportOutcome::Saved(path))
            }
            Ok(Err(e)) => {
                error!("Snapshot export failed: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("Snapshot export task aborted: {}", e);
                Err(ExportError::Task(e.to_string()))
            }
        }
    }
}

/// Clears the in-flight flag when the export task finishes on any path,
/// unwinding included.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
