//! printpdf-backed writers for both export strategies.
//!
//! Courier is used throughout: its fixed 0.6em advance makes the wrap
//! budgets in [`crate::layout`] exact, so no line placed by the document
//! walk can overrun the content width.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{DynamicImage, RgbaImage};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Rect, Rgb,
};
use tracing::info;

use crate::document::{PageSink, ResponseDocument, TextStyle, BODY_FONT_SIZE_PT, TITLE_FONT_SIZE_PT};
use crate::error::ExportError;
use crate::filename;
use crate::layout::{self, A4_HEIGHT_MM, A4_WIDTH_MM};
use crate::snapshot::{ExportOutcome, SnapshotPage, SnapshotWriter};

const WATERMARK_FONT_SIZE_PT: f32 = 8.0;
const WATERMARK_BASELINE_MM: f32 = 10.0;

/// Compose the prompt title and response body into a paginated PDF under
/// `out_dir`, named `<sanitized prompt>-response.pdf`.
///
/// An empty response is skipped without touching the filesystem.
pub fn export_response(
    prompt: &str,
    response: &str,
    out_dir: &Path,
    margin_mm: f32,
) -> Result<ExportOutcome, ExportError> {
    if response.is_empty() {
        return Ok(ExportOutcome::Skipped);
    }

    let title = format!("AI Response for: \"{prompt}\"");
    let mut sink = PdfPageSink::new(&title)?;
    ResponseDocument::new(margin_mm).compose(prompt, response, &mut sink);

    let path = out_dir.join(filename::response_filename(prompt));
    let pages = sink.page_count();
    sink.save(&path)?;
    info!("Response exported to {} ({} pages)", path.display(), pages);
    Ok(ExportOutcome::Saved(path))
}

/// A [`PageSink`] that places text onto printpdf pages.
///
/// Incoming coordinates measure down from the top of the page; PDF user
/// space measures up from the bottom, so `y` is flipped here.
pub struct PdfPageSink {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    title_font: IndirectFontRef,
    body_font: IndirectFontRef,
}

impl PdfPageSink {
    pub fn new(document_title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            document_title,
            Mm(A4_WIDTH_MM),
            Mm(A4_HEIGHT_MM),
            "Layer 1",
        );
        let title_font = add_builtin(&doc, BuiltinFont::CourierBold)?;
        let body_font = add_builtin(&doc, BuiltinFont::Courier)?;
        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            current: 0,
            title_font,
            body_font,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn save(self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| ExportError::Backend(e.to_string()))
    }

    fn current_layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }
}

impl PageSink for PdfPageSink {
    fn place_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let (font, size) = match style {
            TextStyle::Title => (&self.title_font, TITLE_FONT_SIZE_PT),
            TextStyle::Body => (&self.body_font, BODY_FONT_SIZE_PT),
        };
        self.current_layer()
            .use_text(text, size, Mm(x), Mm(A4_HEIGHT_MM - y), font);
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
        self.pages.push((page, layer));
        self.current += 1;
    }
}

/// Writes a [`SnapshotPage`] as a single-page PDF: theme background first,
/// then the embedded bitmap, then the watermark centered near the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSnapshotWriter;

impl SnapshotWriter for PdfSnapshotWriter {
    fn save(&self, page: &SnapshotPage, path: &Path) -> Result<(), ExportError> {
        let (doc, page_idx, layer_idx) = PdfDocument::new(
            "AI Conversation",
            Mm(page.page_width),
            Mm(page.page_height),
            "Layer 1",
        );
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        // Full-page theme fill goes down before the image so transparent
        // bitmap edges never show a white page.
        layer.set_fill_color(rgb_fill(page.background.r, page.background.g, page.background.b));
        layer.add_rect(
            Rect::new(
                Mm(0.0),
                Mm(0.0),
                Mm(page.page_width),
                Mm(page.page_height),
            )
            .with_mode(PaintMode::Fill),
        );

        let rgba = RgbaImage::from_raw(
            page.bitmap.width,
            page.bitmap.height,
            page.bitmap.pixels.clone(),
        )
        .ok_or_else(|| {
            ExportError::Backend("bitmap buffer does not match its dimensions".to_string())
        })?;
        // The canvas is opaque by construction; dropping the alpha channel
        // sidesteps PDF soft-mask handling.
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(
            DynamicImage::ImageRgba8(rgba).to_rgb8(),
        ));

        let rect = page.image_rect;
        let dpi = page.bitmap.width as f32 * 25.4 / rect.width;
        let translate_y = page.page_height - (rect.y + rect.height);
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(rect.x)),
                translate_y: Some(Mm(translate_y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        let font = add_builtin(&doc, BuiltinFont::Courier)?;
        let text_width =
            layout::monospace_text_width_mm(page.watermark.chars().count(), WATERMARK_FONT_SIZE_PT);
        let x = ((page.page_width - text_width) / 2.0).max(0.0);
        layer.set_fill_color(rgb_fill(128, 128, 128));
        layer.use_text(
            page.watermark.as_str(),
            WATERMARK_FONT_SIZE_PT,
            Mm(x),
            Mm(WATERMARK_BASELINE_MM),
            &font,
        );

        let file = File::create(path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| ExportError::Backend(e.to_string()))
    }
}

fn add_builtin(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::Backend(e.to_string()))
}

fn rgb_fill(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Bitmap, THEME_BACKGROUND};

    fn assert_is_pdf(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "not a PDF file");
    }

    #[test]
    fn test_export_response_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_response("Hello", "Hi there", dir.path(), 15.0).unwrap();

        let path = match outcome {
            ExportOutcome::Saved(path) => path,
            ExportOutcome::Skipped => panic!("export was skipped"),
        };
        assert_eq!(path.file_name().unwrap(), "Hello-response.pdf");
        assert_is_pdf(&path);
    }

    #[test]
    fn test_export_response_empty_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_response("Hello", "", dir.path(), 15.0).unwrap();
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_response_fallback_filename() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_response("???", "some text", dir.path(), 15.0).unwrap();
        match outcome {
            ExportOutcome::Saved(path) => {
                assert_eq!(path.file_name().unwrap(), "ai-response.pdf")
            }
            ExportOutcome::Skipped => panic!("export was skipped"),
        }
    }

    #[test]
    fn test_long_response_spans_pages() {
        let body = (0..200)
            .map(|i| format!("paragraph {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut sink = PdfPageSink::new("test").unwrap();
        ResponseDocument::new(15.0).compose("Hi", &body, &mut sink);
        assert!(sink.page_count() > 1);
    }

    #[test]
    fn test_snapshot_writer_produces_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.pdf");

        let bitmap = Bitmap::solid(64, 32, THEME_BACKGROUND);
        let page = SnapshotPage {
            image_rect: layout::fit_within(
                bitmap.width,
                bitmap.height,
                A4_WIDTH_MM,
                A4_HEIGHT_MM,
                10.0,
            ),
            bitmap,
            background: THEME_BACKGROUND,
            watermark: "Generated by quill".to_string(),
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
        };

        PdfSnapshotWriter.save(&page, &path).unwrap();
        assert_is_pdf(&path);
    }

    #[test]
    fn test_snapshot_writer_rejects_malformed_bitmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");

        let page = SnapshotPage {
            bitmap: Bitmap {
                width: 10,
                height: 10,
                pixels: vec![0; 8], // wrong length
            },
            image_rect: layout::fit_within(10, 10, A4_WIDTH_MM, A4_HEIGHT_MM, 10.0),
            background: THEME_BACKGROUND,
            watermark: String::new(),
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
        };

        let err = PdfSnapshotWriter.save(&page, &path).unwrap_err();
        assert!(matches!(err, ExportError::Backend(_)));
        assert!(!path.exists());
    }
}
