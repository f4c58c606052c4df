//! CPU rasterizer for the conversation view, built on cosmic-text.
//!
//! Draws the prompt and response panels onto an opaque theme-colored
//! canvas at an integer upscale factor. Glyph coverage is alpha-blended
//! per pixel; the output is always fully opaque.

use std::sync::Mutex;

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};

use crate::error::ExportError;
use crate::snapshot::{Bitmap, ConversationView, ViewRasterizer, THEME_BACKGROUND};

/// Logical width of the rendered view before upscaling.
const VIEW_WIDTH_PX: u32 = 800;
const PADDING_PX: u32 = 24;
const SECTION_GAP_PX: u32 = 24;
const HEADING_GAP_PX: u32 = 12;

const HEADING_FONT_PX: f32 = 18.0;
const BODY_FONT_PX: f32 = 16.0;
const LINE_HEIGHT_FACTOR: f32 = 1.4;

// Theme palette: cyan-400 / purple-400 headings, slate-300 / slate-200 text.
const PROMPT_HEADING_COLOR: Color = Color::rgb(34, 211, 238);
const RESPONSE_HEADING_COLOR: Color = Color::rgb(192, 132, 252);
const PROMPT_BODY_COLOR: Color = Color::rgb(203, 213, 225);
const RESPONSE_BODY_COLOR: Color = Color::rgb(226, 232, 240);

/// Renders [`ConversationView`]s to bitmaps using system fonts.
pub struct TextRasterizer {
    state: Mutex<RasterState>,
}

struct RasterState {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRasterizer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RasterState {
                font_system: FontSystem::new(),
                swash_cache: SwashCache::new(),
            }),
        }
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRasterizer for TextRasterizer {
    fn rasterize(&self, view: &ConversationView, scale: u32) -> Result<Bitmap, ExportError> {
        let scale = scale.max(1);
        let mut state = self
            .state
            .lock()
            .map_err(|_| ExportError::Rasterize("renderer state poisoned".to_string()))?;
        let state = &mut *state;

        let width = VIEW_WIDTH_PX * scale;
        let content_width = (VIEW_WIDTH_PX - 2 * PADDING_PX) * scale;

        let sections = [
            ("Your Prompt", view.prompt.as_str(), PROMPT_HEADING_COLOR, PROMPT_BODY_COLOR),
            ("AI Response", view.response.as_str(), RESPONSE_HEADING_COLOR, RESPONSE_BODY_COLOR),
        ];

        // Shape every block first so the canvas height is known up front.
        let mut blocks: Vec<(Buffer, u32, Color)> = Vec::new();
        let mut cursor = PADDING_PX * scale;
        let mut first = true;

        for (heading, body, heading_color, body_color) in sections {
            if body.is_empty() {
                continue;
            }
            if !first {
                cursor += SECTION_GAP_PX * scale;
            }
            first = false;

            let (buffer, height) =
                shape_block(state, heading, HEADING_FONT_PX, scale, content_width);
            blocks.push((buffer, cursor, heading_color));
            cursor += height + HEADING_GAP_PX * scale;

            let (buffer, height) = shape_block(state, body, BODY_FONT_PX, scale, content_width);
            blocks.push((buffer, cursor, body_color));
            cursor += height;
        }

        let height = (cursor + PADDING_PX * scale).max(1);
        let mut canvas = Bitmap::solid(width, height, THEME_BACKGROUND);
        let origin_x = (PADDING_PX * scale) as i32;

        for (buffer, top, color) in &blocks {
            let top = *top as i32;
            buffer.draw(
                &mut state.font_system,
                &mut state.swash_cache,
                *color,
                |x, y, w, h, color| {
                    blend_rect(&mut canvas, origin_x + x, top + y, w, h, color);
                },
            );
        }

        Ok(canvas)
    }
}

/// Shape one text block, returning the buffer and its pixel height.
fn shape_block(
    state: &mut RasterState,
    text: &str,
    font_size_px: f32,
    scale: u32,
    width_px: u32,
) -> (Buffer, u32) {
    let font_size = font_size_px * scale as f32;
    let line_height = font_size * LINE_HEIGHT_FACTOR;

    let mut buffer = Buffer::new(&mut state.font_system, Metrics::new(font_size, line_height));
    buffer.set_size(&mut state.font_system, Some(width_px as f32), None);
    buffer.set_text(
        &mut state.font_system,
        text,
        Attrs::new().family(Family::Monospace),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(&mut state.font_system, false);

    let lines = buffer.layout_runs().count().max(1);
    let height = (lines as f32 * line_height).ceil() as u32;
    (buffer, height)
}

/// Alpha-blend a solid rectangle of glyph coverage onto the canvas.
fn blend_rect(canvas: &mut Bitmap, x: i32, y: i32, w: u32, h: u32, color: Color) {
    let alpha = color.a() as u32;
    if alpha == 0 {
        return;
    }
    let src = [color.r(), color.g(), color.b()];

    for dy in 0..h as i32 {
        for dx in 0..w as i32 {
            let px = x + dx;
            let py = y + dy;
            if px < 0 || py < 0 || px as u32 >= canvas.width || py as u32 >= canvas.height {
                continue;
            }
            let idx = ((py as u32 * canvas.width + px as u32) * 4) as usize;
            for (offset, channel) in src.iter().enumerate() {
                let dst = canvas.pixels[idx + offset] as u32;
                canvas.pixels[idx + offset] =
                    ((*channel as u32 * alpha + dst * (255 - alpha)) / 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(prompt: &str, response: &str) -> ConversationView {
        ConversationView {
            prompt: prompt.to_string(),
            response: response.to_string(),
        }
    }

    #[test]
    fn test_canvas_width_follows_scale() {
        let rasterizer = TextRasterizer::new();
        for scale in [1, 2, 4] {
            let bitmap = rasterizer
                .rasterize(&view("Hello", "Hi there"), scale)
                .unwrap();
            assert_eq!(bitmap.width, VIEW_WIDTH_PX * scale);
            assert_eq!(
                bitmap.pixels.len(),
                (bitmap.width * bitmap.height * 4) as usize
            );
        }
    }

    #[test]
    fn test_canvas_painted_with_theme_background() {
        let rasterizer = TextRasterizer::new();
        let bitmap = rasterizer.rasterize(&view("Hello", "Hi there"), 1).unwrap();

        // Padding corners never carry glyphs.
        let last = bitmap.pixels.len() - 4;
        assert_eq!(&bitmap.pixels[0..4], &[15, 23, 42, 255]);
        assert_eq!(&bitmap.pixels[last..], &[15, 23, 42, 255]);
    }

    #[test]
    fn test_empty_view_is_padding_only() {
        let rasterizer = TextRasterizer::new();
        let bitmap = rasterizer.rasterize(&view("", ""), 2).unwrap();
        assert_eq!(bitmap.width, VIEW_WIDTH_PX * 2);
        assert_eq!(bitmap.height, PADDING_PX * 2 * 2);
    }

    #[test]
    fn test_prompt_section_adds_height() {
        let rasterizer = TextRasterizer::new();
        let without = rasterizer.rasterize(&view("", "Hi"), 1).unwrap();
        let with = rasterizer.rasterize(&view("Hello", "Hi"), 1).unwrap();
        assert!(with.height > without.height);
    }

    #[test]
    fn test_zero_scale_is_clamped() {
        let rasterizer = TextRasterizer::new();
        let bitmap = rasterizer.rasterize(&view("a", "b"), 0).unwrap();
        assert_eq!(bitmap.width, VIEW_WIDTH_PX);
    }
}
