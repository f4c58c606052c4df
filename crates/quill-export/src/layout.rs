//! Pure layout helpers: word wrapping, monospace width math, and the
//! aspect-fit rectangle used by the snapshot strategy.
//!
//! Everything here is deterministic and engine-free so the pagination and
//! placement logic can be tested without a PDF backend.

/// A4 portrait page width in millimeters.
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 portrait page height in millimeters.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Horizontal advance of Courier glyphs, as a fraction of the font size.
const COURIER_ADVANCE_EM: f32 = 0.6;

/// One PostScript point in millimeters.
const PT_TO_MM: f32 = 25.4 / 72.0;

/// How many Courier characters of the given point size fit in `width_mm`.
pub fn monospace_chars_per_line(width_mm: f32, font_size_pt: f32) -> usize {
    let advance_mm = font_size_pt * COURIER_ADVANCE_EM * PT_TO_MM;
    (width_mm / advance_mm).floor() as usize
}

/// Width in millimeters of `char_count` Courier characters at the given
/// point size.
pub fn monospace_text_width_mm(char_count: usize, font_size_pt: f32) -> f32 {
    char_count as f32 * font_size_pt * COURIER_ADVANCE_EM * PT_TO_MM
}

/// Greedy word wrap to a fixed character budget per line.
///
/// Existing newlines are respected, blank source lines survive as empty
/// output lines, and words longer than the budget are hard-split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len == 0 {
                let (rest, rest_len) = hard_split(word, word_len, max_chars, &mut lines);
                current = rest;
                current_len = rest_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                let (rest, rest_len) = hard_split(word, word_len, max_chars, &mut lines);
                current = rest;
                current_len = rest_len;
            }
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

/// Emit full-width chunks of an overlong word and return the remainder.
/// Words within the budget pass through untouched.
fn hard_split(
    word: &str,
    word_len: usize,
    max_chars: usize,
    lines: &mut Vec<String>,
) -> (String, usize) {
    if word_len <= max_chars {
        return (word.to_string(), word_len);
    }

    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    while chars.len() - start > max_chars {
        lines.push(chars[start..start + max_chars].iter().collect());
        start += max_chars;
    }
    let remainder: String = chars[start..].iter().collect();
    let remainder_len = chars.len() - start;
    (remainder, remainder_len)
}

/// Placement rectangle in millimeters, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit an image's aspect ratio inside the page area minus a uniform margin,
/// shrinking along whichever axis binds, then center the result on the page.
pub fn fit_within(
    img_width: u32,
    img_height: u32,
    page_width: f32,
    page_height: f32,
    margin: f32,
) -> FitRect {
    let ratio = img_width.max(1) as f32 / img_height.max(1) as f32;

    let mut width = page_width - margin * 2.0;
    let mut height = width / ratio;

    if height > page_height - margin * 2.0 {
        height = page_height - margin * 2.0;
        width = height * ratio;
    }

    FitRect {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    }
}
