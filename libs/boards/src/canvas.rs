//! Small drawing-primitive wrapper around `image`/`imageproc`/`ab_glyph`,
//! grounded on the original's per-scene draw helpers: centered text,
//! right-aligned score, logo-fit-within-box.

use std::path::Path;

use ab_glyph::{Font, FontRef, FontVec, PxScale, ScaleFont};
use image::{GenericImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::warn;

use crate::bitmap_font;

/// A loaded TrueType font, or the bundled bitmap fallback when none is
/// available on disk — the renderer must never fail to produce a frame.
enum FontBackend {
    Vector(FontVec),
    Bitmap,
}

pub struct FontSet {
    backend: FontBackend,
}

impl FontSet {
    /// Attempts to load a TTF from `path`; falls back to the bundled bitmap
    /// font (and logs a warning) if the file is missing or unparseable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path).ok().and_then(|bytes| FontVec::try_from_vec(bytes).ok()) {
            Some(font) => Self { backend: FontBackend::Vector(font) },
            None => {
                warn!(path = %path.display(), "font unavailable, using bundled bitmap font");
                Self { backend: FontBackend::Bitmap }
            }
        }
    }

    pub fn bitmap() -> Self {
        Self { backend: FontBackend::Bitmap }
    }

    /// Measures the pixel width a string would take at the given size, so
    /// callers can center/right-align without fixed offsets.
    pub fn measure_width(&self, text: &str, px: f32) -> i32 {
        match &self.backend {
            FontBackend::Vector(font) => {
                let scaled = font.as_scaled(PxScale::from(px));
                let mut width = 0.0f32;
                for c in text.chars() {
                    width += scaled.h_advance(scaled.glyph_id(c));
                }
                width.round() as i32
            }
            FontBackend::Bitmap => bitmap_font::measure_width(text, px),
        }
    }

    fn draw(&self, buffer: &mut RgbImage, x: i32, y: i32, px: f32, color: Rgb<u8>, text: &str) {
        match &self.backend {
            FontBackend::Vector(font) => draw_text_mut(buffer, color, x, y, PxScale::from(px), font, text),
            FontBackend::Bitmap => bitmap_font::draw(buffer, x, y, px, color, text),
        }
    }
}

pub fn clear(buffer: &mut RgbImage) {
    draw_filled_rect_mut(
        buffer,
        Rect::at(0, 0).of_size(buffer.width(), buffer.height()),
        Rgb([0, 0, 0]),
    );
}

/// Truncates `text` to `max_chars`, matching the "truncate strings that
/// exceed available width" layout rule, applied at the character level.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

pub fn draw_text_left(buffer: &mut RgbImage, fonts: &FontSet, x: i32, y: i32, px: f32, color: Rgb<u8>, text: &str) {
    fonts.draw(buffer, x, y, px, color, text);
}

pub fn draw_text_centered(buffer: &mut RgbImage, fonts: &FontSet, center_x: i32, y: i32, px: f32, color: Rgb<u8>, text: &str) {
    let width = fonts.measure_width(text, px);
    fonts.draw(buffer, (center_x - width / 2).max(0), y, px, color, text);
}

pub fn draw_text_right(buffer: &mut RgbImage, fonts: &FontSet, right_x: i32, y: i32, px: f32, color: Rgb<u8>, text: &str) {
    let width = fonts.measure_width(text, px);
    fonts.draw(buffer, (right_x - width).max(0), y, px, color, text);
}

/// Blits `logo` into `buffer` at `(x, y)`, resized to fit within
/// `max_w`x`max_h` while preserving aspect ratio. No-ops if the target
/// origin already falls outside the buffer.
pub fn blit_logo_fit(buffer: &mut RgbImage, logo: &RgbImage, x: i32, y: i32, max_w: u32, max_h: u32) {
    if x >= buffer.width() as i32 || y >= buffer.height() as i32 || x < 0 || y < 0 {
        return;
    }
    let (lw, lh) = (logo.width() as f32, logo.height() as f32);
    if lw == 0.0 || lh == 0.0 {
        return;
    }
    let scale = (max_w as f32 / lw).min(max_h as f32 / lh).min(1.0);
    let (tw, th) = ((lw * scale).round().max(1.0) as u32, (lh * scale).round().max(1.0) as u32);
    let resized = image::imageops::resize(logo, tw, th, image::imageops::FilterType::CatmullRom);
    let _ = buffer.copy_from(&resized, x as u32, y as u32);
}

pub fn amber() -> Rgb<u8> {
    Rgb([255, 176, 0])
}

pub fn green() -> Rgb<u8> {
    Rgb([0, 200, 80])
}

pub fn white() -> Rgb<u8> {
    Rgb([255, 255, 255])
}

pub fn red() -> Rgb<u8> {
    Rgb([220, 30, 30])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_count() {
        assert_eq!(truncate("hello world", 5), "hello");
        assert_eq!(truncate("hi", 5), "hi");
    }

    #[test]
    fn missing_font_falls_back_to_bitmap() {
        let fonts = FontSet::load(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(fonts.backend, FontBackend::Bitmap));
        assert!(fonts.measure_width("HI", 8.0) > 0);
    }
}
