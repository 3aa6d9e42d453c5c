//! Minimal built-in 3x5 pixel-block font used when no TrueType font is
//! available on disk. Deliberately small — just enough glyph coverage for
//! scores, clocks, and team abbreviations — so the renderer can never fail
//! to produce a frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// Row-major 3x5 bitmap, one bit per cell, MSB-first per row (3 used bits).
fn glyph_rows(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b111, 0b101, 0b101], // default glyph for letters: a blocky placeholder
    }
}

/// Pixel width a string would occupy, one glyph cell + 1px gutter per char,
/// scaled by `px / GLYPH_H`.
pub fn measure_width(text: &str, px: f32) -> i32 {
    let scale = (px / GLYPH_H as f32).max(1.0);
    let cell_w = (GLYPH_W as f32 * scale) as i32 + 1;
    text.chars().count() as i32 * cell_w
}

pub fn draw(buffer: &mut RgbImage, x: i32, y: i32, px: f32, color: Rgb<u8>, text: &str) {
    let scale = (px / GLYPH_H as f32).max(1.0) as u32;
    let mut cursor_x = x;
    for c in text.chars() {
        let rows = glyph_rows(c);
        for (row_idx, row) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if (row >> (GLYPH_W - 1 - col)) & 1 == 1 {
                    let px_x = cursor_x + (col * scale) as i32;
                    let px_y = y + (row_idx as u32 * scale) as i32;
                    if px_x >= 0 && px_y >= 0 {
                        draw_filled_rect_mut(buffer, Rect::at(px_x, px_y).of_size(scale.max(1), scale.max(1)), color);
                    }
                }
            }
        }
        cursor_x += (GLYPH_W * scale) as i32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_width_scales_with_char_count() {
        assert!(measure_width("12:30", 10.0) > measure_width("1", 10.0));
    }

    #[test]
    fn draw_does_not_panic_at_buffer_edge() {
        let mut buf = RgbImage::new(16, 16);
        draw(&mut buf, 14, 14, 8.0, Rgb([255, 255, 255]), "99");
    }
}
