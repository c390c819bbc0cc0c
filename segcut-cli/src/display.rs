//! Terminal rendering of segment frames
//!
//! Draws an RGBA frame with truecolor half-block characters, packing two
//! pixel rows into every terminal line. Transparent pixels keep the
//! terminal's own background, so cutouts read as actual cutouts.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Widest frame drawn before downscaling, in terminal columns.
const MAX_COLUMNS: u32 = 80;

/// Alpha at or above this renders as a visible pixel.
const ALPHA_VISIBLE: u8 = 128;

const UPPER_HALF: char = '\u{2580}';
const LOWER_HALF: char = '\u{2584}';
const RESET: &str = "\x1b[0m";

/// Write the frame to stdout.
pub fn print_image(image: &RgbaImage) {
    print!("{}", render_ansi(image, MAX_COLUMNS));
}

/// Render the frame as ANSI truecolor text, one glyph per pixel column.
pub fn render_ansi(image: &RgbaImage, max_columns: u32) -> String {
    let scaled = fit_to_columns(image, max_columns);
    let (width, height) = scaled.dimensions();
    let mut out = String::new();
    let mut y = 0;
    while y < height {
        for x in 0..width {
            let top = *scaled.get_pixel(x, y);
            let bottom = if y + 1 < height {
                *scaled.get_pixel(x, y + 1)
            } else {
                Rgba([0, 0, 0, 0])
            };
            push_cell(&mut out, top, bottom);
        }
        out.push_str(RESET);
        out.push('\n');
        y += 2;
    }
    out
}

fn fit_to_columns(image: &RgbaImage, max_columns: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if max_columns == 0 || width <= max_columns {
        return image.clone();
    }
    let scaled_height = (height as u64 * max_columns as u64 / width as u64).max(1) as u32;
    // Nearest keeps mask edges hard; smoother filters would bleed alpha
    imageops::resize(image, max_columns, scaled_height, FilterType::Nearest)
}

fn push_cell(out: &mut String, top: Rgba<u8>, bottom: Rgba<u8>) {
    use std::fmt::Write;

    let top_visible = top.0[3] >= ALPHA_VISIBLE;
    let bottom_visible = bottom.0[3] >= ALPHA_VISIBLE;
    // Writing to a String cannot fail, the results are discarded
    match (top_visible, bottom_visible) {
        (true, true) => {
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}",
                top.0[0], top.0[1], top.0[2], bottom.0[0], bottom.0[1], bottom.0[2], UPPER_HALF
            );
        }
        (true, false) => {
            let _ = write!(
                out,
                "{}\x1b[38;2;{};{};{}m{}",
                RESET, top.0[0], top.0[1], top.0[2], UPPER_HALF
            );
        }
        (false, true) => {
            let _ = write!(
                out,
                "{}\x1b[38;2;{};{};{}m{}",
                RESET, bottom.0[0], bottom.0[1], bottom.0[2], LOWER_HALF
            );
        }
        (false, false) => {
            out.push_str(RESET);
            out.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_frame_renders_blank() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([90, 90, 90, 0]));
        let rendered = render_ansi(&image, 80);
        assert_eq!(rendered.lines().count(), 2);
        assert!(!rendered.contains(UPPER_HALF));
        assert!(!rendered.contains(LOWER_HALF));
        assert_eq!(rendered.matches(' ').count(), 8);
    }

    #[test]
    fn test_opaque_cell_sets_foreground_and_background() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let rendered = render_ansi(&image, 80);
        assert!(rendered.contains("\x1b[38;2;255;0;0m"));
        assert!(rendered.contains("\x1b[48;2;0;0;255m"));
        assert_eq!(rendered.matches(UPPER_HALF).count(), 1);
    }

    #[test]
    fn test_transparent_bottom_skips_background() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        image.put_pixel(0, 1, Rgba([10, 20, 30, 0]));
        let rendered = render_ansi(&image, 80);
        assert!(rendered.contains("\x1b[38;2;10;20;30m"));
        assert!(!rendered.contains("\x1b[48;2;"));
    }

    #[test]
    fn test_transparent_top_uses_lower_half() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 1, Rgba([0, 128, 0, 200]));
        let rendered = render_ansi(&image, 80);
        assert_eq!(rendered.matches(LOWER_HALF).count(), 1);
        assert!(!rendered.contains(UPPER_HALF));
    }

    #[test]
    fn test_odd_height_renders_final_row() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([50, 60, 70, 255]));
        let rendered = render_ansi(&image, 80);
        // Two lines: rows 0+1, then row 2 over a blank bottom
        assert_eq!(rendered.lines().count(), 2);
        assert_eq!(rendered.matches(UPPER_HALF).count(), 6);
    }

    #[test]
    fn test_wide_frame_is_downscaled() {
        let image = RgbaImage::from_pixel(160, 80, Rgba([1, 2, 3, 255]));
        let rendered = render_ansi(&image, 80);
        let first_line = rendered.lines().next().unwrap();
        assert_eq!(first_line.matches(UPPER_HALF).count(), 80);
        assert_eq!(rendered.lines().count(), 20);
    }

    #[test]
    fn test_overlay_alpha_is_visible() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 128, 0, 200]));
        let rendered = render_ansi(&image, 80);
        assert_eq!(rendered.matches(UPPER_HALF).count(), 2);
    }
}
