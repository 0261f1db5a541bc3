//! RGB framebuffer used by the emulator to render screens.
//!
//! Text is drawn with font8x8 glyphs, optionally scaled up for the larger
//! touch screens. Frames are encoded to PNG for snapshot files.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::io::Cursor;

use super::types::{BackendError, BackendResult, Crop};
use crate::device::Device;

/// Glyph size in pixels before scaling
pub const GLYPH_SIZE: u32 = 8;

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// A virtual RGB framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Row-major, 3 bytes per pixel
    buffer: Vec<u8>,
}

impl Framebuffer {
    /// Create a black framebuffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; (width * height * 3) as usize],
        }
    }

    pub fn with_color(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color);
        fb
    }

    /// Render screen lines the way `device` displays them
    ///
    /// Button devices draw white text on black, touch devices black text on
    /// white with 3x glyphs. Lines are centered horizontally and the block
    /// is centered vertically.
    pub fn render_lines(device: Device, lines: &[String]) -> Self {
        let (width, height) = device.resolution();
        let (fg, bg, scale) = if device.is_nano() {
            (WHITE, BLACK, 1)
        } else {
            (BLACK, WHITE, 3)
        };
        let mut fb = Self::with_color(width, height, bg);

        let glyph = GLYPH_SIZE * scale;
        let line_height = glyph + 2 * scale;
        let block_height = line_height * lines.len() as u32;
        let mut y = height.saturating_sub(block_height) / 2;
        for line in lines {
            let text_width = glyph * line.chars().count() as u32;
            let x = width.saturating_sub(text_width) / 2;
            fb.draw_text(x, y, line, scale, fg, bg);
            y += line_height;
        }
        fb
    }

    /// Decode a framebuffer from PNG bytes
    pub fn from_png_bytes(data: &[u8]) -> BackendResult<Self> {
        let rgb = image::load_from_memory(data)?.to_rgb8();
        Ok(Self::from_image(rgb))
    }

    pub fn from_image(img: RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            buffer: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle, clipped to the buffer
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text with glyphs scaled by `scale`. Text does not wrap.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, scale: u32, fg: [u8; 3], bg: [u8; 3]) {
        let advance = GLYPH_SIZE * scale;
        let mut cursor_x = x;
        for ch in text.chars() {
            if cursor_x >= self.width {
                break;
            }
            self.draw_char(cursor_x, y, ch, scale, fg, bg);
            cursor_x += advance;
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, scale: u32, fg: [u8; 3], bg: [u8; 3]) {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
        for (row_idx, row) in glyph.iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                // font8x8 stores LSB as leftmost pixel
                let color = if (row >> bit) & 1 == 1 { fg } else { bg };
                self.draw_rect(
                    x + bit * scale,
                    y + row_idx as u32 * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }

    /// Pixel color, black outside the buffer
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return BLACK;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Copy of the region selected by `crop`
    pub fn crop(&self, crop: Crop) -> Self {
        let (x0, y0, w, h) = crop.clamp_to(self.width, self.height);
        let mut out = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                out.set_pixel(x, y, self.get_pixel(x0 + x, y0 + y));
            }
        }
        out
    }

    /// Pixel-exact equality, optionally restricted to a region of both frames
    pub fn matches(&self, other: &Framebuffer, crop: Option<Crop>) -> bool {
        match crop {
            Some(crop) => self.crop(crop) == other.crop(crop),
            None => self == other,
        }
    }

    pub fn to_image(&self) -> BackendResult<RgbImage> {
        ImageBuffer::from_raw(self.width, self.height, self.buffer.clone()).ok_or_else(|| {
            BackendError::Unsupported(format!(
                "framebuffer of {} bytes does not fit {}x{}",
                self.buffer.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Encode as PNG. Identical frames always produce identical bytes.
    pub fn to_png(&self) -> BackendResult<Vec<u8>> {
        let img = self.to_image()?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}
