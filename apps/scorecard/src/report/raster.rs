//! Rasterization of a view region into an RGB bitmap.
//!
//! `BlockRasterizer` draws a wireframe rendering: headings and text become bars
//! sized to their content, gauges and score cards become tier-colored blocks.
//! Hidden elements and their subtrees are skipped.

use async_trait::async_trait;
use thiserror::Error;

use crate::report::view::{Element, ElementKind};

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [0xff, 0xff, 0xff];

/// Logical width of the capture region, in CSS pixels (A4 minus 0.5in margins at 96 dpi).
pub const REGION_WIDTH_PX: f32 = 698.0;

/// Refuse bitmaps above this many pixels.
const MAX_PIXELS: u64 = 64 * 1024 * 1024;

const INK: Rgb = [0x11, 0x18, 0x27];
const MUTED: Rgb = [0x9c, 0xa3, 0xaf];
const RULE: Rgb = [0xd1, 0xd5, 0xdb];
const TRACK: Rgb = [0xe5, 0xe7, 0xeb];

const GAP: f32 = 12.0;
const PADDING: f32 = 8.0;
const LINE_HEIGHT: f32 = 20.0;
const GLYPH_WIDTH: f32 = 7.0;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Region '{0}' has nothing visible to draw")]
    EmptyRegion(String),

    #[error("Bitmap of {width}x{height} exceeds the pixel limit")]
    TooLarge { width: u32, height: u32 },

    #[error("Rasterizer failed: {0}")]
    Backend(String),
}

/// Packed 8-bit RGB bitmap, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Fills a rectangle, clipped to the bitmap.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(self.height)..y_end {
            for col in x.min(self.width)..x_end {
                let i = (row as usize * self.width as usize + col as usize) * 3;
                self.pixels[i..i + 3].copy_from_slice(&color);
            }
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Raw bytes of rows `start..end`.
    pub fn rows(&self, start: u32, end: u32) -> &[u8] {
        let stride = self.width as usize * 3;
        let end = end.min(self.height) as usize;
        let start = (start as usize).min(end);
        &self.pixels[start * stride..end * stride]
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        region: &Element,
        scale: f32,
        background: Rgb,
    ) -> Result<Raster, RasterError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Block rasterizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Block {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgb,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRasterizer;

#[async_trait]
impl Rasterizer for BlockRasterizer {
    async fn rasterize(
        &self,
        region: &Element,
        scale: f32,
        background: Rgb,
    ) -> Result<Raster, RasterError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RasterError::Backend(format!("invalid scale {scale}")));
        }

        let mut blocks = Vec::new();
        let height = layout(region, 0.0, 0.0, REGION_WIDTH_PX, &mut blocks);
        if blocks.is_empty() || height <= 0.0 {
            return Err(RasterError::EmptyRegion(region.id.clone()));
        }

        let width = (REGION_WIDTH_PX * scale).ceil() as u32;
        let height = (height * scale).ceil() as u32;
        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(RasterError::TooLarge { width, height });
        }

        let mut raster = Raster::filled(width, height, background);
        for b in blocks {
            raster.fill_rect(
                (b.x * scale) as u32,
                (b.y * scale) as u32,
                (b.w * scale).ceil() as u32,
                (b.h * scale).ceil() as u32,
                b.color,
            );
        }
        Ok(raster)
    }
}

/// Lays out `el` at (x, y) within `width`, pushing blocks. Returns the height used.
fn layout(el: &Element, x: f32, y: f32, width: f32, out: &mut Vec<Block>) -> f32 {
    if !el.visible {
        return 0.0;
    }

    let own = match &el.kind {
        ElementKind::Container => 0.0,
        ElementKind::Heading { text } => text_bars(text, x, y, width, LINE_HEIGHT + 4.0, INK, out),
        ElementKind::Text { text } => text_bars(text, x, y, width, LINE_HEIGHT, MUTED, out),
        ElementKind::Rule => {
            out.push(Block { x, y: y + 4.0, w: width, h: 1.0, color: RULE });
            9.0
        }
        ElementKind::BulletList { items, marker } => {
            let mut used = 0.0;
            for item in items {
                out.push(Block { x, y: y + used + 7.0, w: 6.0, h: 6.0, color: *marker });
                used += text_bars(item, x + 14.0, y + used, width - 14.0, LINE_HEIGHT, MUTED, out);
            }
            used
        }
        ElementKind::Gauge { score, tier, .. } => {
            meter(x + width / 2.0 - 120.0, y, 240.0, 160.0, *score, tier.rgb(), out);
            160.0
        }
        ElementKind::ScoreCircle { title, percentage, tier, .. } => {
            meter(x, y, 100.0, 100.0, *percentage, tier.rgb(), out);
            100.0 + text_bars(title, x, y + 104.0, width, LINE_HEIGHT, INK, out) + 4.0
        }
        ElementKind::Button { label } => {
            out.push(Block {
                x,
                y,
                w: (label.chars().count() as f32 * GLYPH_WIDTH + 2.0 * PADDING).min(width),
                h: 32.0,
                color: INK,
            });
            32.0
        }
    };

    let mut cursor = y + own;
    for child in &el.children {
        let used = layout(child, x, cursor, width, out);
        if used > 0.0 {
            cursor += used + GAP;
        }
    }
    if cursor > y + own {
        cursor -= GAP;
    }
    cursor - y
}

/// Wraps `text` to `width` and pushes one bar per line.
fn text_bars(text: &str, x: f32, y: f32, width: f32, line: f32, color: Rgb, out: &mut Vec<Block>) -> f32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0.0;
    }
    let per_line = ((width / GLYPH_WIDTH).floor() as usize).max(1);
    let lines = chars.div_ceil(per_line);
    for i in 0..lines {
        let len = (chars - i * per_line).min(per_line);
        out.push(Block {
            x,
            y: y + i as f32 * line + line * 0.25,
            w: len as f32 * GLYPH_WIDTH,
            h: line * 0.5,
            color,
        });
    }
    lines as f32 * line
}

/// A track with a tier-colored fill proportional to `percent` (clamped for drawing only).
fn meter(x: f32, y: f32, w: f32, h: f32, percent: f64, color: Rgb, out: &mut Vec<Block>) {
    out.push(Block { x, y, w, h, color: TRACK });
    let fraction = (percent / 100.0).clamp(0.0, 1.0) as f32;
    let filled = h * fraction;
    out.push(Block { x, y: y + h - filled, w, h: filled, color });
}
