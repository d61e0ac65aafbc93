//! Splits a tall raster into page-sized slices.

use serde::Serialize;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Physical page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSpec {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageSpec {
    /// A4 portrait with half-inch margins on every side.
    pub fn a4_portrait() -> Self {
        Self {
            width_pt: 595.28,
            height_pt: 841.89,
            margin_pt: 0.5 * POINTS_PER_INCH,
        }
    }

    pub fn content_width_pt(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn content_height_pt(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

/// One page's share of the raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSlice {
    /// First raster row on this page.
    pub row_start: u32,
    /// One past the last raster row.
    pub row_end: u32,
    /// Drawn height of the slice on the page.
    pub height_pt: f32,
}

impl PageSlice {
    pub fn rows(&self) -> u32 {
        self.row_end - self.row_start
    }
}

/// Fits the raster to the content width and cuts it into page-height slices.
/// Every row lands on exactly one page; an empty raster yields no pages.
pub fn paginate(raster_width: u32, raster_height: u32, spec: &PageSpec) -> Vec<PageSlice> {
    if raster_width == 0 || raster_height == 0 {
        return Vec::new();
    }

    let pt_per_row = spec.content_width_pt() / raster_width as f32;
    let rows_per_page = ((spec.content_height_pt() / pt_per_row).floor() as u32).max(1);

    let mut slices = Vec::new();
    let mut row_start = 0;
    while row_start < raster_height {
        let row_end = row_start.saturating_add(rows_per_page).min(raster_height);
        slices.push(PageSlice {
            row_start,
            row_end,
            height_pt: (row_end - row_start) as f32 * pt_per_row,
        });
        row_start = row_end;
    }
    slices
}
