//! Composite rasters: one source page with its spacers physically inserted.

use super::pattern::{render_pattern, Pattern, Region, PAPER};
use crate::layout::{reflowed_height, Segment};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Placement of a spacer inside a composite, in composite pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacerBox {
    /// Spacer id
    pub id: String,
    /// Top edge
    pub top: u32,
    /// Height
    pub height: u32,
}

/// A reflowed page: original content strips and spacer blocks stacked.
#[derive(Debug, Clone)]
pub struct CompositeRaster {
    /// 1-indexed source page number
    pub page: usize,

    /// The pixels; width equals the requested target width exactly
    pub image: RgbaImage,

    /// Composite pixels per page unit
    pub scale: f32,

    /// Where each spacer landed
    pub spacers: Vec<SpacerBox>,
}

impl CompositeRaster {
    /// Composite width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Composite height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Spacer box hit by a composite row, if any.
    pub fn spacer_at(&self, row: u32) -> Option<&SpacerBox> {
        self.spacers
            .iter()
            .find(|b| row >= b.top && row < b.top + b.height)
    }
}

/// Pixel height of a reflowed page of `units` at `scale`.
pub fn composite_height(units: f32, scale: f32) -> u32 {
    // Guard against 899.99997-style products rounding up a whole row.
    (units * scale - 1e-3).ceil().max(0.0) as u32
}

/// Build the composite raster for one planned page.
///
/// `source` is the page rasterized at any scale; its pixels-per-unit is derived
/// from its width relative to `target_width / scale_to_width`. Content strips are
/// copied and stretched to `target_width`; spacer segments are drawn with the
/// style renderer. The background is pre-filled white, so content reaching past
/// the bottom of the source page and rounding seams stay white.
pub fn build_composite(
    page: usize,
    source: &RgbaImage,
    segments: &[Segment<'_>],
    target_width: u32,
    scale_to_width: f32,
) -> CompositeRaster {
    let height = composite_height(reflowed_height(segments), scale_to_width);
    let mut image = RgbaImage::from_pixel(target_width, height, PAPER);
    let mut spacers = Vec::new();

    let page_width_units = target_width as f32 / scale_to_width;
    let source_scale = if page_width_units > 0.0 {
        source.width() as f32 / page_width_units
    } else {
        0.0
    };

    for segment in segments {
        let dest_y = (segment.dest_offset() * scale_to_width).round() as u32;
        match *segment {
            Segment::Content {
                source_start,
                source_length,
                ..
            } => {
                copy_strip(
                    &mut image,
                    source,
                    source_start * source_scale,
                    source_length * source_scale,
                    dest_y,
                    (source_length * scale_to_width).round() as u32,
                );
            }
            Segment::Spacer { spacer, .. } => {
                let dest_h = (spacer.height * scale_to_width).round() as u32;
                render_pattern(
                    &mut image,
                    &Pattern::of(spacer),
                    Region::new(0, dest_y, target_width, dest_h),
                    scale_to_width,
                );
                spacers.push(SpacerBox {
                    id: spacer.id.clone(),
                    top: dest_y,
                    height: dest_h,
                });
            }
        }
    }

    log::debug!(
        "built composite for page {}: {}x{} px, {} spacers",
        page,
        target_width,
        height,
        spacers.len()
    );

    CompositeRaster {
        page,
        image,
        scale: scale_to_width,
        spacers,
    }
}

/// Copy source rows `[src_top, src_top + src_len)` into `dest` at `dest_y`,
/// stretched to the destination width and `dest_h` rows.
///
/// Only the part of the strip that exists in the source is copied; the
/// destination height shrinks proportionally for the missing tail.
fn copy_strip(dest: &mut RgbaImage, source: &RgbaImage, src_top: f32, src_len: f32, dest_y: u32, dest_h: u32) {
    if src_len <= 0.0 || dest_h == 0 || source.width() == 0 {
        return;
    }
    let top = src_top.round().max(0.0) as u32;
    if top >= source.height() {
        return;
    }
    let wanted = src_len.round().max(1.0) as u32;
    let available = wanted.min(source.height() - top);
    let dest_h = if available < wanted {
        (dest_h as f32 * available as f32 / wanted as f32).round() as u32
    } else {
        dest_h
    };
    if available == 0 || dest_h == 0 {
        return;
    }

    let strip = imageops::crop_imm(source, 0, top, source.width(), available).to_image();
    let strip = if strip.dimensions() == (dest.width(), dest_h) {
        strip
    } else {
        imageops::resize(&strip, dest.width(), dest_h, FilterType::Triangle)
    };
    imageops::replace(dest, &strip, 0, dest_y as i64);
}
