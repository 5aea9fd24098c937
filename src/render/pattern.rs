//! Drawing of spacer patterns into rasters.

use crate::model::{Spacer, SpacerStyle};
use image::{Rgba, RgbaImage};

/// Spacer background.
pub const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Color of rules, dots and grid lines (#ddd).
pub const PATTERN_INK: Rgba<u8> = Rgba([221, 221, 221, 255]);

/// Pattern steps below this many pixels are not drawn.
const MIN_STEP_PX: f32 = 1.0;

/// A spacer's visual pattern with its pitch in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// Background only
    Plain,
    /// Horizontal rules every `spacing` units
    Ruled { spacing: f32 },
    /// Dots every `pitch` units in both axes
    DotGrid { pitch: f32 },
    /// Grid lines every `size` units in both axes
    Squared { size: f32 },
}

impl Pattern {
    /// Pattern of a spacer, using the pitch that belongs to its style.
    pub fn of(spacer: &Spacer) -> Self {
        match spacer.style {
            SpacerStyle::Plain => Pattern::Plain,
            SpacerStyle::Ruled => Pattern::Ruled {
                spacing: spacer.rule_spacing,
            },
            SpacerStyle::DotGrid => Pattern::DotGrid {
                pitch: spacer.dot_pitch,
            },
            SpacerStyle::Squared => Pattern::Squared {
                size: spacer.grid_size,
            },
        }
    }
}

/// Target rectangle of a spacer in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Region {
    /// Create a region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with a raster of the given size.
    fn clip(&self, target: &RgbaImage) -> Option<Region> {
        let x_end = (self.x.saturating_add(self.width)).min(target.width());
        let y_end = (self.y.saturating_add(self.height)).min(target.height());
        if self.x >= x_end || self.y >= y_end {
            return None;
        }
        Some(Region::new(self.x, self.y, x_end - self.x, y_end - self.y))
    }
}

/// Draw a spacer pattern into `region` of `target`.
///
/// `scale` converts pattern pitches from page units to pixels. The pattern
/// phase starts at the region's top edge, so the pattern of one spacer does not
/// depend on where other spacers are. Drawing is clipped to the region.
pub fn render_pattern(target: &mut RgbaImage, pattern: &Pattern, region: Region, scale: f32) {
    let Some(clip) = region.clip(target) else {
        return;
    };
    fill(target, clip, PAPER);

    match *pattern {
        Pattern::Plain => {}
        Pattern::Ruled { spacing } => {
            for y in steps(region.y, region.height, spacing * scale) {
                hline(target, clip, y);
            }
        }
        Pattern::DotGrid { pitch } => {
            let xs: Vec<u32> = steps(region.x, region.width, pitch * scale).collect();
            for y in steps(region.y, region.height, pitch * scale) {
                for &x in &xs {
                    dot(target, clip, x, y);
                }
            }
        }
        Pattern::Squared { size } => {
            for x in steps(region.x, region.width, size * scale) {
                vline(target, clip, x);
            }
            for y in steps(region.y, region.height, size * scale) {
                hline(target, clip, y);
            }
        }
    }
}

/// Pixel positions `start + k * step` inside `start..start + len`.
fn steps(start: u32, len: u32, step: f32) -> impl Iterator<Item = u32> {
    let valid = step.is_finite() && step >= MIN_STEP_PX;
    let count = if valid {
        (len as f32 / step).ceil() as u32
    } else {
        0
    };
    let end = start.saturating_add(len);
    (0..count)
        .map(move |k| start + (k as f32 * step).round() as u32)
        .filter(move |&p| p < end)
}

fn fill(target: &mut RgbaImage, clip: Region, color: Rgba<u8>) {
    for y in clip.y..clip.y + clip.height {
        for x in clip.x..clip.x + clip.width {
            target.put_pixel(x, y, color);
        }
    }
}

fn hline(target: &mut RgbaImage, clip: Region, y: u32) {
    if y < clip.y || y >= clip.y + clip.height {
        return;
    }
    for x in clip.x..clip.x + clip.width {
        target.put_pixel(x, y, PATTERN_INK);
    }
}

fn vline(target: &mut RgbaImage, clip: Region, x: u32) {
    if x < clip.x || x >= clip.x + clip.width {
        return;
    }
    for y in clip.y..clip.y + clip.height {
        target.put_pixel(x, y, PATTERN_INK);
    }
}

/// A dot of radius one pixel: the center and its four neighbours.
fn dot(target: &mut RgbaImage, clip: Region, x: u32, y: u32) {
    let (x, y) = (x as i64, y as i64);
    for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (px, py) = (x + dx, y + dy);
        if px >= clip.x as i64
            && py >= clip.y as i64
            && px < (clip.x + clip.width) as i64
            && py < (clip.y + clip.height) as i64
        {
            target.put_pixel(px as u32, py as u32, PATTERN_INK);
        }
    }
}
