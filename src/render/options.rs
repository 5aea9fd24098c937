//! Export and view options.

use crate::error::{Error, Result};
use crate::source::PageSize;
use serde::{Deserialize, Serialize};

/// Smallest viewer zoom.
pub const MIN_ZOOM: f32 = 0.5;

/// Largest viewer zoom.
pub const MAX_ZOOM: f32 = 3.0;

/// Shape of the exported document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Fixed-size output pages
    #[default]
    Paginated,
    /// One continuous page as tall as all reflowed pages together
    Long,
}

/// How reflowed pages are cut into output pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlicePolicy {
    /// Content flows from one output page to the next across source pages
    #[default]
    Continuous,
    /// Every source page starts on a fresh output page
    Independent,
}

/// Options for exporting a document with its spacers inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Paginated or single long page
    pub mode: ExportMode,

    /// Let content continue across source-page boundaries
    pub continue_across: bool,

    /// Rasterization multiplier (output pixels per page unit)
    pub dpi: f32,

    /// Lossy encoding quality, 0..=1
    #[serde(rename = "jpegQuality", alias = "outputQuality")]
    pub output_quality: f32,

    /// Output page size in units
    pub page_size: PageSize,
}

impl ExportOptions {
    /// Create export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the export mode.
    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable continuous flow across source pages.
    pub fn with_continue_across(mut self, continue_across: bool) -> Self {
        self.continue_across = continue_across;
        self
    }

    /// Start every source page on a new output page.
    pub fn independent(mut self) -> Self {
        self.continue_across = false;
        self
    }

    /// Set the rasterization multiplier.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the lossy encoding quality.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.output_quality = quality;
        self
    }

    /// Set the output page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Slicing policy implied by `continue_across`.
    pub fn slice_policy(&self) -> SlicePolicy {
        if self.continue_across {
            SlicePolicy::Continuous
        } else {
            SlicePolicy::Independent
        }
    }

    /// Output page width in pixels.
    pub fn page_width_px(&self) -> u32 {
        (self.page_size.width * self.dpi).floor().max(1.0) as u32
    }

    /// Output page height in pixels.
    pub fn page_height_px(&self) -> u32 {
        (self.page_size.height * self.dpi).floor().max(1.0) as u32
    }

    /// Reject values that cannot produce an export.
    pub fn validate(&self) -> Result<()> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(Error::InvalidOption(format!("dpi must be > 0 (got {})", self.dpi)));
        }
        if !(0.0..=1.0).contains(&self.output_quality) {
            return Err(Error::InvalidOption(format!(
                "output quality must be within 0..=1 (got {})",
                self.output_quality
            )));
        }
        if !self.page_size.is_valid() {
            return Err(Error::InvalidOption(format!(
                "page size must be positive (got {}x{})",
                self.page_size.width, self.page_size.height
            )));
        }
        Ok(())
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Paginated,
            continue_across: true,
            dpi: 2.0,
            output_quality: 0.8,
            page_size: PageSize::A4,
        }
    }
}

/// Options for the interactive, on-screen rendering of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Zoom factor, display pixels per page unit
    pub scale: f32,

    /// Device pixels per display pixel
    pub device_pixel_ratio: f32,

    /// Report output page-break guide positions
    pub show_page_breaks: bool,

    /// Page size the break guides refer to
    pub break_page_size: PageSize,
}

impl ViewOptions {
    /// Create view options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zoom, clamped to the supported range.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = clamp_zoom(scale);
        self
    }

    /// Set the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        self
    }

    /// Enable or disable page-break guides.
    pub fn with_page_breaks(mut self, show: bool) -> Self {
        self.show_page_breaks = show;
        self
    }

    /// Raster pixels per page unit.
    pub fn raster_scale(&self) -> f32 {
        self.scale * self.device_pixel_ratio
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            device_pixel_ratio: 1.0,
            show_page_breaks: false,
            break_page_size: PageSize::A4,
        }
    }
}

/// Clamp a zoom factor into `MIN_ZOOM..=MAX_ZOOM`.
pub fn clamp_zoom(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_ZOOM, MAX_ZOOM)
}
