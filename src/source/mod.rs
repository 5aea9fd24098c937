//! Page sources: the collaborators that turn document pages into rasters.
//!
//! The reflow engine never parses documents itself. It asks a [`PageSource`]
//! for each page's natural size and for a raster of the page at a given scale.
//!
//! # Example
//!
//! ```no_run
//! use answerspace::source::{ImageSequence, PageSource};
//!
//! fn main() -> answerspace::Result<()> {
//!     let pages = ImageSequence::new(vec!["scan-1.png", "scan-2.png"]);
//!     let size = pages.page_size(1)?;
//!     let raster = pages.rasterize(1, 2.0)?;
//!     assert_eq!(raster.width(), (size.width * 2.0).round() as u32);
//!     Ok(())
//! }
//! ```

mod images;
mod memory;

pub use images::ImageSequence;
pub use memory::RasterPages;

use crate::error::{Error, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Page dimensions in unscaled units (points for PDF sources, pixels for images).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl PageSize {
    /// ISO A4 in points (210 x 297 mm).
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    /// US Letter in points (8.5 x 11 in).
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    /// Create a page size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both sides are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// A document whose pages can be measured and rasterized.
///
/// Page numbers are 1-indexed.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Natural size of a page.
    fn page_size(&self, page: usize) -> Result<PageSize>;

    /// Rasterize a page at `scale` pixels per unit.
    ///
    /// Failures are reported as [`Error::Rasterization`].
    fn rasterize(&self, page: usize, scale: f32) -> Result<RgbaImage>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        (**self).page_size(page)
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RgbaImage> {
        (**self).rasterize(page, scale)
    }
}

impl<T: PageSource + ?Sized> PageSource for std::sync::Arc<T> {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        (**self).page_size(page)
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RgbaImage> {
        (**self).rasterize(page, scale)
    }
}

/// Check a 1-indexed page number against a page count.
pub(crate) fn check_page(page: usize, page_count: usize) -> Result<()> {
    if page == 0 || page > page_count {
        return Err(Error::PageOutOfRange(page, page_count));
    }
    Ok(())
}

/// Pixel size of a page rasterized at `scale`, never zero.
pub(crate) fn scaled_dimensions(size: PageSize, scale: f32) -> (u32, u32) {
    let w = (size.width * scale).round().max(1.0) as u32;
    let h = (size.height * scale).round().max(1.0) as u32;
    (w, h)
}
