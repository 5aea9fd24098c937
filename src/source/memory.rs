//! In-memory page source backed by ready-made rasters.

use super::{check_page, scaled_dimensions, PageSize, PageSource};
use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Pages held as rasters at one unit per pixel.
///
/// Pages can be marked as failing to exercise rasterization error handling.
#[derive(Debug, Clone, Default)]
pub struct RasterPages {
    pages: Vec<RgbaImage>,
    failing: Vec<usize>,
}

impl RasterPages {
    /// Create a source from page rasters.
    pub fn new(pages: Vec<RgbaImage>) -> Self {
        Self {
            pages,
            failing: Vec::new(),
        }
    }

    /// Append a page.
    pub fn push(&mut self, page: RgbaImage) {
        self.pages.push(page);
    }

    /// Make rasterization of a 1-indexed page fail.
    pub fn with_failing_page(mut self, page: usize) -> Self {
        self.failing.push(page);
        self
    }
}

impl PageSource for RasterPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        check_page(page, self.pages.len())?;
        let raster = &self.pages[page - 1];
        Ok(PageSize::new(raster.width() as f32, raster.height() as f32))
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RgbaImage> {
        check_page(page, self.pages.len())?;
        if self.failing.contains(&page) {
            return Err(Error::rasterization(page, "page marked as failing"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::rasterization(page, format!("invalid scale {}", scale)));
        }

        let raster = &self.pages[page - 1];
        let size = PageSize::new(raster.width() as f32, raster.height() as f32);
        let (w, h) = scaled_dimensions(size, scale);
        if (w, h) == raster.dimensions() {
            return Ok(raster.clone());
        }
        Ok(imageops::resize(raster, w, h, FilterType::Triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_rasterize_scales() {
        let source = RasterPages::new(vec![RgbaImage::from_pixel(10, 20, Rgba([0, 0, 0, 255]))]);
        assert_eq!(source.page_size(1).unwrap(), PageSize::new(10.0, 20.0));
        assert_eq!(source.rasterize(1, 1.0).unwrap().dimensions(), (10, 20));
        assert_eq!(source.rasterize(1, 2.0).unwrap().dimensions(), (20, 40));
    }

    #[test]
    fn test_failing_page() {
        let source = RasterPages::new(vec![RgbaImage::new(4, 4), RgbaImage::new(4, 4)])
            .with_failing_page(2);
        assert!(source.rasterize(1, 1.0).is_ok());
        assert!(matches!(
            source.rasterize(2, 1.0),
            Err(Error::Rasterization { page: 2, .. })
        ));
        assert!(matches!(
            source.rasterize(3, 1.0),
            Err(Error::PageOutOfRange(3, 2))
        ));
    }
}
