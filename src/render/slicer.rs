//! Pagination: cutting reflowed rasters into fixed-size output pages.
//!
//! The slicer is fed one composite at a time, so an export only ever holds the
//! current composite plus the output pages produced so far.
//!
//! # Example
//!
//! ```
//! use answerspace::render::{PageSlicer, SlicePolicy};
//! use image::RgbaImage;
//!
//! let mut slicer = PageSlicer::new(100, 842, SlicePolicy::Continuous).unwrap();
//! let mut pages = slicer.push(1, &RgbaImage::new(100, 1000));
//! pages.extend(slicer.push(2, &RgbaImage::new(100, 500)));
//! pages.extend(slicer.finish());
//! assert_eq!(pages.len(), 2);
//! ```

use super::composite::CompositeRaster;
use super::options::SlicePolicy;
use super::pattern::PAPER;
use crate::error::{Error, Result};
use image::RgbaImage;

/// One page of the exported document.
#[derive(Debug, Clone)]
pub struct OutputPage {
    /// 1-indexed output page number
    pub number: usize,

    /// Page pixels
    pub image: RgbaImage,

    /// Source pages that contributed rows, in order
    pub sources: Vec<usize>,

    /// Rows filled from composites; rows below are white padding
    pub filled_rows: u32,
}

impl OutputPage {
    fn blank(number: usize, width: u32, height: u32) -> Self {
        Self {
            number,
            image: RgbaImage::from_pixel(width, height, PAPER),
            sources: Vec::new(),
            filled_rows: 0,
        }
    }

    /// Whether the page was padded with white below its content.
    pub fn is_padded(&self) -> bool {
        self.filled_rows < self.image.height()
    }
}

/// Incremental slicer with a running cursor into the composite stream.
#[derive(Debug)]
pub struct PageSlicer {
    width: u32,
    height: u32,
    policy: SlicePolicy,
    pending: Option<OutputPage>,
    emitted: usize,
}

impl PageSlicer {
    /// Create a slicer producing `width x height` pixel pages.
    pub fn new(width: u32, height: u32, policy: SlicePolicy) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidOption(format!(
                "output page must be at least 1x1 px (got {}x{})",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            policy,
            pending: None,
            emitted: 0,
        })
    }

    /// Number of pages completed so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Feed the next composite and return the pages it completed.
    pub fn push(&mut self, source_page: usize, raster: &RgbaImage) -> Vec<OutputPage> {
        match self.policy {
            SlicePolicy::Continuous => self.push_continuous(source_page, raster),
            SlicePolicy::Independent => self.push_independent(source_page, raster),
        }
    }

    /// Emit the last, partially filled page (continuous policy only).
    pub fn finish(mut self) -> Option<OutputPage> {
        let page = self.pending.take().filter(|p| p.filled_rows > 0)?;
        log::debug!(
            "final output page {} padded below row {}",
            page.number,
            page.filled_rows
        );
        Some(page)
    }

    fn next_blank(&mut self) -> OutputPage {
        OutputPage::blank(self.emitted + 1, self.width, self.height)
    }

    fn push_continuous(&mut self, source_page: usize, raster: &RgbaImage) -> Vec<OutputPage> {
        let mut done = Vec::new();
        let mut slice_offset = 0u32;

        while slice_offset < raster.height() {
            let mut page = match self.pending.take() {
                Some(page) => page,
                None => self.next_blank(),
            };

            let remaining_in_slice = raster.height() - slice_offset;
            let remaining_on_page = self.height - page.filled_rows;
            let rows = remaining_in_slice.min(remaining_on_page);

            copy_rows(raster, slice_offset, &mut page.image, page.filled_rows, rows);
            page.filled_rows += rows;
            slice_offset += rows;
            if page.sources.last() != Some(&source_page) {
                page.sources.push(source_page);
            }

            if page.filled_rows == self.height {
                self.emitted += 1;
                done.push(page);
            } else {
                self.pending = Some(page);
            }
        }
        done
    }

    fn push_independent(&mut self, source_page: usize, raster: &RgbaImage) -> Vec<OutputPage> {
        let mut done = Vec::new();
        let mut offset = 0u32;

        loop {
            let mut page = self.next_blank();
            let rows = (raster.height() - offset).min(self.height);
            copy_rows(raster, offset, &mut page.image, 0, rows);
            page.filled_rows = rows;
            page.sources.push(source_page);
            offset += rows;
            self.emitted += 1;
            done.push(page);

            if offset >= raster.height() {
                break;
            }
        }
        done
    }
}

/// Copy `rows` full rows of `src` starting at `src_y` into `dst` at `dst_y`.
///
/// Rows are clipped to the narrower of the two widths.
fn copy_rows(src: &RgbaImage, src_y: u32, dst: &mut RgbaImage, dst_y: u32, rows: u32) {
    let width = src.width().min(dst.width()) as usize * 4;
    let src_stride = src.width() as usize * 4;
    let dst_stride = dst.width() as usize * 4;
    let src_raw = src.as_raw();
    let dst_raw: &mut [u8] = dst;

    for r in 0..rows as usize {
        let s = (src_y as usize + r) * src_stride;
        let d = (dst_y as usize + r) * dst_stride;
        dst_raw[d..d + width].copy_from_slice(&src_raw[s..s + width]);
    }
}

/// Slice a sequence of composites into output pages.
///
/// With [`SlicePolicy::Continuous`] the page count is
/// `ceil(total height / page height)`; with [`SlicePolicy::Independent`] every
/// composite is paginated on its own and padded with white.
pub fn slice_to_pages(rasters: &[CompositeRaster], width: u32, height: u32, policy: SlicePolicy) -> Result<Vec<OutputPage>> {
    let mut slicer = PageSlicer::new(width, height, policy)?;
    let mut pages = Vec::new();
    for raster in rasters {
        pages.extend(slicer.push(raster.page, &raster.image));
    }
    pages.extend(slicer.finish());
    Ok(pages)
}

/// Stack composites into one long page of `width` pixels.
pub fn stitch_long<'a>(rasters: impl IntoIterator<Item = &'a CompositeRaster>, width: u32) -> OutputPage {
    let rasters: Vec<&CompositeRaster> = rasters.into_iter().collect();
    let total: u32 = rasters.iter().map(|r| r.height()).sum();

    let mut page = OutputPage::blank(1, width, total);
    for raster in rasters {
        copy_rows(&raster.image, 0, &mut page.image, page.filled_rows, raster.height());
        page.filled_rows += raster.height();
        page.sources.push(raster.page);
    }
    page
}
