//! Export: re-rendering the whole document with its spacers and paginating it.
//!
//! Source pages are processed strictly in order, one at a time: rasterize,
//! plan, composite, slice. Only the current composite is alive at any moment
//! in paginated mode. If any page fails to rasterize the export stops and
//! everything produced so far is dropped.
//!
//! # Example
//!
//! ```
//! use answerspace::export::export_document;
//! use answerspace::model::{Spacer, SpacerStore};
//! use answerspace::render::ExportOptions;
//! use answerspace::source::{PageSize, RasterPages};
//! use image::{Rgba, RgbaImage};
//!
//! let pages = RasterPages::new(vec![RgbaImage::from_pixel(595, 842, Rgba([0, 0, 0, 255]))]);
//! let mut store = SpacerStore::new();
//! store.insert(1, Spacer::plain("1", 400.0, 300.0)).unwrap();
//!
//! let options = ExportOptions::new().with_dpi(0.5).with_page_size(PageSize::A4);
//! let doc = export_document(&pages, &store, &options).unwrap();
//! assert_eq!(doc.page_count(), 2);
//! ```

mod writer;

pub use writer::{encode_page, page_file_name, DirectorySink, MemorySink, OutputFormat, PageSink};

use crate::error::{Error, Result};
use crate::layout::plan_segments;
use crate::model::SpacerStore;
use crate::render::{build_composite, stitch_long, CompositeRaster, ExportMode, ExportOptions, OutputPage, PageSlicer};
use crate::source::PageSource;
use serde::Serialize;

/// Progress of a running export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportProgress {
    /// Source page just finished (1-indexed)
    pub page: usize,
    /// Number of source pages
    pub total: usize,
}

impl ExportProgress {
    /// Completed fraction, 0..=1.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.page as f32 / self.total as f32
    }
}

/// Statistics collected during an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportStats {
    /// Source pages processed
    pub source_pages: usize,

    /// Spacers inserted
    pub spacer_count: usize,

    /// Output pages produced
    pub output_pages: usize,

    /// Total composite height in pixels
    pub composite_rows: u64,
}

/// A complete export, ready for the document assembler.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// Output pages in order
    pub pages: Vec<OutputPage>,

    /// Options the export ran with
    pub options: ExportOptions,

    /// Export statistics
    pub stats: ExportStats,
}

impl ExportedDocument {
    /// Number of output pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Output page width in units (points).
    pub fn page_width(&self) -> f32 {
        self.options.page_size.width
    }

    /// Height of each output page in units; in long mode the height of the
    /// single page.
    pub fn page_height(&self) -> f32 {
        match self.pages.first() {
            Some(page) if self.options.mode == ExportMode::Long => page.image.height() as f32 / self.options.dpi,
            _ => self.options.page_size.height,
        }
    }

    /// Hand every page to `sink` in order.
    ///
    /// On failure the sink is aborted, so nothing from a partial write is kept.
    pub fn write_to(&self, sink: &mut dyn PageSink) -> Result<usize> {
        let result = self
            .pages
            .iter()
            .try_for_each(|page| sink.accept(page))
            .and_then(|()| sink.finish());
        if let Err(e) = result {
            log::warn!("export write failed, discarding partial output: {}", e);
            sink.abort();
            return Err(e);
        }
        Ok(self.pages.len())
    }
}

/// Export a document with its spacers inserted.
pub fn export_document<S: PageSource + ?Sized>(
    source: &S,
    store: &SpacerStore,
    options: &ExportOptions,
) -> Result<ExportedDocument> {
    export_document_with_progress(source, store, options, |_| {})
}

/// Export a document, reporting progress after every source page.
pub fn export_document_with_progress<S, F>(
    source: &S,
    store: &SpacerStore,
    options: &ExportOptions,
    mut progress: F,
) -> Result<ExportedDocument>
where
    S: PageSource + ?Sized,
    F: FnMut(ExportProgress),
{
    options.validate()?;
    let total = source.page_count();
    if total == 0 {
        return Err(Error::InvalidOption("document has no pages to export".into()));
    }

    let width = options.page_width_px();
    let mut stats = ExportStats {
        source_pages: total,
        spacer_count: store.len(),
        ..Default::default()
    };

    let pages = match options.mode {
        ExportMode::Paginated => {
            let mut slicer = PageSlicer::new(width, options.page_height_px(), options.slice_policy())?;
            let mut pages = Vec::new();
            for page in 1..=total {
                let composite = compose_page(source, store, page, width)?;
                stats.composite_rows += composite.height() as u64;
                pages.extend(slicer.push(page, &composite.image));
                progress(ExportProgress { page, total });
            }
            pages.extend(slicer.finish());
            pages
        }
        ExportMode::Long => {
            let mut composites = Vec::with_capacity(total);
            for page in 1..=total {
                let composite = compose_page(source, store, page, width)?;
                stats.composite_rows += composite.height() as u64;
                composites.push(composite);
                progress(ExportProgress { page, total });
            }
            vec![stitch_long(&composites, width)]
        }
    };

    stats.output_pages = pages.len();
    log::info!(
        "exported {} source pages with {} spacers into {} output pages ({:?})",
        stats.source_pages,
        stats.spacer_count,
        stats.output_pages,
        options.mode
    );

    Ok(ExportedDocument {
        pages,
        options: options.clone(),
        stats,
    })
}

/// Rasterize one source page so it spans `width` pixels and insert its spacers.
fn compose_page<S: PageSource + ?Sized>(source: &S, store: &SpacerStore, page: usize, width: u32) -> Result<CompositeRaster> {
    let size = source.page_size(page)?;
    let scale_to_width = width as f32 / size.width;
    let raster = source.rasterize(page, scale_to_width).map_err(|e| {
        log::warn!("export aborted: {}", e);
        e
    })?;

    let segments = plan_segments(size.height, store.spacers_on(page));
    Ok(build_composite(page, &raster, &segments, width, scale_to_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Spacer;
    use crate::render::SlicePolicy;
    use crate::source::{PageSize, RasterPages};
    use image::{Rgba, RgbaImage};

    fn pages(n: usize, w: u32, h: u32) -> RasterPages {
        RasterPages::new((0..n).map(|_| RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))).collect())
    }

    fn options() -> ExportOptions {
        ExportOptions::new().with_dpi(1.0).with_page_size(PageSize::new(10.0, 20.0))
    }

    #[test]
    fn test_no_spacers_one_to_one() {
        let doc = export_document(&pages(3, 10, 20), &SpacerStore::new(), &options()).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.stats.composite_rows, 60);
        assert!(doc.pages.iter().all(|p| !p.is_padded()));
    }

    #[test]
    fn test_spacer_pushes_content_to_next_page() {
        let mut store = SpacerStore::new();
        store.insert(1, Spacer::plain("a", 10.0, 10.0)).unwrap();
        let doc = export_document(&pages(1, 10, 20), &store, &options()).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[1].filled_rows, 10);
        assert_eq!(*doc.pages[1].image.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_independent_policy() {
        let mut store = SpacerStore::new();
        store.insert(1, Spacer::plain("a", 10.0, 10.0)).unwrap();
        let opts = options().independent();
        assert_eq!(opts.slice_policy(), SlicePolicy::Independent);
        let doc = export_document(&pages(2, 10, 20), &store, &opts).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages[2].sources, vec![2]);
    }

    #[test]
    fn test_rasterizes_to_output_width() {
        // 5 unit wide pages exported onto a 10 px wide page: everything doubles.
        let doc = export_document(&pages(1, 5, 10), &SpacerStore::new(), &options()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].filled_rows, 20);
    }

    #[test]
    fn test_long_mode_single_page() {
        let mut store = SpacerStore::new();
        store.insert(2, Spacer::plain("a", 0.0, 5.0)).unwrap();
        let opts = options().with_mode(ExportMode::Long);
        let doc = export_document(&pages(2, 10, 20), &store, &opts).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].image.dimensions(), (10, 45));
        assert_eq!(doc.page_height(), 45.0);
    }

    #[test]
    fn test_failure_discards_everything() {
        let source = pages(3, 10, 20).with_failing_page(2);
        let mut seen = Vec::new();
        let result = export_document_with_progress(&source, &SpacerStore::new(), &options(), |p| seen.push(p.page));
        assert!(matches!(result, Err(Error::Rasterization { page: 2, .. })));
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_progress_reports_every_page() {
        let mut seen = Vec::new();
        export_document_with_progress(&pages(3, 10, 20), &SpacerStore::new(), &options(), |p| seen.push(p)).unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].fraction(), 1.0);
    }

    #[test]
    fn test_rejects_bad_options_and_empty_documents() {
        let store = SpacerStore::new();
        assert!(export_document(&pages(1, 10, 20), &store, &options().with_dpi(0.0)).is_err());
        assert!(matches!(
            export_document(&pages(0, 10, 20), &store, &options()),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn test_write_to_sink() {
        let doc = export_document(&pages(2, 10, 20), &SpacerStore::new(), &options()).unwrap();
        let mut sink = MemorySink::new(OutputFormat::Png, 0.8);
        assert_eq!(doc.write_to(&mut sink).unwrap(), 2);
        assert_eq!(sink.pages.len(), 2);
    }
}
