//! The interactive, continuous document view.

use super::composite::{build_composite, CompositeRaster};
use super::coordinator::{RenderAttempt, RenderCoordinator, RenderOutcome, RenderToken};
use super::options::ViewOptions;
use crate::error::Result;
use crate::layout::{page_break_guides, plan_segments, reflowed_height};
use crate::model::SpacerStore;
use crate::source::PageSource;

/// One page of the stacked view.
#[derive(Debug, Clone)]
pub struct ViewPage {
    /// 1-indexed page number
    pub page: usize,

    /// Top of the page in the stacked document, in display pixels
    pub doc_offset: f32,

    /// Reflowed page height in display pixels
    pub display_height: f32,

    /// Reflowed raster at `scale * device_pixel_ratio`
    pub composite: CompositeRaster,

    /// Output page-break guides relative to the page top, in display pixels
    pub page_breaks: Vec<f32>,
}

/// A finished render of the whole document.
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// Token of the render that produced this view
    pub token: RenderToken,

    /// Zoom the view was rendered at
    pub scale: f32,

    /// Pages in order
    pub pages: Vec<ViewPage>,

    /// Height of the stacked document in display pixels
    pub total_height: f32,
}

impl RenderedView {
    /// Page containing the stacked-document offset `doc_y`.
    pub fn page_at(&self, doc_y: f32) -> Option<&ViewPage> {
        self.pages
            .iter()
            .find(|p| doc_y >= p.doc_offset && doc_y < p.doc_offset + p.display_height)
    }
}

/// Render every page with its spacers inserted, stacked top to bottom.
///
/// The attempt's token is checked after each page is rasterized; once a newer
/// render has been requested the remaining pages are skipped and the outcome
/// is [`RenderOutcome::Superseded`].
pub fn render_view<S: PageSource + ?Sized>(
    source: &S,
    store: &SpacerStore,
    options: &ViewOptions,
    coordinator: &RenderCoordinator,
    attempt: RenderAttempt,
) -> RenderOutcome<RenderedView> {
    match build_view(source, store, options, coordinator, &attempt) {
        Ok(Some(view)) => coordinator.complete(attempt, Ok(view)),
        Ok(None) => RenderOutcome::Superseded,
        Err(e) => coordinator.complete(attempt, Err(e)),
    }
}

fn build_view<S: PageSource + ?Sized>(
    source: &S,
    store: &SpacerStore,
    options: &ViewOptions,
    coordinator: &RenderCoordinator,
    attempt: &RenderAttempt,
) -> Result<Option<RenderedView>> {
    let raster_scale = options.raster_scale();
    let mut pages = Vec::with_capacity(source.page_count());
    let mut doc_offset = 0.0f32;

    for page in 1..=source.page_count() {
        let size = source.page_size(page)?;
        let raster = source.rasterize(page, raster_scale)?;
        if !coordinator.is_current(attempt) {
            log::debug!("render {} overtaken at page {}", attempt.token().value(), page);
            return Ok(None);
        }

        let spacers = store.spacers_on(page);
        let segments = plan_segments(size.height, spacers);
        let target_width = (size.width * raster_scale).round().max(1.0) as u32;
        let composite = build_composite(page, &raster, &segments, target_width, raster_scale);

        let display_height = reflowed_height(&segments) * options.scale;
        let page_breaks = if options.show_page_breaks {
            page_break_guides(
                doc_offset,
                display_height,
                size.width * options.scale,
                options.break_page_size,
            )
        } else {
            Vec::new()
        };

        pages.push(ViewPage {
            page,
            doc_offset,
            display_height,
            composite,
            page_breaks,
        });
        doc_offset += display_height;
    }

    Ok(Some(RenderedView {
        token: attempt.token(),
        scale: options.scale,
        pages,
        total_height: doc_offset,
    }))
}

/// What the viewer currently shows.
///
/// A failed render leaves the last good view in place and raises a one-shot
/// notice instead.
#[derive(Debug, Default)]
pub struct ViewState {
    current: Option<RenderedView>,
    notice: Option<String>,
}

impl ViewState {
    /// Create an empty view state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a render outcome. Returns true if the displayed view changed.
    pub fn apply(&mut self, outcome: RenderOutcome<RenderedView>) -> bool {
        match outcome {
            RenderOutcome::Completed(view) => {
                self.current = Some(view);
                true
            }
            RenderOutcome::Superseded => false,
            RenderOutcome::Failed(e) => {
                self.notice = Some(format!("Error rendering document: {}", e));
                false
            }
        }
    }

    /// The last successfully rendered view.
    pub fn current(&self) -> Option<&RenderedView> {
        self.current.as_ref()
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
