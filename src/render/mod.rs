//! Rendering: drawing spacers, building reflowed rasters and paginating them.

mod composite;
mod coordinator;
mod options;
mod pattern;
mod slicer;
#[cfg(feature = "async")]
pub mod tasks;
mod view;

pub use composite::{build_composite, composite_height, CompositeRaster, SpacerBox};
pub use coordinator::{RenderAttempt, RenderCoordinator, RenderOutcome, RenderState, RenderToken};
pub use options::{clamp_zoom, ExportMode, ExportOptions, SlicePolicy, ViewOptions, MAX_ZOOM, MIN_ZOOM};
pub use pattern::{render_pattern, Pattern, Region, PAPER, PATTERN_INK};
pub use slicer::{slice_to_pages, stitch_long, OutputPage, PageSlicer};
pub use view::{render_view, RenderedView, ViewPage, ViewState};
