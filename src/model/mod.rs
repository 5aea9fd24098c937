//! Editable data: spacers, their per-page store and persisted settings.
//!
//! Spacer offsets are stored in original page coordinates. Reflowed positions
//! are derived on demand by the [`layout`](crate::layout) planner and never
//! written back here.

mod settings;
mod spacer;
mod store;

pub use settings::{Project, Settings};
pub use spacer::{
    Spacer, SpacerPreset, SpacerProperty, SpacerStyle, DEFAULT_SPACER_HEIGHT, DUPLICATE_OFFSET,
    MIN_RESIZE_HEIGHT,
};
pub use store::{SpacerLocation, SpacerStore};
