//! Reflow layout: where content and spacers land once spacers push content down.

mod breaks;
mod planner;

pub use breaks::page_break_guides;
pub use planner::{
    plan_segments, reflowed_height, reflowed_top, sort_spacers, to_reflowed_y, to_source_y,
    Segment,
};
