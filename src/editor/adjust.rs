//! Two-phase drag and resize of a spacer.
//!
//! While the pointer is held only a preview ("ghost") moves; the store is
//! written once, on commit.

use crate::error::{Error, Result};
use crate::layout::reflowed_top;
use crate::model::{SpacerProperty, SpacerStore, MIN_RESIZE_HEIGHT};

/// Pointer travel, in display pixels, before a press on a spacer becomes a drag.
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

/// What the pointer is adjusting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    /// Moving the insertion offset
    Move,
    /// Dragging the bottom edge
    Resize,
}

/// Preview rectangle shown while adjusting, in reflowed page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ghost {
    /// 1-indexed page
    pub page: usize,
    /// Top edge in the reflowed page
    pub top: f32,
    /// Height
    pub height: f32,
}

/// Result of finishing an adjustment.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentOutcome {
    /// The store was updated
    Committed {
        /// Adjusted spacer
        id: String,
        /// Property written
        property: SpacerProperty,
    },
    /// The pointer never passed the drag threshold: treat as a click
    Clicked(String),
}

/// A drag or resize in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdjustment {
    id: String,
    page: usize,
    kind: AdjustmentKind,
    scale: f32,
    start_y: f32,
    start_height: f32,
    start_top: f32,
    delta_px: f32,
    active: bool,
}

impl PendingAdjustment {
    /// Start adjusting a spacer at the given view zoom.
    pub fn begin(store: &SpacerStore, id: &str, kind: AdjustmentKind, scale: f32) -> Result<Self> {
        let location = store
            .locate(id)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        let spacer = store
            .get(id)
            .ok_or_else(|| Error::SpacerNotFound(id.to_string()))?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidOption(format!("zoom must be > 0 (got {})", scale)));
        }
        let start_top = reflowed_top(store.spacers_on(location.page), id).unwrap_or(spacer.y);

        Ok(Self {
            id: id.to_string(),
            page: location.page,
            kind,
            scale,
            start_y: spacer.y,
            start_height: spacer.height,
            start_top,
            delta_px: 0.0,
            active: kind == AdjustmentKind::Resize,
        })
    }

    /// Spacer being adjusted.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kind of adjustment.
    pub fn kind(&self) -> AdjustmentKind {
        self.kind
    }

    /// Whether the pointer has moved enough to count as a drag.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Update the preview with the pointer travel since the press, in display pixels.
    pub fn update_preview(&mut self, delta_px: f32) {
        self.delta_px = delta_px;
        if !self.active && delta_px.abs() > DRAG_THRESHOLD_PX {
            self.active = true;
        }
    }

    /// Value that a commit would write: the new `y` or the new height.
    pub fn preview_value(&self) -> f32 {
        let delta = self.delta_px / self.scale;
        match self.kind {
            AdjustmentKind::Move => (self.start_y + delta).max(0.0),
            AdjustmentKind::Resize => (self.start_height + delta).max(MIN_RESIZE_HEIGHT),
        }
    }

    /// Preview rectangle for the current pointer position.
    pub fn ghost(&self) -> Ghost {
        match self.kind {
            AdjustmentKind::Move => Ghost {
                page: self.page,
                top: self.start_top + (self.preview_value() - self.start_y),
                height: self.start_height,
            },
            AdjustmentKind::Resize => Ghost {
                page: self.page,
                top: self.start_top,
                height: self.preview_value(),
            },
        }
    }

    /// Write the previewed value to the store.
    pub fn commit(self, store: &mut SpacerStore) -> Result<AdjustmentOutcome> {
        if !self.active {
            return Ok(AdjustmentOutcome::Clicked(self.id));
        }
        let property = match self.kind {
            AdjustmentKind::Move => SpacerProperty::Y(self.preview_value()),
            AdjustmentKind::Resize => SpacerProperty::Height(self.preview_value()),
        };
        store.update(&self.id, &property)?;
        log::debug!("committed {:?} of spacer {}", property, self.id);
        Ok(AdjustmentOutcome::Committed { id: self.id, property })
    }

    /// Abandon the adjustment; the store is untouched.
    pub fn cancel(self) {
        log::debug!("cancelled {:?} of spacer {}", self.kind, self.id);
    }
}
