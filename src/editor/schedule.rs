//! Coalescing of rapid edits into at most one render per frame.

/// Collects render requests until the next animation frame.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: bool,
    coalesced: u64,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a render on the next frame.
    ///
    /// Returns `true` if this request scheduled the frame and `false` if it
    /// was folded into one already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            return false;
        }
        self.pending = true;
        true
    }

    /// Whether a frame is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Run the frame. Returns `true` if a render was requested since the last one.
    pub fn fire(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        if self.coalesced > 0 {
            log::debug!("coalesced {} edits into one render", self.coalesced + 1);
        }
        self.pending = false;
        self.coalesced = 0;
        true
    }
}
