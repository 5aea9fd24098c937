//! Render tokens: detecting and dropping superseded interactive renders.
//!
//! Rasterization cannot be interrupted, so a render that was overtaken by a
//! newer request still runs to completion. Each request takes a fresh token;
//! when a render finishes it is only accepted if its token is still the latest.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing render request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderToken(u64);

impl RenderToken {
    /// Raw token value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// One requested render, carrying the token it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderAttempt {
    token: RenderToken,
}

impl RenderAttempt {
    /// Token captured when the render was requested.
    pub fn token(&self) -> RenderToken {
        self.token
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// The latest request has completed (or nothing was requested yet)
    Idle,
    /// The latest request is still in flight
    Rendering(RenderToken),
}

/// Result of a finished render attempt.
#[derive(Debug)]
pub enum RenderOutcome<T> {
    /// The attempt was current and succeeded
    Completed(T),
    /// A newer attempt was requested; the result was dropped
    Superseded,
    /// The attempt was current and failed
    Failed(Error),
}

impl<T> RenderOutcome<T> {
    /// Whether the result was dropped as stale.
    pub fn is_superseded(&self) -> bool {
        matches!(self, RenderOutcome::Superseded)
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            RenderOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Issues render tokens and checks them on completion.
///
/// Clones share the same counters, so a clone can be moved into a background
/// task and still observe newer requests.
#[derive(Debug, Clone, Default)]
pub struct RenderCoordinator {
    latest: Arc<AtomicU64>,
    settled: Arc<AtomicU64>,
}

impl RenderCoordinator {
    /// Create a coordinator with no renders requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a new render, superseding every earlier attempt.
    pub fn begin(&self) -> RenderAttempt {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("render {} requested", token);
        RenderAttempt {
            token: RenderToken(token),
        }
    }

    /// Whether no newer render was requested after `attempt`.
    pub fn is_current(&self, attempt: &RenderAttempt) -> bool {
        self.latest.load(Ordering::SeqCst) == attempt.token.0
    }

    /// Finish an attempt, keeping its result only if it is still current.
    pub fn complete<T>(&self, attempt: RenderAttempt, result: Result<T>) -> RenderOutcome<T> {
        if !self.is_current(&attempt) {
            log::warn!(
                "discarding render {} (latest is {})",
                attempt.token.0,
                self.latest.load(Ordering::SeqCst)
            );
            return RenderOutcome::Superseded;
        }

        self.settled.fetch_max(attempt.token.0, Ordering::SeqCst);
        match result {
            Ok(value) => RenderOutcome::Completed(value),
            Err(e) => {
                log::warn!("render {} failed: {}", attempt.token.0, e);
                RenderOutcome::Failed(e)
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> RenderState {
        let latest = self.latest.load(Ordering::SeqCst);
        if self.settled.load(Ordering::SeqCst) >= latest {
            RenderState::Idle
        } else {
            RenderState::Rendering(RenderToken(latest))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        assert_eq!(RenderCoordinator::new().state(), RenderState::Idle);
    }

    #[test]
    fn test_tokens_increase() {
        let coordinator = RenderCoordinator::new();
        let a = coordinator.begin();
        let b = coordinator.begin();
        assert!(b.token() > a.token());
        assert_eq!(coordinator.state(), RenderState::Rendering(b.token()));
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let coordinator = RenderCoordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(!coordinator.is_current(&first));
        assert!(coordinator.complete(first, Ok(1)).is_superseded());
        assert!(matches!(coordinator.state(), RenderState::Rendering(_)));

        assert_eq!(coordinator.complete(second, Ok(2)).completed(), Some(2));
        assert_eq!(coordinator.state(), RenderState::Idle);
    }

    #[test]
    fn test_stale_failure_is_dropped() {
        let coordinator = RenderCoordinator::new();
        let first = coordinator.begin();
        let _second = coordinator.begin();
        let outcome: RenderOutcome<()> = coordinator.complete(first, Err(Error::rasterization(1, "boom")));
        assert!(outcome.is_superseded());
    }

    #[test]
    fn test_current_failure_is_reported() {
        let coordinator = RenderCoordinator::new();
        let attempt = coordinator.begin();
        let outcome: RenderOutcome<()> = coordinator.complete(attempt, Err(Error::rasterization(2, "boom")));
        assert!(matches!(
            outcome,
            RenderOutcome::Failed(Error::Rasterization { page: 2, .. })
        ));
        assert_eq!(coordinator.state(), RenderState::Idle);
    }

    #[test]
    fn test_clones_share_tokens() {
        let coordinator = RenderCoordinator::new();
        let handle = coordinator.clone();
        let attempt = handle.begin();
        coordinator.begin();
        assert!(!handle.is_current(&attempt));
    }
}
