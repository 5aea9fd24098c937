//! Background rendering on a tokio runtime.
//!
//! Rasterization is blocking work, so each render runs on the blocking pool.
//! A render lock keeps at most one rasterization running at a time; requests
//! made while one is in flight queue behind it and the stale ones are dropped
//! by their token check.

use super::coordinator::{RenderAttempt, RenderCoordinator, RenderOutcome};
use super::options::ViewOptions;
use super::view::{render_view, RenderedView};
use crate::error::Error;
use crate::model::SpacerStore;
use crate::source::PageSource;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs view renders off the caller's task, one at a time.
#[derive(Debug, Clone)]
pub struct RenderWorker<S> {
    source: Arc<S>,
    coordinator: RenderCoordinator,
    lock: Arc<Mutex<()>>,
}

impl<S: PageSource + Send + Sync + 'static> RenderWorker<S> {
    /// Create a worker rendering pages of `source`.
    pub fn new(source: Arc<S>, coordinator: RenderCoordinator) -> Self {
        Self {
            source,
            coordinator,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Coordinator issuing this worker's tokens.
    pub fn coordinator(&self) -> &RenderCoordinator {
        &self.coordinator
    }

    /// Request a render of a copy of `store` and wait for its outcome.
    pub async fn render(&self, store: &SpacerStore, options: ViewOptions) -> RenderOutcome<RenderedView> {
        let attempt = self.coordinator.begin();
        self.render_attempt(attempt, store.clone(), options).await
    }

    /// Run an already requested attempt.
    pub async fn render_attempt(
        &self,
        attempt: RenderAttempt,
        store: SpacerStore,
        options: ViewOptions,
    ) -> RenderOutcome<RenderedView> {
        let _guard = self.lock.lock().await;
        if !self.coordinator.is_current(&attempt) {
            log::debug!("render {} overtaken before it started", attempt.token().value());
            return RenderOutcome::Superseded;
        }

        let source = Arc::clone(&self.source);
        let coordinator = self.coordinator.clone();
        let task = tokio::task::spawn_blocking(move || {
            render_view(source.as_ref(), &store, &options, &coordinator, attempt)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => RenderOutcome::Failed(Error::Task(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Spacer;
    use crate::source::RasterPages;
    use image::{Rgba, RgbaImage};

    fn worker() -> RenderWorker<RasterPages> {
        let pages = RasterPages::new(vec![RgbaImage::from_pixel(10, 50, Rgba([0, 0, 0, 255]))]);
        RenderWorker::new(Arc::new(pages), RenderCoordinator::new())
    }

    #[tokio::test]
    async fn test_render_in_background() {
        let worker = worker();
        let mut store = SpacerStore::new();
        store.insert(1, Spacer::plain("a", 10.0, 20.0)).unwrap();

        let view = worker.render(&store, ViewOptions::new()).await.completed().unwrap();
        assert_eq!(view.total_height, 70.0);
    }

    #[tokio::test]
    async fn test_queued_stale_render_is_skipped() {
        let worker = worker();
        let stale = worker.coordinator().begin();
        let fresh = worker.coordinator().begin();

        let outcome = worker
            .render_attempt(stale, SpacerStore::new(), ViewOptions::new())
            .await;
        assert!(outcome.is_superseded());

        let outcome = worker
            .render_attempt(fresh, SpacerStore::new(), ViewOptions::new())
            .await;
        assert!(outcome.completed().is_some());
    }
}
