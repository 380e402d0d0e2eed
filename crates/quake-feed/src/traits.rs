//! Seams between the pipeline and where events come from.

use async_trait::async_trait;
use quake_common::{RawEventBatch, Result};
use std::sync::Arc;

/// Anything that can produce a fresh snapshot of events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches one complete batch. Never served from a cache.
    async fn fetch(&self) -> Result<RawEventBatch>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Arc<S> {
    async fn fetch(&self) -> Result<RawEventBatch> {
        (**self).fetch().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
