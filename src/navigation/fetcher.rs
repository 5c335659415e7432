use std::sync::{Arc, Mutex, MutexGuard};

use super::{polyline, Failure, RetryPolicy, SegmentCache};
use crate::{
    entities::{Coordinate, RouteLeg},
    external::DynProvider,
};

/// Fetches walking legs, consulting the session's segment cache first.
///
/// Clones share one cache, so a fetcher must never be handed to a second
/// session: build a new one instead.
#[derive(Clone)]
pub struct RouteFetcher {
    provider: DynProvider,
    cache: Arc<Mutex<SegmentCache>>,
    retry: RetryPolicy,
}

impl RouteFetcher {
    pub fn new(provider: DynProvider, retry: RetryPolicy) -> Self {
        Self {
            provider,
            cache: Arc::new(Mutex::new(SegmentCache::new())),
            retry,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_leg(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Arc<RouteLeg>, Failure> {
        let cached = self.cache().get(origin, destination);
        if let Some(leg) = cached {
            tracing::debug!("segment cache hit");
            return Ok(leg);
        }

        let candidates = self
            .retry
            .run(|| async {
                self.provider
                    .walking_directions(origin, destination)
                    .await
                    .map_err(Failure::Transient)
            })
            .await?;

        // The provider orders candidates best-first.
        let route = candidates.into_iter().next().ok_or(Failure::NotFound)?;

        let fragments: Vec<&str> = route.steps.iter().map(|step| step.polyline.as_str()).collect();
        let path = polyline::decode(&fragments);

        if path.is_empty() {
            tracing::warn!(steps = route.steps.len(), "provider returned a route without a path");
        }

        let leg = RouteLeg {
            origin,
            destination,
            path,
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
        };

        Ok(self.cache().put(origin, destination, leg))
    }

    pub fn cached_legs(&self) -> usize {
        self.cache().len()
    }

    // The lock is never held across an await.
    fn cache(&self) -> MutexGuard<'_, SegmentCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
