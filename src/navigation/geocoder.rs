use super::{Failure, RetryPolicy};
use crate::{
    entities::{Coordinate, Waypoint},
    external::DynProvider,
};

/// Resolves waypoint names to coordinates through the provider's place
/// search. Nothing is cached here; the session memoizes resolved waypoints.
#[derive(Clone)]
pub struct Geocoder {
    provider: DynProvider,
    city: Option<String>,
    retry: RetryPolicy,
}

impl Geocoder {
    pub fn new(provider: DynProvider, city: Option<String>, retry: RetryPolicy) -> Self {
        Self {
            provider,
            city,
            retry,
        }
    }

    #[tracing::instrument(skip(self, waypoint), fields(name = %waypoint.name))]
    pub async fn resolve(&self, waypoint: &Waypoint) -> Result<Coordinate, Failure> {
        if let Some(coordinate) = waypoint.coordinate {
            return Ok(coordinate);
        }

        let name = waypoint.name.trim();
        if name.is_empty() {
            return Err(Failure::NotFound);
        }

        let coordinate = self.retry.run(|| self.search(name)).await?;
        tracing::debug!(?coordinate, "waypoint resolved");

        Ok(coordinate)
    }

    async fn search(&self, name: &str) -> Result<Coordinate, Failure> {
        let places = self
            .provider
            .search_place(name, self.city.as_deref())
            .await
            .map_err(Failure::Transient)?;

        places
            .into_iter()
            .next()
            .map(|place| place.coordinate)
            .ok_or(Failure::NotFound)
    }
}
