pub mod amap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{entities::Coordinate, error::Error};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub steps: Vec<RouteStep>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub polyline: String,
}

/// The geocoding/routing service navigation depends on. Results are returned
/// in the provider's own order; callers take the first entry.
#[async_trait]
pub trait Provider {
    async fn search_place(
        &self,
        keyword: &str,
        city: Option<&str>,
    ) -> Result<Vec<PlaceCandidate>, Error>;

    async fn walking_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<CandidateRoute>, Error>;
}

pub type DynProvider = Arc<dyn Provider + Send + Sync>;
