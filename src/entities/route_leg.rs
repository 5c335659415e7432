use serde::{Deserialize, Serialize};

use crate::entities::Coordinate;

/// The walking path between two consecutive waypoints. Never mutated after
/// the fetcher assembles it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub path: Vec<Coordinate>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
}
