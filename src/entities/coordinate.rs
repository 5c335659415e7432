use geo::HaversineDistance;
use geo_types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Point::<f64>::from(*self).haversine_distance(&Point::from(*other))
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Coordinate> for String {
    /// The provider's `"longitude,latitude"` form.
    fn from(coordinate: Coordinate) -> Self {
        format!("{:.6},{:.6}", coordinate.longitude, coordinate.latitude)
    }
}
