use serde::{Deserialize, Serialize};

use crate::entities::Coordinate;

/// A named stop of an itinerary. Authored itineraries may already carry the
/// coordinate; otherwise it is resolved by name during navigation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl Waypoint {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinate: None,
            detail: String::new(),
            image_ref: None,
        }
    }

    pub fn at(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..Self::named(name)
        }
    }
}
