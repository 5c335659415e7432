use serde::Serialize;

use super::{Session, Snapshot};
use crate::entities::{Coordinate, RouteLeg};

/// What the map should show. Derived from session state on every change and
/// never stored on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MapProjection {
    pub polyline: Vec<Coordinate>,
    pub start_marker: Option<Coordinate>,
    pub end_marker: Option<Coordinate>,
    pub camera_target: Option<Coordinate>,
}

impl MapProjection {
    pub fn from_leg(leg: Option<&RouteLeg>) -> Self {
        match leg {
            Some(leg) => Self {
                polyline: leg.path.clone(),
                start_marker: Some(leg.origin),
                end_marker: Some(leg.destination),
                camera_target: Some(leg.path.first().copied().unwrap_or(leg.origin)),
            },
            None => Self::default(),
        }
    }

    pub fn is_clear(&self) -> bool {
        self == &Self::default()
    }
}

pub fn project(session: &Session) -> MapProjection {
    MapProjection::from_leg(session.active_leg())
}

impl Snapshot {
    pub fn projection(&self) -> MapProjection {
        MapProjection::from_leg(self.active_leg.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Waypoint;

    fn leg(path: Vec<Coordinate>) -> RouteLeg {
        RouteLeg {
            origin: Coordinate::new(23.12, 113.25),
            destination: Coordinate::new(23.13, 113.26),
            path,
            distance_meters: None,
            duration_seconds: None,
        }
    }

    #[test]
    fn camera_follows_the_first_path_point() {
        let first = Coordinate::new(23.121, 113.251);
        let leg = leg(vec![first, Coordinate::new(23.129, 113.259)]);

        let projection = MapProjection::from_leg(Some(&leg));

        assert_eq!(projection.polyline.len(), 2);
        assert_eq!(projection.camera_target, Some(first));
        assert_eq!(projection.start_marker, Some(leg.origin));
        assert_eq!(projection.end_marker, Some(leg.destination));
    }

    #[test]
    fn empty_path_keeps_markers_and_centers_on_origin() {
        let leg = leg(Vec::new());

        let projection = MapProjection::from_leg(Some(&leg));

        assert!(projection.polyline.is_empty());
        assert_eq!(projection.start_marker, Some(leg.origin));
        assert_eq!(projection.end_marker, Some(leg.destination));
        assert_eq!(projection.camera_target, Some(leg.origin));
        assert!(!projection.is_clear());
    }

    #[test]
    fn idle_session_projects_nothing() {
        let session = Session::new(
            vec![Waypoint::named("A"), Waypoint::named("B")],
            30.0,
        )
        .unwrap();

        assert!(project(&session).is_clear());
        assert!(session.snapshot().projection().is_clear());
    }
}
