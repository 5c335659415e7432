use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::Failure;
use crate::{
    entities::{Coordinate, RouteLeg, Waypoint},
    error::{invalid_input_error, invalid_state_error, unexpected_error, Error},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Idle,
    ResolvingWaypoints,
    FetchingRoute,
    Ready,
    Completed,
    Failed { reason: FailureReason },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    WaypointNotFound { index: usize, name: String },
    RouteNotFound,
    RoutingUnavailable,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Idle => "idle".into(),
            Self::ResolvingWaypoints => "resolving_waypoints".into(),
            Self::FetchingRoute => "fetching_route".into(),
            Self::Ready => "ready".into(),
            Self::Completed => "completed".into(),
            Self::Failed { reason } => format!("failed({})", reason),
        }
    }

    /// Whether a network job is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::ResolvingWaypoints | Self::FetchingRoute)
    }
}

impl FailureReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::WaypointNotFound { .. } => "waypoint-not-found",
            Self::RouteNotFound => "route-not-found",
            Self::RoutingUnavailable => "routing-unavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How a job obtains one endpoint of a segment.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Known(Coordinate),
    Query(Waypoint),
}

/// Network work requested by a transition. `op` identifies the job; its
/// outcome is only applied while it is still the session's pending job.
#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    Resolve {
        op: u64,
        index: usize,
        origin: Lookup,
        destination: Lookup,
    },
    Fetch {
        op: u64,
        index: usize,
        origin: Coordinate,
        destination: Coordinate,
    },
}

impl Job {
    pub fn op(&self) -> u64 {
        match self {
            Self::Resolve { op, .. } | Self::Fetch { op, .. } => *op,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Resolved {
        origin: Result<Coordinate, Failure>,
        destination: Result<Coordinate, Failure>,
    },
    Fetched(Result<Arc<RouteLeg>, Failure>),
}

/// Result of feeding a command or outcome to the session.
#[derive(Debug, PartialEq)]
#[must_use]
pub enum Step {
    /// Nothing changed: a coalesced duplicate or a stale outcome.
    Ignored,
    /// The status changed; the job, if any, must be run.
    Moved(Option<Job>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: Status,
    pub current_segment: Option<usize>,
    pub segment_count: usize,
    pub active_leg: Option<Arc<RouteLeg>>,
    pub last_known_location: Option<Coordinate>,
    pub arrived: bool,
}

/// Navigation state for one itinerary. Segment `i` joins waypoint `i` to
/// waypoint `i + 1`.
///
/// All methods are synchronous; network work is described by the returned
/// [`Job`] and its result handed back through [`Session::apply`].
#[derive(Debug)]
pub struct Session {
    itinerary: Vec<Waypoint>,
    resolved: Vec<Option<Coordinate>>,
    current_segment: Option<usize>,
    status: Status,
    active_leg: Option<Arc<RouteLeg>>,
    last_known_location: Option<Coordinate>,
    arrived: bool,
    arrival_radius_meters: f64,
    last_op: u64,
    pending_op: Option<u64>,
}

impl Session {
    pub fn new(itinerary: Vec<Waypoint>, arrival_radius_meters: f64) -> Result<Self, Error> {
        if itinerary.len() < 2 {
            return Err(invalid_input_error());
        }

        Ok(Self {
            resolved: itinerary.iter().map(|waypoint| waypoint.coordinate).collect(),
            itinerary,
            current_segment: None,
            status: Status::Idle,
            active_leg: None,
            last_known_location: None,
            arrived: false,
            arrival_radius_meters,
            last_op: 0,
            pending_op: None,
        })
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn current_segment(&self) -> Option<usize> {
        self.current_segment
    }

    pub fn segment_count(&self) -> usize {
        self.itinerary.len() - 1
    }

    pub fn itinerary(&self) -> &[Waypoint] {
        &self.itinerary
    }

    pub fn active_leg(&self) -> Option<&RouteLeg> {
        self.active_leg.as_deref()
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn resolved(&self, index: usize) -> Option<Coordinate> {
        self.resolved.get(index).copied().flatten()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status.clone(),
            current_segment: self.current_segment,
            segment_count: self.segment_count(),
            active_leg: self.active_leg.clone(),
            last_known_location: self.last_known_location,
            arrived: self.arrived,
        }
    }

    pub fn start(&mut self) -> Result<Step, Error> {
        match self.status {
            Status::Idle => Ok(self.begin_segment(0)),
            Status::ResolvingWaypoints | Status::FetchingRoute => Ok(Step::Ignored),
            _ => Err(invalid_state_error()),
        }
    }

    pub fn advance(&mut self) -> Result<Step, Error> {
        match self.status {
            Status::Ready => {
                let index = self.current_segment.ok_or_else(unexpected_error)?;

                if index + 2 < self.itinerary.len() {
                    Ok(self.begin_segment(index + 1))
                } else {
                    self.status = Status::Completed;
                    self.current_segment = None;
                    self.clear_leg();
                    Ok(Step::Moved(None))
                }
            }
            Status::ResolvingWaypoints | Status::FetchingRoute => Ok(Step::Ignored),
            _ => Err(invalid_state_error()),
        }
    }

    /// Re-enters the failed segment. Waypoints resolved before the failure
    /// are reused, so a segment that failed while fetching goes straight
    /// back to fetching.
    pub fn retry(&mut self) -> Result<Step, Error> {
        match self.status {
            Status::Failed { .. } => {
                let index = self.current_segment.ok_or_else(unexpected_error)?;
                Ok(self.begin_segment(index))
            }
            Status::ResolvingWaypoints | Status::FetchingRoute => Ok(Step::Ignored),
            _ => Err(invalid_state_error()),
        }
    }

    /// Returns to `Idle`. Any pending job is forgotten, so its outcome will
    /// be ignored when it arrives.
    pub fn reset(&mut self) -> Step {
        let was_idle = self.status == Status::Idle;

        self.pending_op = None;
        self.status = Status::Idle;
        self.current_segment = None;
        self.clear_leg();

        if was_idle {
            Step::Ignored
        } else {
            Step::Moved(None)
        }
    }

    /// Records the traveler's position. Returns true when this update
    /// raised the advisory arrival flag.
    pub fn update_location(&mut self, location: Coordinate) -> bool {
        self.last_known_location = Some(location);

        let reached = match (&self.status, &self.active_leg) {
            (Status::Ready, Some(leg)) => {
                location.distance_to(&leg.destination) < self.arrival_radius_meters
            }
            _ => false,
        };

        if reached && !self.arrived {
            self.arrived = true;
            return true;
        }

        false
    }

    pub fn apply(&mut self, op: u64, outcome: Outcome) -> Step {
        if self.pending_op != Some(op) {
            tracing::debug!(op, pending = ?self.pending_op, "discarding stale outcome");
            return Step::Ignored;
        }
        self.pending_op = None;

        let index = match self.current_segment {
            Some(index) => index,
            None => return Step::Ignored,
        };

        match outcome {
            Outcome::Resolved {
                origin,
                destination,
            } if self.status == Status::ResolvingWaypoints => {
                self.on_resolved(index, origin, destination)
            }
            Outcome::Fetched(result) if self.status == Status::FetchingRoute => {
                self.on_fetched(result)
            }
            outcome => {
                tracing::warn!(?outcome, status = %self.status.name(), "outcome does not match status");
                Step::Ignored
            }
        }
    }

    fn begin_segment(&mut self, index: usize) -> Step {
        self.current_segment = Some(index);
        self.clear_leg();

        match (self.resolved[index], self.resolved[index + 1]) {
            (Some(origin), Some(destination)) => self.begin_fetch(index, origin, destination),
            (origin, destination) => {
                self.status = Status::ResolvingWaypoints;

                let origin = self.lookup(index, origin);
                let destination = self.lookup(index + 1, destination);

                Step::Moved(Some(Job::Resolve {
                    op: self.next_op(),
                    index,
                    origin,
                    destination,
                }))
            }
        }
    }

    fn begin_fetch(&mut self, index: usize, origin: Coordinate, destination: Coordinate) -> Step {
        self.status = Status::FetchingRoute;

        Step::Moved(Some(Job::Fetch {
            op: self.next_op(),
            index,
            origin,
            destination,
        }))
    }

    fn on_resolved(
        &mut self,
        index: usize,
        origin: Result<Coordinate, Failure>,
        destination: Result<Coordinate, Failure>,
    ) -> Step {
        let mut missing = None;
        let mut unavailable = false;

        for (waypoint, result) in [(index, origin), (index + 1, destination)] {
            match result {
                Ok(coordinate) => {
                    self.resolved[waypoint].get_or_insert(coordinate);
                }
                Err(Failure::NotFound) => {
                    missing.get_or_insert(waypoint);
                }
                Err(Failure::Transient(err)) => {
                    tracing::warn!(waypoint, error = %err, "geocoding unavailable");
                    unavailable = true;
                }
            }
        }

        if let Some(waypoint) = missing {
            let name = self.itinerary[waypoint].name.clone();
            return self.fail(FailureReason::WaypointNotFound {
                index: waypoint,
                name,
            });
        }

        match (unavailable, self.resolved[index], self.resolved[index + 1]) {
            (false, Some(origin), Some(destination)) => self.begin_fetch(index, origin, destination),
            _ => self.fail(FailureReason::RoutingUnavailable),
        }
    }

    fn on_fetched(&mut self, result: Result<Arc<RouteLeg>, Failure>) -> Step {
        match result {
            Ok(leg) => {
                self.status = Status::Ready;
                self.active_leg = Some(leg);
                if let Some(location) = self.last_known_location {
                    let _ = self.update_location(location);
                }
                Step::Moved(None)
            }
            Err(Failure::NotFound) => self.fail(FailureReason::RouteNotFound),
            Err(Failure::Transient(err)) => {
                tracing::warn!(error = %err, "routing unavailable");
                self.fail(FailureReason::RoutingUnavailable)
            }
        }
    }

    fn fail(&mut self, reason: FailureReason) -> Step {
        tracing::info!(segment = ?self.current_segment, %reason, "navigation failed");
        self.status = Status::Failed { reason };
        self.clear_leg();
        Step::Moved(None)
    }

    fn clear_leg(&mut self) {
        self.active_leg = None;
        self.arrived = false;
    }

    fn lookup(&self, index: usize, memo: Option<Coordinate>) -> Lookup {
        match memo {
            Some(coordinate) => Lookup::Known(coordinate),
            None => Lookup::Query(self.itinerary[index].clone()),
        }
    }

    fn next_op(&mut self) -> u64 {
        self.last_op += 1;
        self.pending_op = Some(self.last_op);
        self.last_op
    }
}
