#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use citywalk::config::Settings;
use citywalk::entities::{Coordinate, Waypoint};
use citywalk::error::{upstream_error, Error};
use citywalk::external::{CandidateRoute, DynProvider, PlaceCandidate, Provider, RouteStep};
use citywalk::navigation::{MapProjection, Navigator};

/// Where the scripted provider places the i-th stop of its city.
pub fn spot(i: usize) -> Coordinate {
    Coordinate::new(23.10 + 0.005 * i as f64, 113.25 + 0.004 * i as f64)
}

/// A scripted provider. Places are looked up by exact name; directions
/// default to one straight step unless overridden for a pair.
#[derive(Default)]
pub struct FakeProvider {
    places: Mutex<HashMap<String, Coordinate>>,
    routes: Mutex<HashMap<(String, String), Vec<CandidateRoute>>>,
    search_failures: Mutex<HashMap<String, u32>>,
    direction_failures: AtomicU32,
    searches: Mutex<Vec<(String, Option<String>)>>,
    directions: AtomicUsize,
    gate: Option<Semaphore>,
}

impl FakeProvider {
    /// Stops "A" to "D" at `spot(0)` to `spot(3)`.
    pub fn city() -> Arc<Self> {
        Arc::new(Self::with_stops(Self::default()))
    }

    /// Like [`FakeProvider::city`], but every directions request waits for
    /// a permit from [`FakeProvider::release`].
    pub fn gated_city() -> Arc<Self> {
        Arc::new(Self::with_stops(Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }))
    }

    fn with_stops(self) -> Self {
        for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
            self.place(name, spot(i));
        }
        self
    }

    pub fn place(&self, name: &str, coordinate: Coordinate) {
        self.places.lock().unwrap().insert(name.into(), coordinate);
    }

    pub fn route(&self, origin: Coordinate, destination: Coordinate, candidates: Vec<CandidateRoute>) {
        self.routes
            .lock()
            .unwrap()
            .insert((origin.into(), destination.into()), candidates);
    }

    pub fn fail_searches(&self, name: &str, times: u32) {
        self.search_failures.lock().unwrap().insert(name.into(), times);
    }

    pub fn fail_directions(&self, times: u32) {
        self.direction_failures.store(times, Ordering::SeqCst);
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn searches(&self) -> Vec<(String, Option<String>)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn search_count(&self, name: &str) -> usize {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter(|(keyword, _)| keyword == name)
            .count()
    }

    pub fn direction_requests(&self) -> usize {
        self.directions.load(Ordering::SeqCst)
    }

    pub async fn wait_for_direction_requests(&self, count: usize) {
        for _ in 0..500 {
            if self.direction_requests() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("provider never saw {} directions requests", count);
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn search_place(
        &self,
        keyword: &str,
        city: Option<&str>,
    ) -> Result<Vec<PlaceCandidate>, Error> {
        self.searches
            .lock()
            .unwrap()
            .push((keyword.to_string(), city.map(str::to_string)));

        if let Some(remaining) = self.search_failures.lock().unwrap().get_mut(keyword) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(upstream_error());
            }
        }

        let found = self.places.lock().unwrap().get(keyword).copied();

        Ok(found
            .map(|coordinate| PlaceCandidate {
                name: keyword.to_string(),
                address: String::new(),
                coordinate,
            })
            .into_iter()
            .collect())
    }

    async fn walking_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<CandidateRoute>, Error> {
        self.directions.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(|_| upstream_error())?.forget();
        }

        let failing = self
            .direction_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(upstream_error());
        }

        let key: (String, String) = (origin.into(), destination.into());
        if let Some(candidates) = self.routes.lock().unwrap().get(&key) {
            return Ok(candidates.clone());
        }

        Ok(vec![straight(origin, destination)])
    }
}

pub fn straight(origin: Coordinate, destination: Coordinate) -> CandidateRoute {
    CandidateRoute {
        steps: vec![RouteStep {
            polyline: format!("{};{}", String::from(origin), String::from(destination)),
        }],
        distance_meters: Some(origin.distance_to(&destination)),
        duration_seconds: Some(origin.distance_to(&destination) / 1.3),
    }
}

pub fn settings() -> Settings {
    Settings {
        retry_attempts: 2,
        retry_backoff: Duration::from_millis(1),
        ..Settings::default()
    }
}

pub fn itinerary(names: &[&str]) -> Vec<Waypoint> {
    names.iter().map(|name| Waypoint::named(*name)).collect()
}

pub fn spawn(
    provider: &Arc<FakeProvider>,
    names: &[&str],
) -> (Navigator, async_channel::Receiver<MapProjection>) {
    let (projections, receiver) = async_channel::unbounded();
    let navigator = Navigator::spawn(
        itinerary(names),
        provider.clone() as DynProvider,
        &settings(),
        projections,
    )
    .unwrap();

    (navigator, receiver)
}

pub fn drain(receiver: &async_channel::Receiver<MapProjection>) -> Vec<MapProjection> {
    std::iter::from_fn(|| receiver.try_recv().ok()).collect()
}
