use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    entities::{Coordinate, Waypoint},
    error::Error,
    map::Frame,
    navigation::{MapProjection, Snapshot},
};

#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub projection: MapProjection,
}

impl SessionView {
    pub fn new(id: Uuid, created_at: DateTime<Utc>, snapshot: Snapshot) -> Self {
        Self {
            id,
            created_at,
            projection: snapshot.projection(),
            snapshot,
        }
    }
}

#[async_trait]
pub trait SessionAPI {
    async fn create_session(&self, itinerary: Vec<Waypoint>) -> Result<SessionView, Error>;
    async fn find_session(&self, id: Uuid) -> Result<SessionView, Error>;
    async fn start_session(&self, id: Uuid) -> Result<SessionView, Error>;
    async fn advance_session(&self, id: Uuid) -> Result<SessionView, Error>;
    async fn retry_session(&self, id: Uuid) -> Result<SessionView, Error>;
    async fn reset_session(&self, id: Uuid) -> Result<SessionView, Error>;
    async fn update_location(&self, id: Uuid, location: Coordinate) -> Result<SessionView, Error>;
    async fn find_map(&self, id: Uuid) -> Result<Frame, Error>;
    async fn abandon_session(&self, id: Uuid) -> Result<(), Error>;
}

pub trait API: SessionAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
