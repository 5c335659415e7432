use super::{Engine, Entry};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{SessionAPI, SessionView},
    entities::{Coordinate, Waypoint},
    error::{not_found_error, Error},
    map::{self, Frame, HeadlessMap},
    navigation::{Navigator, Status},
};

#[async_trait]
impl SessionAPI for Engine {
    #[tracing::instrument(skip(self, itinerary), fields(waypoints = itinerary.len()))]
    async fn create_session(&self, itinerary: Vec<Waypoint>) -> Result<SessionView, Error> {
        let (projections, receiver) = async_channel::unbounded();
        let navigator = Navigator::spawn(itinerary, self.provider.clone(), &self.settings, projections)?;

        let map = HeadlessMap::default();
        tokio::spawn(map::run_adapter(receiver, map.clone()));

        let id = Uuid::new_v4();
        let entry = Entry {
            navigator,
            map,
            created_at: Utc::now(),
        };
        let view = SessionView::new(id, entry.created_at, entry.navigator.snapshot());

        self.sessions.write().await.insert(id, entry);
        tracing::info!(%id, "session created");

        Ok(view)
    }

    #[tracing::instrument(skip(self))]
    async fn find_session(&self, id: Uuid) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;

        Ok(SessionView::new(id, entry.created_at, entry.navigator.snapshot()))
    }

    #[tracing::instrument(skip(self))]
    async fn start_session(&self, id: Uuid) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;
        let snapshot = entry.navigator.start().await?;

        Ok(SessionView::new(id, entry.created_at, snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn advance_session(&self, id: Uuid) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;
        let snapshot = entry.navigator.advance().await?;

        // A finished itinerary ends the session.
        if snapshot.status == Status::Completed {
            self.discard(id).await;
            tracing::info!(%id, "session completed");
        }

        Ok(SessionView::new(id, entry.created_at, snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn retry_session(&self, id: Uuid) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;
        let snapshot = entry.navigator.retry().await?;

        Ok(SessionView::new(id, entry.created_at, snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn reset_session(&self, id: Uuid) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;
        let snapshot = entry.navigator.reset().await?;

        Ok(SessionView::new(id, entry.created_at, snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn update_location(&self, id: Uuid, location: Coordinate) -> Result<SessionView, Error> {
        let entry = self.entry(id).await?;
        let snapshot = entry.navigator.update_location(location).await?;

        Ok(SessionView::new(id, entry.created_at, snapshot))
    }

    #[tracing::instrument(skip(self))]
    async fn find_map(&self, id: Uuid) -> Result<Frame, Error> {
        let entry = self.entry(id).await?;

        Ok(entry.map.frame())
    }

    #[tracing::instrument(skip(self))]
    async fn abandon_session(&self, id: Uuid) -> Result<(), Error> {
        self.discard(id).await.ok_or_else(not_found_error)?;
        tracing::info!(%id, "session abandoned");

        Ok(())
    }
}
