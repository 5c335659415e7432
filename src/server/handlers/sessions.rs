use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{DynAPI, SessionView};
use crate::entities::{Coordinate, Waypoint};
use crate::error::Error;
use crate::map::Frame;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    itinerary: Vec<Waypoint>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<Json<SessionView>, Error> {
    let session = api.create_session(params.itinerary).await?;

    Ok(session.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, Error> {
    let session = api.find_session(id).await?;

    Ok(session.into())
}

pub async fn start(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, Error> {
    let session = api.start_session(id).await?;

    Ok(session.into())
}

pub async fn advance(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, Error> {
    let session = api.advance_session(id).await?;

    Ok(session.into())
}

pub async fn retry(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, Error> {
    let session = api.retry_session(id).await?;

    Ok(session.into())
}

pub async fn reset(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, Error> {
    let session = api.reset_session(id).await?;

    Ok(session.into())
}

pub async fn update_location(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(location): Json<Coordinate>,
) -> Result<Json<SessionView>, Error> {
    let session = api.update_location(id, location).await?;

    Ok(session.into())
}

pub async fn find_map(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Frame>, Error> {
    let frame = api.find_map(id).await?;

    Ok(frame.into())
}

pub async fn abandon(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    api.abandon_session(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
