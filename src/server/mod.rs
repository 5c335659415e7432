mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::{
    api::{DynAPI, API},
    error::{unexpected_error, Error},
};
use handlers::sessions;

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/sessions", post(sessions::create))
        .route("/sessions/:id", get(sessions::find).delete(sessions::abandon))
        .route("/sessions/:id/start", patch(sessions::start))
        .route("/sessions/:id/advance", patch(sessions::advance))
        .route("/sessions/:id/retry", patch(sessions::retry))
        .route("/sessions/:id/reset", patch(sessions::reset))
        .route("/sessions/:id/location", patch(sessions::update_location))
        .route("/sessions/:id/map", get(sessions::find_map))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(%err, "server error");
            unexpected_error()
        })
}
