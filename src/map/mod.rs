//! The write path from navigation state to a map widget.

mod headless;

pub use headless::{Frame, HeadlessMap, Marker};

use serde::{Deserialize, Serialize};

use crate::{entities::Coordinate, navigation::MapProjection};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Start,
    End,
}

/// The overlay operations a map widget exposes.
pub trait OverlayCanvas {
    fn clear_overlays(&mut self);
    fn add_polyline(&mut self, path: &[Coordinate]);
    fn add_marker(&mut self, kind: MarkerKind, at: Coordinate);
    fn set_camera(&mut self, target: Coordinate);
}

/// Replaces everything on `canvas` with `projection`. Overlays from the
/// previous projection are always removed first, even when the new one is
/// identical. A cleared projection leaves the camera where it is.
pub fn render<C: OverlayCanvas + ?Sized>(canvas: &mut C, projection: &MapProjection) {
    canvas.clear_overlays();

    if !projection.polyline.is_empty() {
        canvas.add_polyline(&projection.polyline);
    }
    if let Some(at) = projection.start_marker {
        canvas.add_marker(MarkerKind::Start, at);
    }
    if let Some(at) = projection.end_marker {
        canvas.add_marker(MarkerKind::End, at);
    }
    if let Some(target) = projection.camera_target {
        canvas.set_camera(target);
    }
}

/// Renders projections in the order they were published until the session
/// closes the channel, then hands the canvas back.
pub async fn run_adapter<C: OverlayCanvas>(
    projections: async_channel::Receiver<MapProjection>,
    mut canvas: C,
) -> C {
    while let Ok(projection) = projections.recv().await {
        render(&mut canvas, &projection);
    }

    canvas
}
