use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{MarkerKind, OverlayCanvas};
use crate::entities::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub coordinate: Coordinate,
}

/// What a headless map currently shows. `revision` counts renders.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    pub revision: u64,
    pub polylines: Vec<Vec<Coordinate>>,
    pub markers: Vec<Marker>,
    pub camera: Option<Coordinate>,
}

/// In-memory canvas for sessions driven without a map widget. Clones
/// observe the same frame.
#[derive(Clone, Debug, Default)]
pub struct HeadlessMap {
    frame: Arc<Mutex<Frame>>,
}

impl HeadlessMap {
    pub fn frame(&self) -> Frame {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Frame> {
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl OverlayCanvas for HeadlessMap {
    fn clear_overlays(&mut self) {
        let mut frame = self.lock();
        frame.revision += 1;
        frame.polylines.clear();
        frame.markers.clear();
    }

    fn add_polyline(&mut self, path: &[Coordinate]) {
        self.lock().polylines.push(path.to_vec());
    }

    fn add_marker(&mut self, kind: MarkerKind, at: Coordinate) {
        self.lock().markers.push(Marker {
            kind,
            coordinate: at,
        });
    }

    fn set_camera(&mut self, target: Coordinate) {
        self.lock().camera = Some(target);
    }
}
