use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Coordinate, RouteLeg};

/// Bitwise key so that lookups use exact coordinate equality. Signed zeros
/// compare equal, so both map to the same bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct LegKey([u64; 4]);

impl LegKey {
    fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self([
            bits(origin.latitude),
            bits(origin.longitude),
            bits(destination.latitude),
            bits(destination.longitude),
        ])
    }
}

fn bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Legs fetched during one navigation session. Entries are never replaced
/// or evicted; the itinerary length bounds the size.
#[derive(Debug, Default)]
pub struct SegmentCache {
    legs: HashMap<LegKey, Arc<RouteLeg>>,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, origin: Coordinate, destination: Coordinate) -> Option<Arc<RouteLeg>> {
        self.legs.get(&LegKey::new(origin, destination)).cloned()
    }

    /// Stores `leg` unless the pair is already cached, and returns the entry
    /// that is cached afterwards.
    pub fn put(&mut self, origin: Coordinate, destination: Coordinate, leg: RouteLeg) -> Arc<RouteLeg> {
        self.legs
            .entry(LegKey::new(origin, destination))
            .or_insert_with(|| Arc::new(leg))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(origin: Coordinate, destination: Coordinate, points: usize) -> RouteLeg {
        RouteLeg {
            origin,
            destination,
            path: vec![origin; points],
            distance_meters: None,
            duration_seconds: None,
        }
    }

    #[test]
    fn lookup_is_directional() {
        let a = Coordinate::new(23.12, 113.25);
        let b = Coordinate::new(23.13, 113.26);
        let mut cache = SegmentCache::new();

        cache.put(a, b, leg(a, b, 2));

        assert!(cache.get(a, b).is_some());
        assert!(cache.get(b, a).is_none());
    }

    #[test]
    fn first_entry_wins() {
        let a = Coordinate::new(23.12, 113.25);
        let b = Coordinate::new(23.13, 113.26);
        let mut cache = SegmentCache::new();

        let first = cache.put(a, b, leg(a, b, 2));
        let second = cache.put(a, b, leg(a, b, 5));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get(a, b).unwrap().path.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn nearby_coordinates_do_not_collide() {
        let a = Coordinate::new(23.12, 113.25);
        let b = Coordinate::new(23.13, 113.26);
        let b_prime = Coordinate::new(23.13, 113.260_000_000_1);
        let mut cache = SegmentCache::new();

        cache.put(a, b, leg(a, b, 1));

        assert!(cache.get(a, b_prime).is_none());
    }

    #[test]
    fn signed_zeros_share_an_entry() {
        let origin = Coordinate::new(0.0, 0.0);
        let negated = Coordinate::new(-0.0, -0.0);
        let b = Coordinate::new(0.01, 0.01);
        let mut cache = SegmentCache::new();

        cache.put(origin, b, leg(origin, b, 2));

        assert_eq!(origin, negated);
        assert!(cache.get(negated, b).is_some());
    }
}
