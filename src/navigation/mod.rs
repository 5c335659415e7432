mod cache;
mod fetcher;
mod geocoder;
mod navigator;
pub mod polyline;
mod projection;
mod retry;
mod session;

pub use cache::SegmentCache;
pub use fetcher::RouteFetcher;
pub use geocoder::Geocoder;
pub use navigator::Navigator;
pub use projection::{project, MapProjection};
pub use retry::RetryPolicy;
pub use session::{FailureReason, Job, Lookup, Outcome, Session, Snapshot, Status, Step};

use crate::error::Error;

/// Outcome of a provider-backed lookup that did not produce a value.
#[derive(Debug)]
pub enum Failure {
    /// The provider answered and had nothing for the request.
    NotFound,
    /// Network, timeout, rate-limit, or malformed-response failure.
    Transient(Error),
}
