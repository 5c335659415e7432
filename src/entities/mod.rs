mod coordinate;
mod route_leg;
mod waypoint;

pub use coordinate::Coordinate;
pub use route_leg::RouteLeg;
pub use waypoint::Waypoint;
