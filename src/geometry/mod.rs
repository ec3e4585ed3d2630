//! Points, great circles, arcs and arc paths on the unit sphere.

mod arc;
pub mod connector;
mod great_circle;
mod interval;
mod path;
mod point;

pub use arc::GreatArc;
pub use connector::connect_minimized;
pub use great_circle::GreatCircle;
pub use interval::AngularInterval;
pub use path::{GreatArcPath, GreatArcPathBuilder};
pub use point::Point2S;
