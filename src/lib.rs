pub mod error;
pub mod geometry;
pub mod math;
pub mod partition;
pub mod region;
pub mod transform;

pub use error::{Result, SphereError};
pub use geometry::{AngularInterval, GreatArc, GreatArcPath, GreatCircle, Point2S};
pub use math::Precision;
pub use region::{ConvexArea2S, RegionBSPTree2S};
pub use transform::Transform2S;
