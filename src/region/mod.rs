//! Regions of the sphere: convex areas bounded by great circles and
//! general regions stored as BSP trees.

mod convex;
mod tree;

pub use convex::{ConvexArea2S, FULL_SIZE, HALF_SIZE};
pub use tree::RegionBSPTree2S;
