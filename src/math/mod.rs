pub mod angle;
pub mod precision;
pub mod vector;

pub use precision::Precision;

/// 3D vector type, used as the Euclidean embedding of sphere points.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type, used for orthogonal transforms of the sphere.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
