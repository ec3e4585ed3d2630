//! Angle normalization helpers.

use std::f64::consts::{PI, TAU};

/// Normalizes an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_0_2pi(angle: f64) -> f64 {
    let normalized = angle - TAU * (angle / TAU).floor();
    // floor() can leave a result of exactly 2π for inputs just below a multiple
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

/// Normalizes an angle into `[center - π, center + π)`.
#[must_use]
pub fn normalize_around(angle: f64, center: f64) -> f64 {
    angle - TAU * ((angle + PI - center) / TAU).floor()
}

/// Normalizes an angle into `[-π, π)`.
#[must_use]
pub fn normalize_signed(angle: f64) -> f64 {
    normalize_around(angle, 0.0)
}

/// Returns the equivalent of `angle` in `[base, base + 2π)`.
#[must_use]
pub fn above(angle: f64, base: f64) -> f64 {
    let shifted = base + normalize_0_2pi(angle - base);
    if shifted < base {
        base
    } else {
        shifted
    }
}
