//! Windowed Ramer-Douglas-Peucker simplification.
//!
//! Points are scored against the line through each window's endpoints; a
//! window whose farthest interior point exceeds `epsilon` is split there,
//! and the process repeats level by level until every window is flat. The
//! initial windows come from one of several seeding strategies (one window,
//! a fixed count, a fixed width, or curvature peaks).
//!
//! Windows within a level, and points within a window, are evaluated in
//! parallel on the rayon pool.

pub mod curvature;
pub mod distance;
pub mod douglas_peucker;
pub mod error;
pub mod numeric;
pub mod points;
pub mod strategy;
pub mod utils;
pub mod window;

use error_stack::Report;

pub use douglas_peucker::{RetentionMask, RunStats};
pub use error::{Result, SimplifyError};
pub use numeric::{Bound, EdgeOrder, GradientConfig, PeakConfig};
pub use points::Points;
pub use strategy::Strategy;
pub use window::{Verdict, Window};

pub(crate) fn validate_epsilon(epsilon: f64) -> Result<()> {
    if epsilon.is_nan() || epsilon < 0.0 {
        return Err(Report::new(SimplifyError::InvalidParameter)
            .attach_printable(format!("epsilon must be non-negative, got {}", epsilon)));
    }
    Ok(())
}

/// Retention mask and run statistics for custom seed windows.
pub fn retention_mask(points: &Points, epsilon: f64, windows: &[Window]) -> Result<(RetentionMask, RunStats)> {
    validate_epsilon(epsilon)?;
    douglas_peucker::run(points, epsilon, windows.to_vec())
}

/// Simplify starting from caller-provided windows.
///
/// Every window boundary is kept in the output.
pub fn simplify_from_windows(points: &Points, epsilon: f64, windows: &[Window]) -> Result<Points> {
    let (mask, _) = retention_mask(points, epsilon, windows)?;
    points.select(mask.as_slice())
}

/// Classic RDP: one window over every point.
pub fn simplify_single_window(points: &Points, epsilon: f64) -> Result<Points> {
    Strategy::Single.simplify(points, epsilon)
}

/// Start from `num_windows` roughly equal windows.
pub fn simplify_with_window_count(points: &Points, epsilon: f64, num_windows: usize) -> Result<Points> {
    Strategy::WindowCount { num_windows }.simplify(points, epsilon)
}

/// Start from windows spanning `points_per_window` steps each.
pub fn simplify_with_points_per_window(
    points: &Points,
    epsilon: f64,
    points_per_window: usize,
) -> Result<Points> {
    Strategy::PointsPerWindow { points_per_window }.simplify(points, epsilon)
}

/// Start from windows split at the curvature peaks of the first two
/// coordinate columns.
pub fn simplify_with_curvature_windows(
    points: &Points,
    epsilon: f64,
    gradient: Option<&GradientConfig>,
    peaks: Option<&PeakConfig>,
) -> Result<Points> {
    Strategy::Curvature {
        gradient: gradient.copied().unwrap_or_default(),
        peaks: peaks.copied().unwrap_or_default(),
    }
    .simplify(points, epsilon)
}
