//! Run-time selection of the window seeding strategy.

use serde::{Deserialize, Serialize};

use crate::curvature::windows_from_curvature;
use crate::error::Result;
use crate::numeric::{GradientConfig, PeakConfig};
use crate::points::Points;
use crate::window::{single_window, windows_by_count, windows_by_points, Window};

/// How the initial worklist is laid out before the RDP pass.
///
/// Serialised with an internal `"kind"` tag, e.g.
/// `{"kind": "window_count", "num_windows": 8}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// One window over the whole sequence (classic RDP).
    #[default]
    Single,
    /// A fixed number of roughly equal windows.
    WindowCount { num_windows: usize },
    /// Windows of a fixed number of steps.
    PointsPerWindow { points_per_window: usize },
    /// Windows split at curvature peaks.
    Curvature {
        #[serde(default)]
        gradient: GradientConfig,
        #[serde(default)]
        peaks: PeakConfig,
    },
}

impl Strategy {
    /// Initial windows for `points`.
    pub fn seed(&self, points: &Points) -> Result<Vec<Window>> {
        let n = points.len();
        match self {
            Strategy::Single => Ok(single_window(n)),
            Strategy::WindowCount { num_windows } => windows_by_count(n, *num_windows),
            Strategy::PointsPerWindow { points_per_window } => windows_by_points(n, *points_per_window),
            Strategy::Curvature { gradient, peaks } => windows_from_curvature(points, gradient, peaks),
        }
    }

    /// Seed with this strategy and simplify.
    pub fn simplify(&self, points: &Points, epsilon: f64) -> Result<Points> {
        let windows = self.seed(points)?;
        crate::simplify_from_windows(points, epsilon, &windows)
    }
}
