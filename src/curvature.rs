//! Curvature-adaptive seeding.
//!
//! High-curvature samples are natural places to start splitting, so the
//! curvature signal's peaks become the initial window boundaries. Only the
//! first two coordinate columns take part; the RDP pass that follows still
//! uses every dimension.

use error_stack::Report;
use log::debug;

use crate::error::{Result, SimplifyError};
use crate::numeric::{find_peaks, gradient, GradientConfig, PeakConfig};
use crate::points::Points;
use crate::window::{single_window, windows_from_splits, Window};

/// Planar curvature `|x'y'' - y'x''| / (x'^2 + y'^2)^1.5` at every sample.
///
/// Samples where the first derivative vanishes (repeated points) get zero
/// curvature instead of NaN.
pub fn curvature(x: &[f64], y: &[f64], config: &GradientConfig) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
            "x has {} samples but y has {}",
            x.len(),
            y.len()
        )));
    }

    let dx = gradient(x, config)?;
    let dy = gradient(y, config)?;
    let ddx = gradient(&dx, config)?;
    let ddy = gradient(&dy, config)?;

    let kappa = (0..x.len())
        .map(|i| {
            let speed_sq = dx[i] * dx[i] + dy[i] * dy[i];
            if speed_sq == 0.0 {
                0.0
            } else {
                (ddx[i] * dy[i] - dx[i] * ddy[i]).abs() / speed_sq.powf(1.5)
            }
        })
        .collect();
    Ok(kappa)
}

/// `[0, peaks.., n-1]` for a curvature signal of length `n`.
pub fn split_indices(curvature: &[f64], config: &PeakConfig) -> Result<Vec<usize>> {
    let n = curvature.len();
    if n == 0 {
        return Err(Report::new(SimplifyError::InvalidInput)
            .attach_printable("curvature signal is empty"));
    }
    let peaks = find_peaks(curvature, config)?;

    let mut splits = Vec::with_capacity(peaks.len() + 2);
    splits.push(0);
    splits.extend(peaks);
    splits.push(n - 1);
    Ok(splits)
}

/// Seed windows at the curvature peaks of the `x`/`y` columns of `points`.
///
/// Sequences too short for the gradient stencil get a single window.
pub fn windows_from_curvature(
    points: &Points,
    gradient_config: &GradientConfig,
    peak_config: &PeakConfig,
) -> Result<Vec<Window>> {
    let n = points.len();
    if n < gradient_config.edge_order.min_samples() {
        debug!("{} points is too few for curvature seeding, using one window", n);
        return Ok(single_window(n));
    }

    let kappa = curvature(&points.column(0), &points.column(1), gradient_config)?;
    let splits = split_indices(&kappa, peak_config)?;
    debug!("curvature seeding found {} peaks over {} points", splits.len() - 2, n);
    Ok(windows_from_splits(&splits))
}
