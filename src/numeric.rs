//! Discrete derivative and peak-finding primitives.
//!
//! `gradient` follows the conventions of `numpy.gradient` for uniformly
//! spaced samples and `find_peaks` those of `scipy.signal.find_peaks`, so
//! curvature seeding produces the same split points as those tools would.
//! Both take an explicit configuration struct listing every option they
//! understand.

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimplifyError};

/// Accuracy of the one-sided differences used at the two boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrder {
    #[default]
    First,
    Second,
}

impl EdgeOrder {
    /// Fewest samples the boundary stencil needs.
    pub fn min_samples(&self) -> usize {
        match self {
            EdgeOrder::First => 2,
            EdgeOrder::Second => 3,
        }
    }
}

/// Options for [`gradient`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Distance between consecutive samples. Must be positive.
    pub spacing: f64,
    /// Boundary difference order.
    pub edge_order: EdgeOrder,
}

impl Default for GradientConfig {
    fn default() -> Self {
        GradientConfig { spacing: 1.0, edge_order: EdgeOrder::First }
    }
}

/// First derivative of uniformly spaced samples.
///
/// Central differences in the interior, one-sided differences of
/// `edge_order` at both ends. Output has the same length as the input.
pub fn gradient(values: &[f64], config: &GradientConfig) -> Result<Vec<f64>> {
    let h = config.spacing;
    if !(h.is_finite() && h > 0.0) {
        return Err(Report::new(SimplifyError::InvalidParameter)
            .attach_printable(format!("gradient spacing must be positive, got {}", h)));
    }
    let n = values.len();
    if n < config.edge_order.min_samples() {
        return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
            "gradient with {:?} edge order needs {} samples, got {}",
            config.edge_order,
            config.edge_order.min_samples(),
            n
        )));
    }

    let mut out = vec![0.0; n];
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / (2.0 * h);
    }

    match config.edge_order {
        EdgeOrder::First => {
            out[0] = (values[1] - values[0]) / h;
            out[n - 1] = (values[n - 1] - values[n - 2]) / h;
        }
        EdgeOrder::Second => {
            let (a, b, c) = (-1.5 / h, 2.0 / h, -0.5 / h);
            out[0] = a * values[0] + b * values[1] + c * values[2];
            let (a, b, c) = (0.5 / h, -2.0 / h, 1.5 / h);
            out[n - 1] = a * values[n - 3] + b * values[n - 2] + c * values[n - 1];
        }
    }
    Ok(out)
}

/// Inclusive `[min, max]` range; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bound {
    pub const fn at_least(min: f64) -> Self {
        Bound { min: Some(min), max: None }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }
}

/// Options for [`find_peaks`]. Every filter is off by default.
///
/// Filters are applied in field order: plateau size, height, threshold,
/// distance, then prominence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Number of samples in the peak's flat top.
    pub plateau_size: Option<Bound>,
    /// Signal value at the peak.
    pub height: Option<Bound>,
    /// Vertical drop from the peak to each of its direct neighbours.
    pub threshold: Option<Bound>,
    /// Minimum index spacing between peaks (>= 1). Higher peaks win.
    pub distance: Option<f64>,
    /// Height of the peak above the higher of its two surrounding bases.
    pub prominence: Option<Bound>,
    /// Width in samples of the window used to search for prominence
    /// bases (>= 2). Unlimited when `None`.
    pub wlen: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    index: usize,
    left_edge: usize,
    right_edge: usize,
}

/// Indices of the local maxima of `signal` that pass every filter in
/// `config`, in ascending order.
///
/// The first and last samples are never peaks. A flat top reports its
/// middle sample (rounded down).
pub fn find_peaks(signal: &[f64], config: &PeakConfig) -> Result<Vec<usize>> {
    if let Some(distance) = config.distance {
        if !(distance >= 1.0) {
            return Err(Report::new(SimplifyError::InvalidParameter)
                .attach_printable(format!("peak distance must be >= 1, got {}", distance)));
        }
    }
    if let Some(wlen) = config.wlen {
        if wlen < 2 {
            return Err(Report::new(SimplifyError::InvalidParameter)
                .attach_printable(format!("prominence wlen must be >= 2, got {}", wlen)));
        }
    }

    let mut peaks = local_maxima(signal);

    if let Some(bound) = config.plateau_size {
        peaks.retain(|p| bound.contains((p.right_edge - p.left_edge + 1) as f64));
    }
    if let Some(bound) = config.height {
        peaks.retain(|p| bound.contains(signal[p.index]));
    }
    if let Some(bound) = config.threshold {
        peaks.retain(|p| {
            let left = signal[p.index] - signal[p.index - 1];
            let right = signal[p.index] - signal[p.index + 1];
            bound.min.map_or(true, |m| left.min(right) >= m)
                && bound.max.map_or(true, |m| left.max(right) <= m)
        });
    }
    if let Some(distance) = config.distance {
        peaks = select_by_distance(signal, peaks, distance.ceil() as usize);
    }
    if let Some(bound) = config.prominence {
        peaks.retain(|p| bound.contains(prominence(signal, p.index, config.wlen)));
    }

    Ok(peaks.into_iter().map(|p| p.index).collect())
}

fn local_maxima(x: &[f64]) -> Vec<Peak> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                peaks.push(Peak { index: (left_edge + right_edge) / 2, left_edge, right_edge });
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn select_by_distance(x: &[f64], peaks: Vec<Peak>, distance: usize) -> Vec<Peak> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    let mut by_height: Vec<usize> = (0..n).collect();
    by_height.sort_by(|&a, &b| x[peaks[a].index].total_cmp(&x[peaks[b].index]));

    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        let here = peaks[j].index;
        for k in (0..j).rev() {
            if here - peaks[k].index >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in (j + 1)..n {
            if peaks[k].index - here >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks.into_iter().zip(keep).filter_map(|(p, k)| k.then_some(p)).collect()
}

/// Prominence of the peak at `peak`, searching at most `wlen / 2` samples
/// to either side.
fn prominence(x: &[f64], peak: usize, wlen: Option<usize>) -> f64 {
    let (lo, hi) = match wlen {
        Some(w) => (peak.saturating_sub(w / 2), (peak + w / 2).min(x.len() - 1)),
        None => (0, x.len() - 1),
    };
    let top = x[peak];

    let mut left_min = top;
    let mut i = peak;
    loop {
        if x[i] > top {
            break;
        }
        left_min = left_min.min(x[i]);
        if i == lo {
            break;
        }
        i -= 1;
    }

    let mut right_min = top;
    for &v in &x[peak..=hi] {
        if v > top {
            break;
        }
        right_min = right_min.min(v);
    }

    top - left_min.max(right_min)
}
