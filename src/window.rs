//! Windows over the point sequence: flatness test and initial seeding.
//!
//! A window is a closed index range `[start, end]`. Seeded windows tile the
//! whole sequence, touching at shared boundary indices, and those boundaries
//! always survive simplification because only interior points are tested.

use error_stack::Report;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::distance::distances;
use crate::error::{Result, SimplifyError};
use crate::points::Points;
use crate::utils::{argmax, round_ratio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub const fn new(start: usize, end: usize) -> Self {
        Window { start, end }
    }

    /// Number of points in the window, endpoints included.
    pub const fn num_points(&self) -> usize {
        self.end - self.start + 1
    }

    /// Split at a window-relative offset into left and right children.
    pub const fn split(&self, offset: usize) -> (Window, Window) {
        let mid = self.start + offset;
        (Window::new(self.start, mid), Window::new(mid, self.end))
    }
}

impl From<(usize, usize)> for Window {
    fn from((start, end): (usize, usize)) -> Self {
        Window::new(start, end)
    }
}

/// Outcome of testing one window against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every interior point lies within tolerance.
    Flat,
    /// The window must be split at this window-relative offset.
    Split(usize),
}

impl Verdict {
    /// `(is_flat, split_offset)`, with offset 0 when flat.
    pub fn as_pair(&self) -> (bool, usize) {
        match *self {
            Verdict::Flat => (true, 0),
            Verdict::Split(offset) => (false, offset),
        }
    }
}

/// Test a flat row-major run of points for flatness.
///
/// The reference line joins the first and last point; the interior point
/// farthest from it decides. Ties go to the earliest point.
pub fn evaluate(span: &[f64], dim: usize, epsilon: f64) -> Result<Verdict> {
    let n = span.len() / dim;
    if n <= 2 {
        return Ok(Verdict::Flat);
    }

    let first = &span[..dim];
    let last = &span[(n - 1) * dim..];
    let interior = &span[dim..(n - 1) * dim];
    let dists = distances(first, last, interior)?;

    match argmax(&dists) {
        Some((index, value)) if value > epsilon => Ok(Verdict::Split(index + 1)),
        _ => Ok(Verdict::Flat),
    }
}

/// Test one window of `points`.
pub fn evaluate_window(points: &Points, window: Window, epsilon: f64) -> Result<Verdict> {
    if window.num_points() <= 2 {
        return Ok(Verdict::Flat);
    }
    evaluate(points.span(window.start, window.end), points.dim(), epsilon)
}

/// `[(0, n-1)]`.
pub fn single_window(num_points: usize) -> Vec<Window> {
    vec![Window::new(0, num_points.saturating_sub(1))]
}

/// Lay out `num_windows` windows of `width` steps over `num_points` points.
///
/// The last window always ends at `num_points - 1`. Windows that would start
/// at or past the final index are dropped, so the result tiles the range
/// exactly even when `width * num_windows` overshoots it.
pub fn build_windows(num_points: usize, num_windows: usize, width: usize) -> Vec<Window> {
    let last = num_points.saturating_sub(1);
    if last == 0 || num_windows <= 1 {
        return single_window(num_points);
    }
    let width = width.max(1);

    let mut windows = Vec::with_capacity(num_windows);
    for i in 0..num_windows {
        let start = i * width;
        if start >= last {
            break;
        }
        let end = if i == num_windows - 1 { last } else { (start + width).min(last) };
        windows.push(Window::new(start, end));
    }
    if let Some(tail) = windows.last_mut() {
        tail.end = last;
    }
    windows
}

/// Split the sequence into `num_windows` windows of roughly equal width.
pub fn windows_by_count(num_points: usize, num_windows: usize) -> Result<Vec<Window>> {
    if num_windows == 0 {
        return Err(Report::new(SimplifyError::InvalidParameter)
            .attach_printable("num_windows must be at least 1"));
    }
    if num_windows == 1 {
        return Ok(single_window(num_points));
    }
    let width = round_ratio(num_points, num_windows);
    let windows = build_windows(num_points, num_windows, width);
    debug!("seeded {} windows of width {} over {} points", windows.len(), width, num_points);
    Ok(windows)
}

/// Split the sequence into windows of `points_per_window` steps.
pub fn windows_by_points(num_points: usize, points_per_window: usize) -> Result<Vec<Window>> {
    if points_per_window == 0 {
        return Err(Report::new(SimplifyError::InvalidParameter)
            .attach_printable("points_per_window must be at least 1"));
    }
    if points_per_window >= num_points.saturating_sub(1) {
        return Ok(single_window(num_points));
    }
    let num_windows = round_ratio(num_points, points_per_window);
    let windows = build_windows(num_points, num_windows, points_per_window);
    debug!(
        "seeded {} windows of width {} over {} points",
        windows.len(),
        points_per_window,
        num_points
    );
    Ok(windows)
}

/// Windows between consecutive split indices, e.g. `[0, 25, 75, 99]`.
pub fn windows_from_splits(splits: &[usize]) -> Vec<Window> {
    splits.windows(2).map(|pair| Window::new(pair[0], pair[1])).collect()
}

/// Check that custom seed windows tile `[0, num_points - 1]`.
///
/// The chain must start at 0, end at the last index, and each window must end
/// where the next one starts.
pub fn validate_windows(windows: &[Window], num_points: usize) -> Result<()> {
    let last = num_points.saturating_sub(1);
    let (first, tail) = match (windows.first(), windows.last()) {
        (Some(first), Some(tail)) => (first, tail),
        _ => {
            return Err(Report::new(SimplifyError::InvalidParameter)
                .attach_printable("at least one seed window is required"))
        }
    };

    for (i, w) in windows.iter().enumerate() {
        let degenerate = w.start == w.end && num_points > 1;
        if w.start > w.end || w.end >= num_points || degenerate {
            return Err(Report::new(SimplifyError::InvalidParameter).attach_printable(format!(
                "window {} ({}, {}) is not a valid range over {} points",
                i, w.start, w.end, num_points
            )));
        }
    }
    if first.start != 0 || tail.end != last {
        return Err(Report::new(SimplifyError::InvalidParameter).attach_printable(format!(
            "seed windows span ({}, {}) but must span (0, {})",
            first.start, tail.end, last
        )));
    }
    for (i, pair) in windows.windows(2).enumerate() {
        if pair[0].end != pair[1].start {
            return Err(Report::new(SimplifyError::InvalidParameter).attach_printable(format!(
                "window {} ends at {} but window {} starts at {}",
                i,
                pair[0].end,
                i + 1,
                pair[1].start
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(rows: &[[f64; 2]]) -> Points {
        Points::from_rows(rows).unwrap()
    }

    fn pairs(windows: &[Window]) -> Vec<(usize, usize)> {
        windows.iter().map(|w| (w.start, w.end)).collect()
    }

    fn assert_tiles(windows: &[Window], num_points: usize) {
        assert_eq!(windows.first().unwrap().start, 0);
        assert_eq!(windows.last().unwrap().end, num_points - 1);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for w in windows {
            assert!(w.start < w.end, "{:?}", w);
        }
    }

    #[test]
    fn all_good() {
        let p = pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        let v = evaluate_window(&p, Window::new(0, 2), 1.0).unwrap();
        assert_eq!(v.as_pair(), (true, 0));
    }

    #[test]
    fn one_bad() {
        let p = pts(&[[0.0, 0.0], [1.0, 10.0], [2.0, 0.0]]);
        let v = evaluate_window(&p, Window::new(0, 2), 1.0).unwrap();
        assert_eq!(v.as_pair(), (false, 1));
    }

    #[test]
    fn two_bad_picks_the_farthest() {
        let p = pts(&[[0.0, 0.0], [1.0, 10.0], [1.0, 20.0], [2.0, 0.0]]);
        let v = evaluate_window(&p, Window::new(0, 3), 1.0).unwrap();
        assert_eq!(v, Verdict::Split(2));
    }

    #[test]
    fn tie_goes_to_first() {
        let p = pts(&[[0.0, 0.0], [1.0, 5.0], [2.0, 5.0], [3.0, 0.0]]);
        let v = evaluate_window(&p, Window::new(0, 3), 1.0).unwrap();
        assert_eq!(v, Verdict::Split(1));
    }

    #[test]
    fn exactly_epsilon_is_flat() {
        let p = pts(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
        assert_eq!(evaluate_window(&p, Window::new(0, 2), 1.0).unwrap(), Verdict::Flat);
    }

    #[test]
    fn short_windows_are_flat() {
        let p = pts(&[[0.0, 0.0], [1.0, 50.0]]);
        assert_eq!(evaluate_window(&p, Window::new(0, 1), 0.0).unwrap(), Verdict::Flat);
        assert_eq!(evaluate_window(&p, Window::new(1, 1), 0.0).unwrap(), Verdict::Flat);
    }

    #[test]
    fn closed_window_uses_point_distance() {
        // first and last coincide, so the farthest point from them splits
        let p = pts(&[[0.0, 0.0], [1.0, 0.0], [3.0, 0.0], [0.0, 0.0]]);
        assert_eq!(evaluate_window(&p, Window::new(0, 3), 1.0).unwrap(), Verdict::Split(2));
    }

    #[test]
    fn split_children_share_boundary() {
        let (l, r) = Window::new(4, 10).split(3);
        assert_eq!((l, r), (Window::new(4, 7), Window::new(7, 10)));
    }

    #[test]
    fn build_windows_absorbs_remainder() {
        assert_eq!(pairs(&build_windows(30, 3, 10)), vec![(0, 10), (10, 20), (20, 29)]);
        assert_eq!(pairs(&build_windows(31, 3, 10)), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn build_windows_never_overshoots() {
        // round(10 / 6) = 2, so a sixth window would start at 10
        let w = windows_by_count(10, 6).unwrap();
        assert_eq!(pairs(&w), vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 9)]);
        assert_tiles(&w, 10);

        // round(10 / 20) = 0 is widened to 1
        let w = windows_by_count(10, 20).unwrap();
        assert_eq!(w.len(), 9);
        assert_tiles(&w, 10);
    }

    #[test]
    fn count_strategy() {
        assert_eq!(pairs(&windows_by_count(30, 3).unwrap()), vec![(0, 10), (10, 20), (20, 29)]);
        assert_eq!(pairs(&windows_by_count(30, 1).unwrap()), vec![(0, 29)]);
        assert_eq!(*windows_by_count(30, 0).unwrap_err().current_context(), SimplifyError::InvalidParameter);
    }

    #[test]
    fn points_strategy() {
        assert_eq!(pairs(&windows_by_points(30, 10).unwrap()), vec![(0, 10), (10, 20), (20, 29)]);
        assert_eq!(pairs(&windows_by_points(30, 29).unwrap()), vec![(0, 29)]);
        assert_eq!(pairs(&windows_by_points(30, 100).unwrap()), vec![(0, 29)]);
        assert_eq!(*windows_by_points(30, 0).unwrap_err().current_context(), SimplifyError::InvalidParameter);
        assert_tiles(&windows_by_points(101, 7).unwrap(), 101);
    }

    #[test]
    fn single_point_sequence() {
        assert_eq!(pairs(&single_window(1)), vec![(0, 0)]);
        assert_eq!(pairs(&windows_by_count(1, 4).unwrap()), vec![(0, 0)]);
        assert!(validate_windows(&single_window(1), 1).is_ok());
    }

    #[test]
    fn splits_to_windows() {
        assert_eq!(pairs(&windows_from_splits(&[0, 25, 75, 99])), vec![(0, 25), (25, 75), (75, 99)]);
    }

    #[test]
    fn validation_rejects_bad_ranges() {
        assert!(validate_windows(&[Window::new(0, 4)], 5).is_ok());
        assert!(validate_windows(&[Window::new(0, 5)], 5).is_err());
        assert!(validate_windows(&[Window::new(3, 2)], 5).is_err());
        assert!(validate_windows(&[Window::new(2, 2)], 5).is_err());
    }

    #[test]
    fn two_point_window_is_flat() {
        let p = pts(&[[0.0, 0.0], [1.0, 9.0], [2.0, 0.0]]);
        let w = Window::new(1, 2);
        assert_eq!(w.num_points(), 2);
        assert_eq!(evaluate_window(&p, w, 0.0).unwrap(), Verdict::Flat);
        assert_eq!(Window::new(0, 2).num_points(), 3);
    }

    fn rejection(windows: &[Window], num_points: usize) -> SimplifyError {
        *validate_windows(windows, num_points).unwrap_err().current_context()
    }

    #[test]
    fn validation_accepts_seeded_chains() {
        assert!(validate_windows(&[Window::new(0, 1), Window::new(1, 4)], 5).is_ok());
        assert!(validate_windows(&windows_by_count(10, 6).unwrap(), 10).is_ok());
    }

    #[test]
    fn validation_rejects_empty_list() {
        assert_eq!(rejection(&[], 5), SimplifyError::InvalidParameter);
    }

    #[test]
    fn validation_rejects_missing_head() {
        assert_eq!(rejection(&[Window::new(1, 4)], 5), SimplifyError::InvalidParameter);
    }

    #[test]
    fn validation_rejects_missing_tail() {
        assert_eq!(rejection(&[Window::new(0, 2)], 5), SimplifyError::InvalidParameter);
    }

    #[test]
    fn validation_rejects_overlap() {
        let windows = [Window::new(0, 3), Window::new(1, 4)];
        assert_eq!(rejection(&windows, 5), SimplifyError::InvalidParameter);
    }

    #[test]
    fn validation_rejects_gap() {
        let windows = [Window::new(0, 1), Window::new(2, 4)];
        assert_eq!(rejection(&windows, 5), SimplifyError::InvalidParameter);
    }
}
