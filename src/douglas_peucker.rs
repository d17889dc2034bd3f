//! Breadth-first Ramer-Douglas-Peucker driver.
//!
//! Instead of recursing, the driver keeps a worklist of windows. Each level
//! evaluates every pending window in parallel; flat windows retain their
//! endpoints and non-flat windows are replaced by their two children in the
//! next level. The run ends when a level produces no children.

use log::{debug, trace};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::points::Points;
use crate::window::{evaluate_window, validate_windows, Verdict, Window};

/// Which points survive simplification.
///
/// Entries only ever go from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionMask(Vec<bool>);

impl RetentionMask {
    pub fn new(len: usize) -> Self {
        RetentionMask(vec![false; len])
    }

    pub fn retain(&mut self, index: usize) {
        self.0[index] = true;
    }

    pub fn is_retained(&self, index: usize) -> bool {
        self.0[index]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&kept| kept).count()
    }

    /// Retained indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &kept)| kept.then_some(i))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Number of worklist levels processed.
    pub levels: usize,
    /// Total windows evaluated across all levels.
    pub windows_evaluated: usize,
    /// Points marked in the final mask.
    pub retained: usize,
}

/// Evaluate one level of windows and return the next level.
///
/// Flat windows mark both endpoints in `mask`. Split windows contribute
/// their left and right children, in the order the parents were given.
pub fn step(
    points: &Points,
    epsilon: f64,
    windows: &[Window],
    mask: &mut RetentionMask,
) -> Result<Vec<Window>> {
    let verdicts: Vec<Verdict> = windows
        .par_iter()
        .map(|&w| evaluate_window(points, w, epsilon))
        .collect::<Result<Vec<_>>>()?;

    let mut next = Vec::new();
    for (w, verdict) in windows.iter().zip(verdicts) {
        match verdict {
            Verdict::Flat => {
                mask.retain(w.start);
                mask.retain(w.end);
            }
            Verdict::Split(offset) => {
                let (left, right) = w.split(offset);
                next.push(left);
                next.push(right);
            }
        }
    }
    Ok(next)
}

/// Run the worklist from `initial` until every window is flat.
///
/// `epsilon` must already be validated by the caller.
pub fn run(points: &Points, epsilon: f64, initial: Vec<Window>) -> Result<(RetentionMask, RunStats)> {
    validate_windows(&initial, points.len())?;

    let mut mask = RetentionMask::new(points.len());
    let mut stats = RunStats::default();
    let mut windows = initial;

    while !windows.is_empty() {
        trace!("level {}: {} windows", stats.levels, windows.len());
        stats.levels += 1;
        stats.windows_evaluated += windows.len();
        windows = step(points, epsilon, &windows, &mut mask)?;
    }

    stats.retained = mask.count();
    debug!(
        "rdp kept {} of {} points after {} levels ({} windows evaluated)",
        stats.retained,
        points.len(),
        stats.levels,
        stats.windows_evaluated
    );
    Ok((mask, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(rows: &[[f64; 2]]) -> Points {
        Points::from_rows(rows).unwrap()
    }

    #[test]
    fn step_marks_flat_and_splits_rest() {
        let p = pts(&[
            [0.0, 0.0],
            [1.0, 10.0],
            [1.0, 20.0],
            [2.0, 0.0],
            [3.0, 0.0],
            [4.0, 0.0],
            [5.0, 0.0],
        ]);
        let mut mask = RetentionMask::new(p.len());
        let next = step(&p, 1.0, &[Window::new(0, 3), Window::new(3, 6)], &mut mask).unwrap();

        assert_eq!(mask.indices(), vec![3, 6]);
        assert_eq!(next, vec![Window::new(0, 2), Window::new(2, 3)]);
    }

    #[test]
    fn children_keep_parent_order() {
        let p = pts(&[[0.0, 0.0], [1.0, 5.0], [2.0, 0.0], [3.0, 5.0], [4.0, 0.0]]);
        let mut mask = RetentionMask::new(p.len());
        let next = step(&p, 1.0, &[Window::new(0, 2), Window::new(2, 4)], &mut mask).unwrap();
        assert_eq!(
            next,
            vec![Window::new(0, 1), Window::new(1, 2), Window::new(2, 3), Window::new(3, 4)]
        );
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn top_hat() {
        let p = pts(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 30.0],
            [4.0, 30.0],
            [5.0, 30.0],
            [6.0, 0.0],
            [7.0, 0.0],
            [8.0, 0.0],
        ]);
        let (mask, stats) = run(&p, 1.0, vec![Window::new(0, 8)]).unwrap();
        assert_eq!(mask.indices(), vec![0, 2, 3, 5, 6, 8]);
        assert_eq!(stats.retained, 6);
        assert!(stats.levels >= 2);
    }

    #[test]
    fn triangle() {
        let p = pts(&[
            [0.0, 0.0],
            [1.0, 10.0],
            [2.0, 20.0],
            [3.0, 30.0],
            [4.0, 20.0],
            [5.0, 10.0],
            [6.0, 0.0],
        ]);
        let (mask, stats) = run(&p, 1.0, vec![Window::new(0, 6)]).unwrap();
        assert_eq!(mask.indices(), vec![0, 3, 6]);
        assert_eq!(stats.levels, 2);
        assert_eq!(stats.windows_evaluated, 3);
    }

    #[test]
    fn seed_boundaries_survive() {
        let p = pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]]);
        let (mask, _) = run(&p, 1.0, vec![Window::new(0, 2), Window::new(2, 4)]).unwrap();
        assert_eq!(mask.indices(), vec![0, 2, 4]);
    }

    #[test]
    fn single_point() {
        let p = pts(&[[1.0, 2.0]]);
        let (mask, stats) = run(&p, 0.0, vec![Window::new(0, 0)]).unwrap();
        assert_eq!(mask.indices(), vec![0]);
        assert_eq!(stats.levels, 1);
    }

    #[test]
    fn empty_seed_is_rejected() {
        let p = pts(&[[0.0, 0.0], [1.0, 0.0]]);
        let err = run(&p, 0.0, Vec::new()).unwrap_err();
        assert_eq!(*err.current_context(), crate::error::SimplifyError::InvalidParameter);
    }

    #[test]
    fn step_on_empty_worklist_is_a_no_op() {
        let p = pts(&[[0.0, 0.0], [1.0, 0.0]]);
        let mut mask = RetentionMask::new(p.len());
        assert!(step(&p, 0.0, &[], &mut mask).unwrap().is_empty());
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn invalid_seed_is_rejected() {
        let p = pts(&[[0.0, 0.0], [1.0, 0.0]]);
        assert!(run(&p, 0.0, vec![Window::new(0, 2)]).is_err());
    }
}
