use error_stack::Report;
use serde::Serialize;

use crate::error::{Result, SimplifyError};

/// An ordered, fixed-dimension sequence of coordinate vectors.
///
/// Stored row-major in a single buffer: point `i` occupies
/// `coords[i * dim..(i + 1) * dim]`. A `Points` value always holds at least
/// one point, has `dim >= 2`, and contains only finite coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Points {
    dim: usize,
    coords: Vec<f64>,
}

impl Points {
    /// Build from a flat row-major buffer.
    pub fn new(dim: usize, coords: Vec<f64>) -> Result<Self> {
        if dim < 2 {
            return Err(Report::new(SimplifyError::InvalidInput)
                .attach_printable(format!("points need at least 2 dimensions, got {}", dim)));
        }
        if coords.is_empty() {
            return Err(Report::new(SimplifyError::InvalidInput)
                .attach_printable("at least one point is required"));
        }
        if coords.len() % dim != 0 {
            return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
                "buffer of {} values is not a whole number of {}-dimensional points",
                coords.len(),
                dim
            )));
        }
        if let Some(pos) = coords.iter().position(|c| !c.is_finite()) {
            return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
                "non-finite coordinate {} in point {}",
                coords[pos],
                pos / dim
            )));
        }
        Ok(Points { dim, coords })
    }

    /// Build from individual rows, which must all have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let dim = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => {
                return Err(Report::new(SimplifyError::InvalidInput)
                    .attach_printable("at least one point is required"))
            }
        };

        let mut coords = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
                    "point {} has {} coordinates, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            coords.extend_from_slice(row);
        }
        Points::new(dim, coords)
    }

    /// Build 2D points from separate `x` and `y` columns.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        let coords = x.iter().zip(y).flat_map(|(&a, &b)| [a, b]).collect();
        Points::new(2, coords)
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dim
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    /// Flat row-major view of points `start..=end`.
    pub fn span(&self, start: usize, end: usize) -> &[f64] {
        &self.coords[start * self.dim..(end + 1) * self.dim]
    }

    pub fn as_flat(&self) -> &[f64] {
        &self.coords
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.coords.chunks_exact(self.dim)
    }

    /// One coordinate column, e.g. `column(0)` for every `x`.
    pub fn column(&self, axis: usize) -> Vec<f64> {
        self.rows().map(|r| r[axis]).collect()
    }

    /// The points whose mask entry is `true`, in original order.
    ///
    /// The mask must be as long as the sequence and mark at least one point.
    pub fn select(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
                "mask has {} entries for {} points",
                mask.len(),
                self.len()
            )));
        }
        let coords: Vec<f64> = self
            .rows()
            .zip(mask)
            .filter(|&(_, &keep)| keep)
            .flat_map(|(row, _)| row.iter().copied())
            .collect();
        Points::new(self.dim, coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_keeps_order() {
        let pts = Points::from_rows(&[[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]).unwrap();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts.dim(), 2);
        assert_eq!(pts.row(1), &[2.0, 3.0]);
        assert_eq!(pts.column(1), vec![1.0, 3.0, 5.0]);
        assert_eq!(pts.span(1, 2), &[2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn rejects_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let err = Points::from_rows(&rows).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::InvalidInput);
    }

    #[test]
    fn rejects_one_dimensional() {
        let err = Points::new(1, vec![1.0, 2.0]).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::InvalidInput);
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = vec![vec![0.0, 0.0], vec![1.0, 1.0, 1.0]];
        let err = Points::from_rows(&rows).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::InvalidInput);
    }

    #[test]
    fn rejects_non_finite() {
        let err = Points::from_rows(&[[0.0, 0.0], [f64::NAN, 1.0]]).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::InvalidInput);
        let err = Points::from_rows(&[[0.0, f64::INFINITY]]).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::InvalidInput);
    }

    #[test]
    fn from_xy_interleaves() {
        let pts = Points::from_xy(&[0.0, 1.0], &[5.0, 6.0]).unwrap();
        assert_eq!(pts.as_flat(), &[0.0, 5.0, 1.0, 6.0]);
        assert!(Points::from_xy(&[0.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn select_filters_in_order() {
        let pts = Points::from_rows(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap();
        let picked = pts.select(&[true, false, true]).unwrap();
        assert_eq!(picked.as_flat(), &[0.0, 0.0, 2.0, 2.0]);
        assert!(pts.select(&[true]).is_err());
    }
}
