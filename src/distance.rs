use error_stack::Report;
use rayon::prelude::*;

use crate::error::{Result, SimplifyError};

/// Below this many query points the kernel stays on the calling thread.
const PAR_MIN_POINTS: usize = 4096;

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Magnitude of the wedge product `a ^ b`.
///
/// `sqrt(sum_{i<j} (a_i b_j - a_j b_i)^2)`; in 3D this is the norm of the
/// cross product, and it stays defined for any dimension.
fn wedge_norm(a: &[f64], b: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 0..a.len() {
        for j in (i + 1)..a.len() {
            let m = a[i] * b[j] - a[j] * b[i];
            sum += m * m;
        }
    }
    sum.sqrt()
}

fn check_dims(p1: &[f64], p2: &[f64], queries: &[f64]) -> Result<usize> {
    let dim = p1.len();
    if dim < 2 || p2.len() != dim {
        return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
            "segment endpoints have {} and {} coordinates",
            p1.len(),
            p2.len()
        )));
    }
    if queries.len() % dim != 0 {
        return Err(Report::new(SimplifyError::InvalidInput).attach_printable(format!(
            "{} query coordinates do not form {}-dimensional points",
            queries.len(),
            dim
        )));
    }
    Ok(dim)
}

/// Distance of every query point to the line through `p1` and `p2`.
///
/// `queries` is a flat row-major buffer with the same dimension as `p1`.
/// When `p1 == p2` exactly, no line is defined and the plain Euclidean
/// distance to `p1` is returned instead.
pub fn distances(p1: &[f64], p2: &[f64], queries: &[f64]) -> Result<Vec<f64>> {
    let dim = check_dims(p1, p2, queries)?;

    if p1 == p2 {
        return Ok(map_points(queries, dim, |p| euclidean(p, p1)));
    }

    let delta: Vec<f64> = p2.iter().zip(p1).map(|(b, a)| b - a).collect();
    let delta_norm = norm(&delta);

    let out = if dim == 2 {
        map_points(queries, dim, |p| {
            // cross2d(p2 - p1, p1 - p)
            let cross = delta[0] * (p1[1] - p[1]) - delta[1] * (p1[0] - p[0]);
            cross.abs() / delta_norm
        })
    } else {
        map_points(queries, dim, |p| {
            let offset: Vec<f64> = p1.iter().zip(p).map(|(a, b)| a - b).collect();
            wedge_norm(&delta, &offset) / delta_norm
        })
    };
    Ok(out)
}

fn map_points<F>(queries: &[f64], dim: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync + Send,
{
    if queries.len() / dim < PAR_MIN_POINTS {
        queries.chunks_exact(dim).map(f).collect()
    } else {
        queries
            .par_chunks_exact(dim)
            .with_min_len(PAR_MIN_POINTS / 4)
            .map(f)
            .collect()
    }
}
