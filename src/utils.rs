/// Index and value of the largest element; ties go to the first occurrence.
pub fn argmax(data: &[f64]) -> Option<(usize, f64)> {
    data.iter().enumerate().fold(None, |acc, (index, &value)| {
        match acc {
            None => Some((index, value)),
            Some((_, max_val)) if value > max_val => Some((index, value)),
            _ => acc
        }
    })
}

/// `a / b` rounded to the nearest integer, ties to even.
pub fn round_ratio(a: usize, b: usize) -> usize {
    (a as f64 / b as f64).round_ties_even() as usize
}
