//! Row and matrix normalization.
//!
//! Min–max scaling into `[0, 1]`, applied per row. Used by fitness
//! strategies that combine phenotype dimensions on different scales
//! (see [`WeightedSumFitness`](crate::search::WeightedSumFitness)).

/// Scales a row into `[0, 1]` by min–max normalization.
///
/// A constant row (max == min) maps to all zeros. Empty rows stay empty.
pub fn normalize_row(row: &[f64]) -> Vec<f64> {
    if row.is_empty() {
        return Vec::new();
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in row {
        min = min.min(v);
        max = max.max(v);
    }
    let span = max - min;
    if span == 0.0 {
        return vec![0.0; row.len()];
    }
    row.iter().map(|&v| (v - min) / span).collect()
}

/// Applies [`normalize_row`] to every row of a matrix.
pub fn normalize_matrix(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    matrix.iter().map(|row| normalize_row(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_row_range() {
        let out = normalize_row(&[2.0, 4.0, 6.0]);
        assert!((out[0] - 0.0).abs() < 1e-12);
        assert!((out[1] - 0.5).abs() < 1e-12);
        assert!((out[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_row_negative_values() {
        let out = normalize_row(&[-10.0, 0.0, 10.0]);
        assert!((out[0] - 0.0).abs() < 1e-12);
        assert!((out[1] - 0.5).abs() < 1e-12);
        assert!((out[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_constant_row_is_zero() {
        let out = normalize_row(&[7.0, 7.0, 7.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_empty_row() {
        assert!(normalize_row(&[]).is_empty());
    }

    #[test]
    fn test_normalize_matrix_per_row() {
        let out = normalize_matrix(&[vec![0.0, 10.0], vec![5.0, 5.0]]);
        assert_eq!(out[0], vec![0.0, 1.0]);
        assert_eq!(out[1], vec![0.0, 0.0]);
    }
}
