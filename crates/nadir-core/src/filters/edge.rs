use ndarray::Array2;

/// Local edge strength `|d/drow| + |d/dcol|`.
///
/// Derivatives use central differences in the interior and one-sided
/// differences on the borders. A dimension of length 1 has zero derivative.
pub fn edge_strength(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            let d_row = derivative(h, row, |r| data[[r, col]]);
            let d_col = derivative(w, col, |c| data[[row, c]]);
            result[[row, col]] = d_row.abs() + d_col.abs();
        }
    }

    result
}

fn derivative(len: usize, i: usize, at: impl Fn(usize) -> f32) -> f32 {
    if len < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == len - 1 {
        at(len - 1) - at(len - 2)
    } else {
        (at(i + 1) - at(i - 1)) / 2.0
    }
}

/// Value at `percentile` (0..=100) of `values`, lower-rank convention.
///
/// Returns `None` for an empty slice. `values` is reordered in place.
pub fn percentile_value(values: &mut [f32], percentile: f32) -> Option<f32> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let idx = ((n as f32 * percentile / 100.0) as usize).min(n - 1);
    Some(*values.select_nth_unstable_by(idx, |a, b| a.total_cmp(b)).1)
}
