use ndarray::Array2;

/// Median of a `window` x `window` neighborhood centred on (row, col).
///
/// Border pixels are clamped (replicated), so every window holds exactly
/// `window * window` samples. `scratch` is reused between calls.
pub fn window_median(
    data: &Array2<f32>,
    row: usize,
    col: usize,
    window: usize,
    scratch: &mut Vec<f32>,
) -> f32 {
    let (h, w) = data.dim();
    let radius = (window / 2) as isize;
    scratch.clear();

    for dr in -radius..=radius {
        let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
        for dc in -radius..=radius {
            let c = (col as isize + dc).clamp(0, w as isize - 1) as usize;
            scratch.push(data[[r, c]]);
        }
    }

    compute_median(scratch)
}

/// Replace every pixel where `mask` is set by its neighborhood median.
/// Unmasked pixels are copied unchanged.
pub fn median_filter_masked(
    data: &Array2<f32>,
    mask: &Array2<bool>,
    window: usize,
    scratch: &mut Vec<f32>,
) -> Array2<f32> {
    let mut result = data.clone();
    for ((row, col), &flagged) in mask.indexed_iter() {
        if flagged {
            result[[row, col]] = window_median(data, row, col, window, scratch);
        }
    }
    result
}

fn compute_median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}
