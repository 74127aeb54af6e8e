use crate::geometry::{angle_to_target, Vec3};

use super::SelectionCriterion;

/// Angle (degrees) of every sample to `target`, in sample order.
pub fn compute_angles(samples: &[Vec3], target: Vec3) -> Vec<f64> {
    samples.iter().map(|s| angle_to_target(*s, target)).collect()
}

/// Indices of frames surviving `criterion`, in temporal order.
///
/// May be empty only for `AbsoluteAngle`.
pub fn apply_criterion(angles: &[f64], criterion: &SelectionCriterion) -> Vec<usize> {
    match criterion {
        SelectionCriterion::AbsoluteAngle { max_degrees } => keep_within(angles, *max_degrees),
        SelectionCriterion::TopPercentile { fraction } => keep_top_fraction(angles, *fraction),
    }
}

fn keep_within(angles: &[f64], max_degrees: f64) -> Vec<usize> {
    angles
        .iter()
        .enumerate()
        .filter(|(_, a)| **a <= max_degrees)
        .map(|(i, _)| i)
        .collect()
}

fn keep_top_fraction(angles: &[f64], fraction: f64) -> Vec<usize> {
    let n = angles.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| angles[a].total_cmp(&angles[b]).then(a.cmp(&b)));

    let k = ((n as f64 * fraction).floor() as usize).max(1).min(n);
    let mut kept: Vec<usize> = order.into_iter().take(k).collect();
    kept.sort_unstable();
    kept
}
