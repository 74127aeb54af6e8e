#[allow(dead_code)]
mod common;

use common::{increasing_angle_samples, sample_at_angle_from_neg_z};

use nadir_core::error::NadirError;
use nadir_core::geometry::Vec3;
use nadir_core::select::{
    apply_criterion, compute_angles, detect_target_axis, resolve_target, select_frames, AxisPole,
    SelectionConfig, SelectionCriterion, SelectionReport, TargetConfig,
};

fn config(criterion: SelectionCriterion) -> SelectionConfig {
    SelectionConfig {
        target: TargetConfig::Auto,
        criterion,
    }
}

#[test]
fn test_auto_axis_picks_negative_z() {
    let samples = vec![Vec3::NEG_Z; 10];
    let choice = detect_target_axis(&samples);
    assert_eq!(choice.pole, AxisPole::NegZ);
    assert!((choice.mean_neg_z - 1.0).abs() < 1e-12);
    assert!((choice.mean_pos_z + 1.0).abs() < 1e-12);
}

#[test]
fn test_auto_axis_picks_positive_z() {
    let samples = vec![Vec3::new(0.1, 0.0, 2.0), Vec3::new(-0.2, 0.1, 0.5)];
    assert_eq!(detect_target_axis(&samples).pole, AxisPole::PosZ);
}

#[test]
fn test_auto_axis_tie_picks_negative_z() {
    assert_eq!(detect_target_axis(&[]).pole, AxisPole::NegZ);
    let samples = vec![Vec3::POS_Z, Vec3::NEG_Z];
    assert_eq!(detect_target_axis(&samples).pole, AxisPole::NegZ);
}

#[test]
fn test_auto_axis_ignores_zero_samples() {
    let samples = vec![Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0)];
    let choice = detect_target_axis(&samples);
    assert_eq!(choice.pole, AxisPole::PosZ);
}

#[test]
fn test_auto_axis_ignores_non_finite_samples() {
    let mut samples = vec![Vec3::NEG_Z; 99];
    samples.push(Vec3::new(f64::NAN, 0.0, 0.0));
    samples.insert(10, Vec3::new(f64::INFINITY, 0.0, 1.0));

    let choice = detect_target_axis(&samples);
    assert_eq!(choice.pole, AxisPole::NegZ);
    assert!(choice.mean_pos_z.is_finite());
    assert!(choice.mean_neg_z.is_finite());

    let report = select_frames(
        &samples,
        &config(SelectionCriterion::AbsoluteAngle { max_degrees: 5.0 }),
    )
    .unwrap();
    assert_eq!(report.kept_count(), 99);
    assert!(!report.kept.contains(&10));
    assert!(!report.kept.contains(&100));
}

#[test]
fn test_top_percentile_keeps_closest_half() {
    let samples = increasing_angle_samples(10);
    let report = select_frames(
        &samples,
        &config(SelectionCriterion::TopPercentile { fraction: 0.5 }),
    )
    .unwrap();
    assert_eq!(report.kept, vec![0, 1, 2, 3, 4]);
    assert_eq!(report.total, 10);
    assert_eq!(report.axis.map(|a| a.pole), Some(AxisPole::NegZ));
}

#[test]
fn test_top_percentile_keeps_at_least_one() {
    let samples = increasing_angle_samples(10);
    let report = select_frames(
        &samples,
        &config(SelectionCriterion::TopPercentile { fraction: 0.01 }),
    )
    .unwrap();
    assert_eq!(report.kept, vec![0]);
}

#[test]
fn test_top_percentile_output_is_temporal() {
    let angles = [40.0, 5.0, 30.0, 1.0, 20.0, 90.0];
    let kept = apply_criterion(&angles, &SelectionCriterion::TopPercentile { fraction: 0.5 });
    assert_eq!(kept, vec![1, 3, 4]);
}

#[test]
fn test_top_percentile_ties_break_by_index() {
    let angles = [10.0, 10.0, 10.0, 10.0];
    let kept = apply_criterion(&angles, &SelectionCriterion::TopPercentile { fraction: 0.5 });
    assert_eq!(kept, vec![0, 1]);
}

#[test]
fn test_full_fraction_keeps_everything() {
    let samples = increasing_angle_samples(7);
    let report = select_frames(
        &samples,
        &config(SelectionCriterion::TopPercentile { fraction: 1.0 }),
    )
    .unwrap();
    assert_eq!(report.kept, (0..7).collect::<Vec<_>>());
}

#[test]
fn test_absolute_angle_is_inclusive() {
    let angles = [0.0, 5.0, 5.000001, 12.0, 4.9];
    let kept = apply_criterion(&angles, &SelectionCriterion::AbsoluteAngle { max_degrees: 5.0 });
    assert_eq!(kept, vec![0, 1, 4]);
}

#[test]
fn test_absolute_zero_with_no_exact_match_is_empty() {
    let samples = vec![sample_at_angle_from_neg_z(1.0), sample_at_angle_from_neg_z(3.0)];
    let report = select_frames(
        &samples,
        &config(SelectionCriterion::AbsoluteAngle { max_degrees: 0.0 }),
    )
    .unwrap();
    assert!(report.is_empty());
    assert_eq!(report.total, 2);
}

#[test]
fn test_explicit_target_is_normalized() {
    let (target, axis) = resolve_target(
        &[],
        &TargetConfig::Explicit {
            direction: Vec3::new(0.0, 0.0, 5.0),
        },
    )
    .unwrap();
    assert!(axis.is_none());
    assert!((target.z - 1.0).abs() < 1e-12);
}

#[test]
fn test_zero_explicit_target_rejected() {
    let result = resolve_target(
        &[Vec3::POS_Z],
        &TargetConfig::Explicit {
            direction: Vec3::ZERO,
        },
    );
    assert!(matches!(result, Err(NadirError::InvalidConfig(_))));
}

#[test]
fn test_invalid_fraction_rejected() {
    for fraction in [0.0, -0.2, 1.5, f64::NAN] {
        let result = select_frames(
            &[Vec3::NEG_Z],
            &config(SelectionCriterion::TopPercentile { fraction }),
        );
        assert!(
            matches!(result, Err(NadirError::InvalidConfig(_))),
            "fraction {fraction} accepted"
        );
    }
}

#[test]
fn test_nan_max_angle_rejected() {
    let criterion = SelectionCriterion::AbsoluteAngle {
        max_degrees: f64::NAN,
    };
    assert!(criterion.validate().is_err());
}

#[test]
fn test_compute_angles_against_target() {
    let samples = increasing_angle_samples(4);
    let angles = compute_angles(&samples, Vec3::NEG_Z);
    for (i, angle) in angles.iter().enumerate() {
        assert!((angle - i as f64 * 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_selection_report_serializes() {
    let samples = increasing_angle_samples(4);
    let report = select_frames(
        &samples,
        &SelectionConfig {
            target: TargetConfig::Explicit {
                direction: Vec3::NEG_Z,
            },
            criterion: SelectionCriterion::AbsoluteAngle { max_degrees: 15.0 },
        },
    )
    .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["kept"], serde_json::json!([0, 1]));
    assert_eq!(value["total"], serde_json::json!(4));

    let back: SelectionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
