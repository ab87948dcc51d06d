use glam::Vec2;

use spar_core::detect::{HitDetector, HIT_COOLDOWN_SECS};
use spar_core::schedule::LiveTarget;
use spar_core::tracking::{HandObservation, LANDMARK_COUNT};
use spar_schema::{target_spec, Handedness, PunchType};

const CANVAS: Vec2 = Vec2::new(1000.0, 800.0);

fn hand(handedness: Handedness, x: f32, y: f32) -> HandObservation {
    HandObservation {
        handedness,
        points: vec![Vec2::new(x, y); LANDMARK_COUNT],
    }
}

fn target(id: u64, punch: PunchType) -> LiveTarget {
    let spec = target_spec(punch);
    LiveTarget {
        id,
        punch,
        hand: punch.hand(),
        x: spec.x,
        y: spec.y,
        radius: spec.radius,
        hit: false,
        spawned_at: 0.0,
    }
}

/// The jab target sits at (0.6, 0.4). In mirrored space the left wrist
/// must be observed at x = 0.4 for the corrected position to land on it.
#[test]
fn mirror_correction_determines_distance() {
    let mut detector = HitDetector::new();
    let mut targets = vec![target(0, PunchType::Jab)];

    // Raw position equal to the target's nominal position: after mirror
    // correction handX = (1 - 0.6) * 1000 = 400 vs target 600 -> miss.
    let hits = detector.detect(
        &[hand(Handedness::Left, 0.6, 0.4)],
        &mut targets,
        CANVAS,
        1.0,
    );
    assert!(hits.is_empty());
    assert!(!targets[0].hit);

    // Pre-mirrored position hits.
    let hits = detector.detect(
        &[hand(Handedness::Left, 0.4, 0.4)],
        &mut targets,
        CANVAS,
        2.0,
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].punch, PunchType::Jab);
    assert!(targets[0].hit);
}

#[test]
fn wrong_handedness_never_hits() {
    let mut detector = HitDetector::new();
    let mut targets = vec![target(0, PunchType::Jab)];

    // Right hand exactly on the left-hand target.
    let hits = detector.detect(
        &[hand(Handedness::Right, 0.4, 0.4)],
        &mut targets,
        CANVAS,
        1.0,
    );
    assert!(hits.is_empty());
    assert!(!targets[0].hit);
}

#[test]
fn global_cooldown_spans_both_hands() {
    let mut detector = HitDetector::new();
    let mut targets = vec![target(0, PunchType::Jab), target(1, PunchType::Cross)];

    // Both hands on their targets in the same frame: one hit only.
    let both = [
        hand(Handedness::Left, 0.4, 0.4),
        hand(Handedness::Right, 0.6, 0.4),
    ];
    let hits = detector.detect(&both, &mut targets, CANVAS, 1.0);
    assert_eq!(hits.len(), 1);

    // Still inside the cooldown window: nothing registers.
    let hits = detector.detect(&both, &mut targets, CANVAS, 1.0 + HIT_COOLDOWN_SECS / 2.0);
    assert!(hits.is_empty());

    // Past the cooldown the second target registers.
    let hits = detector.detect(&both, &mut targets, CANVAS, 1.0 + HIT_COOLDOWN_SECS + 0.01);
    assert_eq!(hits.len(), 1);
    assert!(targets[0].hit && targets[1].hit);
}

#[test]
fn hit_targets_are_not_rescored() {
    let mut detector = HitDetector::new();
    let mut targets = vec![target(0, PunchType::Cross)];

    let on_target = [hand(Handedness::Right, 0.6, 0.4)];
    assert_eq!(detector.detect(&on_target, &mut targets, CANVAS, 1.0).len(), 1);
    assert!(detector
        .detect(&on_target, &mut targets, CANVAS, 10.0)
        .is_empty());
}

#[test]
fn proximity_respects_radius() {
    let mut detector = HitDetector::new();
    let mut targets = vec![target(0, PunchType::Jab)];

    // 61px above the 60px-radius target center.
    let just_outside = hand(Handedness::Left, 0.4, 0.4 + 61.0 / 800.0);
    assert!(detector
        .detect(&[just_outside], &mut targets, CANVAS, 1.0)
        .is_empty());

    let just_inside = hand(Handedness::Left, 0.4, 0.4 + 59.0 / 800.0);
    assert_eq!(
        detector
            .detect(&[just_inside], &mut targets, CANVAS, 2.0)
            .len(),
        1
    );
}
