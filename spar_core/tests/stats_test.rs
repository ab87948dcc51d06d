use spar_core::events::HitEvent;
use spar_core::stats::{merge_session, StatsAggregator, POINTS_PER_HIT};
use spar_schema::{CumulativeStats, PunchType, SessionStats};

fn hit(at: f64) -> HitEvent {
    HitEvent {
        target_id: 0,
        punch: PunchType::Jab,
        timestamp: at,
    }
}

#[test]
fn streak_increments_and_best_streak_dominates() {
    let mut agg = StatsAggregator::new();
    for i in 0..5 {
        agg.apply(&hit(i as f64));
        let s = agg.snapshot();
        assert_eq!(s.streak, i + 1);
        assert!(s.best_streak >= s.streak);
    }
    let s = agg.snapshot();
    assert_eq!(s.punches, 5);
    assert_eq!(s.score, 5 * POINTS_PER_HIT);
    assert_eq!(s.best_streak, 5);
}

#[test]
fn accuracy_is_running_average_of_registered_attempts() {
    let mut agg = StatsAggregator::new();
    assert_eq!(agg.snapshot().accuracy, 0.0);
    agg.apply(&hit(1.0));
    assert!((agg.snapshot().accuracy - 100.0).abs() < 1e-9);
    agg.apply(&hit(2.0));
    agg.apply(&hit(3.0));
    // Only hits register attempts, so the average stays at 100.
    assert!((agg.snapshot().accuracy - 100.0).abs() < 1e-9);
}

#[test]
fn avg_speed_is_mean_inter_hit_interval() {
    let mut agg = StatsAggregator::new();
    agg.apply(&hit(1.0));
    assert_eq!(agg.snapshot().avg_speed, 0.0, "no interval after one hit");

    agg.apply(&hit(1.6));
    assert!((agg.snapshot().avg_speed - 0.6).abs() < 1e-9);

    agg.apply(&hit(2.0));
    assert!((agg.snapshot().avg_speed - 0.5).abs() < 1e-9);
}

#[test]
fn finish_hands_out_stats_and_resets() {
    let mut agg = StatsAggregator::new();
    agg.apply(&hit(1.0));
    let final_stats = agg.finish();
    assert_eq!(final_stats.punches, 1);
    assert_eq!(agg.snapshot(), SessionStats::default());
}

#[test]
fn merging_zero_punch_session_is_a_no_op() {
    let mut total = CumulativeStats {
        score: 200,
        punches: 20,
        accuracy: 90.0,
        best_streak: 8,
        avg_speed: 0.8,
    };
    let before = total;
    merge_session(&mut total, &SessionStats::default());
    assert_eq!(total, before);
}

#[test]
fn merge_weights_averages_by_punch_count() {
    let mut total = CumulativeStats {
        score: 100,
        punches: 10,
        accuracy: 80.0,
        best_streak: 4,
        avg_speed: 1.0,
    };
    let session = SessionStats {
        score: 300,
        punches: 30,
        accuracy: 100.0,
        streak: 7,
        best_streak: 12,
        avg_speed: 0.6,
    };
    merge_session(&mut total, &session);

    assert_eq!(total.score, 400);
    assert_eq!(total.punches, 40);
    assert_eq!(total.best_streak, 12);
    // (80*10 + 100*30) / 40
    assert!((total.accuracy - 95.0).abs() < 1e-9);
    // (1.0*10 + 0.6*30) / 40
    assert!((total.avg_speed - 0.7).abs() < 1e-9);
}
