use crate::events::HitEvent;
use spar_schema::{CumulativeStats, SessionStats};

pub const POINTS_PER_HIT: u32 = 10;

/// Sole owner and writer of the in-session statistics. An "attempt" only
/// registers on a hit; scripted targets that expire unhit do not touch
/// accuracy.
pub struct StatsAggregator {
    stats: SessionStats,
    last_hit_at: Option<f64>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            stats: SessionStats::default(),
            last_hit_at: None,
        }
    }

    pub fn apply(&mut self, hit: &HitEvent) {
        let s = &mut self.stats;
        let prev_punches = s.punches;
        s.punches += 1;
        s.score += POINTS_PER_HIT;
        s.accuracy = (s.accuracy * prev_punches as f64 + 100.0) / s.punches as f64;
        s.streak += 1;
        s.best_streak = s.best_streak.max(s.streak);

        if let Some(last) = self.last_hit_at {
            // Running mean over the punches-1 inter-hit intervals.
            let intervals = prev_punches as f64;
            let delta = hit.timestamp - last;
            s.avg_speed = (s.avg_speed * (intervals - 1.0) + delta) / intervals;
        }
        self.last_hit_at = Some(hit.timestamp);
    }

    pub fn snapshot(&self) -> SessionStats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = SessionStats::default();
        self.last_hit_at = None;
    }

    /// Hands the final stats out for persistence and resets for the next
    /// session.
    pub fn finish(&mut self) -> SessionStats {
        let final_stats = self.stats;
        self.reset();
        final_stats
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds one finished session into the lifetime totals: sums for score and
/// punches, max for best streak, punch-weighted running averages for
/// accuracy and speed. A zero-punch session leaves the totals unchanged.
pub fn merge_session(total: &mut CumulativeStats, session: &SessionStats) {
    if session.punches > 0 {
        let combined = (total.punches + session.punches) as f64;
        total.accuracy = (total.accuracy * total.punches as f64
            + session.accuracy * session.punches as f64)
            / combined;
        total.avg_speed = (total.avg_speed * total.punches as f64
            + session.avg_speed * session.punches as f64)
            / combined;
    }
    total.score += session.score;
    total.punches += session.punches;
    total.best_streak = total.best_streak.max(session.best_streak);
}
