use glam::Vec2;
use log::debug;

use crate::events::HitEvent;
use crate::schedule::LiveTarget;
use crate::tracking::HandObservation;

/// Minimum interval between two accepted hits, shared across all hands and
/// targets. A single physical punch detected twice (or by both hands at
/// once) only scores once.
pub const HIT_COOLDOWN_SECS: f64 = 0.5;

/// Per-frame proximity test between tracked hands and live targets.
pub struct HitDetector {
    last_hit_at: f64,
}

impl HitDetector {
    pub fn new() -> Self {
        Self {
            last_hit_at: f64::NEG_INFINITY,
        }
    }

    pub fn reset(&mut self) {
        self.last_hit_at = f64::NEG_INFINITY;
    }

    /// Tests each observed hand against each unhit target requiring that
    /// hand. The camera image is horizontally mirrored, so the tracking
    /// point's x is flipped before scaling to pixel space; target centers
    /// scale directly.
    pub fn detect(
        &mut self,
        observations: &[HandObservation],
        targets: &mut [LiveTarget],
        canvas: Vec2,
        now: f64,
    ) -> Vec<HitEvent> {
        let mut hits = Vec::new();
        for obs in observations {
            let Some(point) = obs.tracking_point() else {
                continue;
            };
            let hand_px = Vec2::new((1.0 - point.x) * canvas.x, point.y * canvas.y);
            for target in targets.iter_mut() {
                if target.hit || target.hand != obs.handedness {
                    continue;
                }
                let center = Vec2::new(target.x * canvas.x, target.y * canvas.y);
                if hand_px.distance(center) >= target.radius {
                    continue;
                }
                if now - self.last_hit_at < HIT_COOLDOWN_SECS {
                    continue;
                }
                self.last_hit_at = now;
                target.hit = true;
                debug!("hit {:?} (target {})", target.punch, target.id);
                hits.push(HitEvent {
                    target_id: target.id,
                    punch: target.punch,
                    timestamp: now,
                });
            }
        }
        hits
    }
}

impl Default for HitDetector {
    fn default() -> Self {
        Self::new()
    }
}
