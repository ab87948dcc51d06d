use glam::Vec2;

use crate::schedule::{LiveTarget, Phase};
use crate::tracking::{HandObservation, SKELETON_CONNECTIONS};

/// Resolved drawing instructions for a 2D canvas-like surface, one batch
/// per frame. The host rasterizes; the core never touches pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// The camera frame, flipped horizontally.
    MirroredVideo,
    TargetCircle {
        center: Vec2,
        radius: f32,
        label: char,
        hit: bool,
    },
    SkeletonSegment {
        from: Vec2,
        to: Vec2,
    },
    CountdownNumeral {
        value: u8,
    },
}

fn mirrored_px(point: Vec2, canvas: Vec2) -> Vec2 {
    Vec2::new((1.0 - point.x) * canvas.x, point.y * canvas.y)
}

/// Pure function of frame state; canvas dimensions are in pixels.
pub fn render_frame(
    phase: Phase,
    targets: &[LiveTarget],
    observations: &[HandObservation],
    canvas: Vec2,
) -> Vec<DrawCmd> {
    let mut cmds = vec![DrawCmd::MirroredVideo];

    match phase {
        Phase::Countdown { remaining } => {
            cmds.push(DrawCmd::CountdownNumeral { value: remaining });
        }
        Phase::Active | Phase::AwaitingNext => {
            for target in targets {
                cmds.push(DrawCmd::TargetCircle {
                    center: Vec2::new(target.x * canvas.x, target.y * canvas.y),
                    radius: target.radius,
                    label: target.punch.token(),
                    hit: target.hit,
                });
            }
            for obs in observations {
                for &(a, b) in SKELETON_CONNECTIONS.iter() {
                    let (Some(&from), Some(&to)) = (obs.points.get(a), obs.points.get(b)) else {
                        continue;
                    };
                    cmds.push(DrawCmd::SkeletonSegment {
                        from: mirrored_px(from, canvas),
                        to: mirrored_px(to, canvas),
                    });
                }
            }
        }
        Phase::Idle | Phase::Errored | Phase::Stopped => {}
    }
    cmds
}
