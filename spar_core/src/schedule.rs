use log::debug;

use crate::combo::{ComboSource, GeneratedSource, ScriptedSource};
use crate::error::SessionError;
use spar_schema::{target_spec, BeatMap, ChallengeLevel, Handedness, PunchType};

pub const COUNTDOWN_START: u8 = 3;

/// Scripted targets expire this many beats after spawning; expired targets
/// are dropped without scoring.
pub const SCRIPTED_RETENTION_BEATS: f64 = 1.0;

/// An on-screen, currently hittable target. Owned exclusively by the
/// scheduler; the hit detector writes the `hit` flag through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveTarget {
    pub id: u64,
    pub punch: PunchType,
    pub hand: Handedness,
    /// Normalized canvas position.
    pub x: f32,
    pub y: f32,
    /// Pixels.
    pub radius: f32,
    pub hit: bool,
    /// Source-clock position at spawn: beats in scripted sessions,
    /// seconds in generated ones.
    pub spawned_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown { remaining: u8 },
    Active,
    /// Generated mode only: the current combination is consumed and the
    /// next one has not resolved yet.
    AwaitingNext,
    Errored,
    Stopped,
}

/// Drives which targets are live, fed by clock ticks and hit events.
pub struct Scheduler {
    phase: Phase,
    paused: bool,
    source: ComboSource,
    live: Vec<LiveTarget>,
    next_target_id: u64,
    /// Generated mode: when the post-combination think time elapses and
    /// the next fetch may be issued.
    next_fetch_at: Option<f64>,
    next_countdown_at: f64,
    think_time: f64,
}

impl Scheduler {
    pub fn scripted(map: &BeatMap) -> Self {
        Self {
            phase: Phase::Idle,
            paused: false,
            source: ComboSource::Scripted(ScriptedSource::new(map.punches.clone())),
            live: Vec::new(),
            next_target_id: 0,
            next_fetch_at: None,
            next_countdown_at: 0.0,
            think_time: 0.0,
        }
    }

    pub fn generated(source: GeneratedSource, level: ChallengeLevel) -> Self {
        Self {
            phase: Phase::Idle,
            paused: false,
            source: ComboSource::Generated(source),
            live: Vec::new(),
            next_target_id: 0,
            next_fetch_at: None,
            next_countdown_at: 0.0,
            think_time: level.think_time_secs(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn live_targets(&self) -> &[LiveTarget] {
        &self.live
    }

    pub fn live_targets_mut(&mut self) -> &mut [LiveTarget] {
        &mut self.live
    }

    /// Admits no targets until the three-count countdown has elapsed.
    pub fn start(&mut self, now: f64) {
        self.live.clear();
        self.next_fetch_at = None;
        self.paused = false;
        self.phase = Phase::Countdown {
            remaining: COUNTDOWN_START,
        };
        self.next_countdown_at = now + 1.0;
        match &mut self.source {
            ComboSource::Scripted(s) => s.reset(),
            ComboSource::Generated(g) => g.invalidate(),
        }
    }

    /// One scheduler tick. `beat` is the current beat position for
    /// scripted sessions; `player_accuracy` accompanies generated fetches.
    pub fn tick(
        &mut self,
        now: f64,
        beat: Option<f64>,
        player_accuracy: Option<f64>,
    ) -> Result<(), SessionError> {
        if self.paused {
            return Ok(());
        }
        match self.phase {
            Phase::Idle | Phase::Errored | Phase::Stopped => return Ok(()),
            Phase::Countdown { mut remaining } => {
                while remaining > 0 && now >= self.next_countdown_at {
                    remaining -= 1;
                    self.next_countdown_at += 1.0;
                }
                if remaining > 0 {
                    self.phase = Phase::Countdown { remaining };
                    return Ok(());
                }
                debug!("countdown complete, admitting targets");
                self.phase = Phase::Active;
            }
            Phase::Active | Phase::AwaitingNext => {}
        }

        match &mut self.source {
            ComboSource::Scripted(scripted) => {
                let beat = beat.unwrap_or(f64::NEG_INFINITY);
                let due = scripted.due(beat);
                for event in due {
                    let spec = target_spec(event.punch);
                    let id = self.next_target_id;
                    self.next_target_id += 1;
                    self.live.push(LiveTarget {
                        id,
                        punch: event.punch,
                        hand: event.punch.hand(),
                        x: spec.x,
                        y: spec.y,
                        radius: spec.radius,
                        hit: false,
                        spawned_at: beat,
                    });
                }
                // Beat-clock aging: a pause freezes the beat position, so
                // targets alive at pause are still alive on resume.
                self.live
                    .retain(|t| beat - t.spawned_at <= SCRIPTED_RETENTION_BEATS);
                self.phase = Phase::Active;
                Ok(())
            }
            ComboSource::Generated(generated) => {
                if let Some(resolved) = generated.poll() {
                    if let Err(e) = resolved {
                        self.phase = Phase::Errored;
                        return Err(e);
                    }
                    self.live.clear();
                }

                if generated.in_flight() {
                    self.phase = Phase::AwaitingNext;
                    return Ok(());
                }

                if generated.exhausted() {
                    let due_now = match self.next_fetch_at {
                        None => true,
                        Some(at) => now >= at,
                    };
                    if due_now {
                        self.next_fetch_at = None;
                        generated.request_next(player_accuracy);
                    }
                    self.phase = Phase::AwaitingNext;
                    return Ok(());
                }

                self.phase = Phase::Active;
                if self.live.is_empty() {
                    if let Some(punch) = generated.current_punch() {
                        let spec = target_spec(punch);
                        let id = self.next_target_id;
                        self.next_target_id += 1;
                        self.live.push(LiveTarget {
                            id,
                            punch,
                            hand: punch.hand(),
                            x: spec.x,
                            y: spec.y,
                            radius: spec.radius,
                            hit: false,
                            spawned_at: now,
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Scripted mode: true once every beat event has spawned and every
    /// spawned target is gone. Hosts use this to end playback-driven runs.
    pub fn scripted_finished(&self) -> bool {
        match &self.source {
            ComboSource::Scripted(s) => s.exhausted() && self.live.is_empty(),
            ComboSource::Generated(_) => false,
        }
    }

    /// Advances past a hit target. In generated mode the next punch in the
    /// combination becomes due; hitting the final punch schedules the next
    /// fetch after the think-time delay.
    pub fn on_hit(&mut self, target_id: u64, now: f64) {
        let Some(target) = self.live.iter_mut().find(|t| t.id == target_id) else {
            return;
        };
        target.hit = true;
        match &mut self.source {
            // Scripted targets stay visible (tinted) until retention drops them.
            ComboSource::Scripted(_) => {}
            ComboSource::Generated(generated) => {
                generated.advance();
                self.live.retain(|t| !t.hit);
                if generated.exhausted() {
                    self.next_fetch_at = Some(now + self.think_time);
                    self.phase = Phase::AwaitingNext;
                }
            }
        }
    }

    /// Parks the scheduler in the terminal error state; live targets are
    /// discarded.
    pub fn fail(&mut self) {
        self.phase = Phase::Errored;
        self.live.clear();
        self.next_fetch_at = None;
    }

    /// Freezes advancement. The in-flight fetch, if any, keeps running.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self, now: f64) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if let Phase::Countdown { .. } = self.phase {
            self.next_countdown_at = now + 1.0;
        }
        // An exhausted combination is refetched immediately rather than
        // re-waiting the think time.
        if let ComboSource::Generated(g) = &self.source {
            if g.exhausted() && !g.in_flight() {
                self.next_fetch_at = Some(now);
            }
        }
    }

    /// Discards live targets and pending timers. A fetch still in flight
    /// completes on its own; its reply is discarded by the generation
    /// guard.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.paused = false;
        self.live.clear();
        self.next_fetch_at = None;
        if let ComboSource::Generated(g) = &mut self.source {
            g.invalidate();
        }
    }
}
