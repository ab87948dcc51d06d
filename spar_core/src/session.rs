use atomic_float::AtomicF64;
use glam::Vec2;
use std::sync::Arc;

use crate::clock::PlaybackClock;
use crate::combo::{GeneratedSource, SuggestionClient};
use crate::detect::HitDetector;
use crate::error::SessionError;
use crate::events::HitQueue;
use crate::render::{render_frame, DrawCmd};
use crate::schedule::{Phase, Scheduler};
use crate::stats::StatsAggregator;
use crate::tracking::{LandmarkAdapter, RawDetection, SharedTracker};
use spar_schema::{BeatMap, ChallengeLevel, SessionStats};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub level: ChallengeLevel,
    pub track: BeatMap,
    /// Optional free-text hint forwarded with each suggestion fetch.
    pub steering_hint: Option<String>,
    /// Canvas dimensions in pixels.
    pub canvas: Vec2,
}

/// The per-frame game loop: fuses landmark observations, the combination
/// source and the playback clock into live targets, hit events and stats.
/// Everything runs on the caller's single logical thread.
pub struct Session {
    config: SessionConfig,
    tracker: SharedTracker,
    scheduler: Scheduler,
    adapter: LandmarkAdapter,
    detector: HitDetector,
    stats: StatsAggregator,
    hits: HitQueue,
    clock: PlaybackClock,
    playback_pos: Arc<AtomicF64>,
    error: Option<SessionError>,
}

impl Session {
    /// The track decides the mode: a choreographed punch list runs
    /// scripted; an empty one needs a suggestion client.
    pub fn new(
        config: SessionConfig,
        tracker: SharedTracker,
        client: Option<Box<dyn SuggestionClient>>,
    ) -> Result<Self, SessionError> {
        let scheduler = if config.track.is_scripted() {
            Scheduler::scripted(&config.track)
        } else {
            let client = client.ok_or_else(|| {
                SessionError::SuggestionFailed("no suggestion client configured".to_string())
            })?;
            let source = GeneratedSource::new(
                client,
                config.level.complexity(),
                config.steering_hint.clone(),
            );
            Scheduler::generated(source, config.level)
        };

        let playback_pos = Arc::new(AtomicF64::new(0.0));
        let clock = PlaybackClock::new(playback_pos.clone());
        Ok(Self {
            config,
            tracker,
            scheduler,
            adapter: LandmarkAdapter::new(),
            detector: HitDetector::new(),
            stats: StatsAggregator::new(),
            hits: HitQueue::new(),
            clock,
            playback_pos,
            error: None,
        })
    }

    /// The shared playback position; the external audio collaborator
    /// writes the current position in seconds into it.
    pub fn playback_position(&self) -> Arc<AtomicF64> {
        self.playback_pos.clone()
    }

    pub fn start(&mut self, now: f64) -> Result<(), SessionError> {
        if !self.tracker.lock().is_ready() {
            return Err(SessionError::TrackerUnavailable(
                "hand tracker is closed".to_string(),
            ));
        }
        self.error = None;
        self.stats.reset();
        self.adapter.reset();
        self.detector.reset();
        self.hits.drain();
        self.clock.resume(now);
        self.clock.update(now);
        self.scheduler.start(now);
        Ok(())
    }

    /// One frame tick: clock snapshot, scheduler advancement, landmark
    /// gating, hit detection, stat application. Returns the draw list.
    /// A fatal condition is stored and surfaced as `Err` from then on.
    pub fn frame(
        &mut self,
        raw: Option<&RawDetection>,
        now: f64,
    ) -> Result<Vec<DrawCmd>, SessionError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }

        self.clock.update(now);
        let beat = self
            .config
            .track
            .is_scripted()
            .then(|| self.config.track.beat_at(self.clock.position(now)));

        let snapshot = self.stats.snapshot();
        let accuracy = (snapshot.punches > 0).then_some(snapshot.accuracy);
        if let Err(e) = self.scheduler.tick(now, beat, accuracy) {
            self.error = Some(e.clone());
            return Err(e);
        }

        let observations = raw
            .and_then(|r| self.adapter.ingest(r))
            .unwrap_or_default();

        if !self.scheduler.is_paused() {
            let hits = self.detector.detect(
                &observations,
                self.scheduler.live_targets_mut(),
                self.config.canvas,
                now,
            );
            for hit in hits {
                self.hits.push(hit);
            }
            while let Some(hit) = self.hits.pop() {
                self.stats.apply(&hit);
                self.scheduler.on_hit(hit.target_id, now);
            }
        }

        Ok(render_frame(
            self.scheduler.phase(),
            self.scheduler.live_targets(),
            &observations,
            self.config.canvas,
        ))
    }

    /// Reports a failed external collaborator, e.g. the camera stream
    /// ending or the hand tracker going away mid-session. The session
    /// becomes terminal and every later frame surfaces the error.
    pub fn report_failure(&mut self, error: SessionError) {
        self.scheduler.fail();
        self.error = Some(error);
    }

    pub fn pause(&mut self, now: f64) {
        self.scheduler.pause();
        self.clock.pause(now);
    }

    pub fn resume(&mut self, now: f64) {
        self.clock.resume(now);
        self.scheduler.resume(now);
    }

    /// Tears the session down and hands out the final stats for the
    /// persistence collaborator.
    pub fn stop(&mut self) -> SessionStats {
        self.scheduler.stop();
        self.adapter.reset();
        self.hits.drain();
        self.stats.finish()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    pub fn scripted_finished(&self) -> bool {
        self.scheduler.scripted_finished()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }
}
