use atomic_float::AtomicF64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Tracks the audio playback position published by the external audio
/// collaborator. The collaborator writes the position into the shared
/// atomic from its own thread; the core snapshots it once per frame and
/// extrapolates with system time between snapshots.
///
/// While paused the clock reports the frozen position regardless of
/// system time. Resuming re-snapshots from the source, so scripted beat
/// math continues from wherever the audio actually is.
pub struct PlaybackClock {
    source: Arc<AtomicF64>,
    last_position: f64,
    last_update_time: f64,
    paused: bool,
}

impl PlaybackClock {
    pub fn new(source: Arc<AtomicF64>) -> Self {
        Self {
            source,
            last_position: 0.0,
            last_update_time: 0.0,
            paused: false,
        }
    }

    /// Snapshots the source position. Call once per frame tick.
    pub fn update(&mut self, current_system_time: f64) {
        if self.paused {
            return;
        }
        self.last_position = self.source.load(Ordering::Acquire);
        self.last_update_time = current_system_time;
    }

    /// Playback position in seconds, extrapolated from the last snapshot.
    pub fn position(&self, current_system_time: f64) -> f64 {
        if self.paused {
            return self.last_position;
        }
        let elapsed = current_system_time - self.last_update_time;
        self.last_position + elapsed
    }

    pub fn pause(&mut self, current_system_time: f64) {
        if self.paused {
            return;
        }
        self.last_position = self.position(current_system_time);
        self.paused = true;
    }

    pub fn resume(&mut self, current_system_time: f64) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.update(current_system_time);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
