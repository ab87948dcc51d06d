use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use spar_schema::Handedness;

/// Landmark indices per the MediaPipe hand landmarker convention.
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;
}

pub const LANDMARK_COUNT: usize = 21;

/// Bone topology for the skeleton overlay, as landmark index pairs.
pub const SKELETON_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4), // thumb
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8), // index
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12), // middle
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16), // ring
    (13, 17),
    (17, 18),
    (18, 19),
    (19, 20), // pinky
    (0, 17),
];

/// One hand as reported by the external landmark detector, points in
/// normalized video space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHand {
    pub handedness: Handedness,
    pub points: Vec<Vec2>,
}

/// The detector's output for one video frame. `timestamp` identifies the
/// underlying frame; a repeated timestamp means the video has not advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub timestamp: f64,
    pub hands: Vec<RawHand>,
}

/// A validated per-frame hand record. Not retained beyond the frame that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub points: Vec<Vec2>,
}

impl HandObservation {
    /// The designated tracking point used for hit detection.
    pub fn tracking_point(&self) -> Option<Vec2> {
        self.points.get(landmarks::WRIST).copied()
    }
}

/// Gates raw detections so each distinct video frame is processed at most
/// once. A stalled frame yields `None` and must simply be re-polled next
/// tick.
#[derive(Debug, Default)]
pub struct LandmarkAdapter {
    last_timestamp: Option<f64>,
}

impl LandmarkAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, raw: &RawDetection) -> Option<Vec<HandObservation>> {
        if self.last_timestamp == Some(raw.timestamp) {
            return None;
        }
        self.last_timestamp = Some(raw.timestamp);

        let observations = raw
            .hands
            .iter()
            .filter(|hand| {
                if hand.points.len() != LANDMARK_COUNT {
                    warn!(
                        "dropping {:?} hand with {} landmarks (expected {})",
                        hand.handedness,
                        hand.points.len(),
                        LANDMARK_COUNT
                    );
                    return false;
                }
                true
            })
            .map(|hand| HandObservation {
                handedness: hand.handedness,
                points: hand.points.clone(),
            })
            .collect();
        Some(observations)
    }

    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub model_path: String,
    pub num_hands: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            model_path: "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task".to_string(),
            num_hands: 2,
        }
    }
}

/// Owned handle for the expensive landmark-detector resource. Initialized
/// once, reused across session restarts, torn down with `close` at
/// application shutdown. The detection itself happens in the external
/// collaborator; this handle only carries its lifecycle.
#[derive(Debug)]
pub struct TrackerHandle {
    config: TrackerConfig,
    ready: bool,
}

/// The handle outlives any one session; the host application holds it and
/// hands sessions a shared reference.
pub type SharedTracker = std::sync::Arc<parking_lot::Mutex<TrackerHandle>>;

impl TrackerHandle {
    pub fn into_shared(self) -> SharedTracker {
        std::sync::Arc::new(parking_lot::Mutex::new(self))
    }

    pub fn init(config: TrackerConfig) -> Result<Self, SessionError> {
        if config.model_path.is_empty() {
            return Err(SessionError::TrackerUnavailable(
                "no landmark model configured".to_string(),
            ));
        }
        if config.num_hands == 0 {
            return Err(SessionError::TrackerUnavailable(
                "tracker must detect at least one hand".to_string(),
            ));
        }
        Ok(Self {
            config,
            ready: true,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn close(&mut self) {
        self.ready = false;
    }
}
