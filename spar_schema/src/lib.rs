use serde::{Deserialize, Serialize};

/// Left/right label shared by detected hands and punch requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// The six-punch alphabet. Serialized as the numeric tokens used by beat
/// maps and combination strings ('1' = Jab .. '6' = Right Uppercut).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunchType {
    #[serde(rename = "1")]
    Jab,
    #[serde(rename = "2")]
    Cross,
    #[serde(rename = "3")]
    LeftHook,
    #[serde(rename = "4")]
    RightHook,
    #[serde(rename = "5")]
    LeftUppercut,
    #[serde(rename = "6")]
    RightUppercut,
}

impl PunchType {
    pub const ALL: [PunchType; 6] = [
        PunchType::Jab,
        PunchType::Cross,
        PunchType::LeftHook,
        PunchType::RightHook,
        PunchType::LeftUppercut,
        PunchType::RightUppercut,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" => Some(PunchType::Jab),
            "2" => Some(PunchType::Cross),
            "3" => Some(PunchType::LeftHook),
            "4" => Some(PunchType::RightHook),
            "5" => Some(PunchType::LeftUppercut),
            "6" => Some(PunchType::RightUppercut),
            _ => None,
        }
    }

    pub fn token(self) -> char {
        match self {
            PunchType::Jab => '1',
            PunchType::Cross => '2',
            PunchType::LeftHook => '3',
            PunchType::RightHook => '4',
            PunchType::LeftUppercut => '5',
            PunchType::RightUppercut => '6',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PunchType::Jab => "Jab",
            PunchType::Cross => "Cross",
            PunchType::LeftHook => "Left Hook",
            PunchType::RightHook => "Right Hook",
            PunchType::LeftUppercut => "Left Uppercut",
            PunchType::RightUppercut => "Right Uppercut",
        }
    }

    pub fn hand(self) -> Handedness {
        match self {
            PunchType::Jab | PunchType::LeftHook | PunchType::LeftUppercut => Handedness::Left,
            PunchType::Cross | PunchType::RightHook | PunchType::RightUppercut => Handedness::Right,
        }
    }
}

pub const TARGET_RADIUS: f32 = 60.0;

/// Static target geometry: position as a fraction of canvas width/height,
/// radius in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Exhaustive over the punch alphabet; never fails.
pub fn target_spec(punch: PunchType) -> TargetSpec {
    let (x, y) = match punch {
        PunchType::Jab => (0.6, 0.4),
        PunchType::Cross => (0.4, 0.4),
        PunchType::LeftHook => (0.75, 0.5),
        PunchType::RightHook => (0.25, 0.5),
        PunchType::LeftUppercut => (0.55, 0.65),
        PunchType::RightUppercut => (0.45, 0.65),
    };
    TargetSpec {
        x,
        y,
        radius: TARGET_RADIUS,
    }
}

/// A single choreographed punch, positioned in beats from track start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatEvent {
    pub beat: f64,
    #[serde(rename = "type")]
    pub punch: PunchType,
}

/// A music track with an optional choreographed punch timeline. An empty
/// `punches` list marks an AI-driven track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatMap {
    pub name: String,
    pub src: String,
    pub bpm: f64,
    /// Seconds between playback start and beat zero.
    pub offset: f64,
    #[serde(default)]
    pub punches: Vec<BeatEvent>,
}

impl BeatMap {
    pub fn is_scripted(&self) -> bool {
        !self.punches.is_empty()
    }

    /// Converts a playback position in seconds to a beat position.
    pub fn beat_at(&self, playback_secs: f64) -> f64 {
        (playback_secs - self.offset) * self.bpm / 60.0
    }

    /// Beat events must be sorted ascending for the scheduler's monotonic
    /// cursor to be valid.
    pub fn is_sorted(&self) -> bool {
        self.punches.windows(2).all(|w| w[0].beat <= w[1].beat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeLevel {
    Easy,
    Medium,
    Hard,
}

impl ChallengeLevel {
    /// Delay between finishing one combination and fetching the next.
    pub fn think_time_secs(self) -> f64 {
        match self {
            ChallengeLevel::Easy => 1.5,
            ChallengeLevel::Medium => 1.0,
            ChallengeLevel::Hard => 0.7,
        }
    }

    /// Maximum punches per suggested combination.
    pub fn complexity(self) -> usize {
        match self {
            ChallengeLevel::Easy => 3,
            ChallengeLevel::Medium => 5,
            ChallengeLevel::Hard => 7,
        }
    }
}

/// Rolling statistics for one session. Reset at session start, handed to
/// the persistence collaborator at stop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub score: u32,
    pub punches: u32,
    /// Percentage of registered attempts that were hits, 0-100.
    pub accuracy: f64,
    pub streak: u32,
    pub best_streak: u32,
    /// Mean interval between consecutive hits, in seconds.
    pub avg_speed: f64,
}

/// Lifetime totals persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeStats {
    pub score: u32,
    pub punches: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    pub avg_speed: f64,
}
