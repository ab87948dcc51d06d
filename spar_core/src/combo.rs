use crossbeam_channel::{Receiver, TryRecvError};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SessionError;
use spar_schema::{BeatEvent, PunchType};

/// How many recent suggestion strings accompany a fetch as context.
pub const HISTORY_WINDOW: usize = 5;

/// Tokenizes a raw suggestion string on hyphen/comma/whitespace, drops
/// tokens outside the punch alphabet and truncates to `max_punches`.
/// Relative order of the surviving tokens is preserved.
pub fn parse_combination(raw: &str, max_punches: usize) -> Vec<PunchType> {
    raw.split(|c: char| c == '-' || c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(PunchType::from_token)
        .take(max_punches)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Most recent last, at most `HISTORY_WINDOW` entries.
    pub recent_combinations: Vec<String>,
    pub max_punches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    /// Correlates the reply with the session that issued the request.
    #[serde(skip)]
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggested_combination: String,
}

#[derive(Debug, Clone, Error)]
#[error("suggestion service error: {0}")]
pub struct SuggestError(pub String);

pub type SuggestionReply = Result<SuggestionResponse, SuggestError>;

/// Boundary to the external text-generation service. `suggest` must not
/// block; the reply arrives later on the returned channel.
pub trait SuggestionClient {
    fn suggest(&self, request: SuggestionRequest) -> Receiver<SuggestionReply>;
}

/// On-demand combination source. At most one fetch is outstanding at a
/// time; replies from a previous session generation are discarded.
pub struct GeneratedSource {
    client: Box<dyn SuggestionClient>,
    history: Vec<String>,
    current: Vec<PunchType>,
    cursor: usize,
    pending: Option<(u64, Receiver<SuggestionReply>)>,
    max_punches: usize,
    steering_hint: Option<String>,
    generation: u64,
}

impl GeneratedSource {
    pub fn new(
        client: Box<dyn SuggestionClient>,
        max_punches: usize,
        steering_hint: Option<String>,
    ) -> Self {
        Self {
            client,
            history: Vec::new(),
            current: Vec::new(),
            cursor: 0,
            pending: None,
            max_punches,
            steering_hint,
            generation: 0,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Begins one fetch unless one is already outstanding.
    pub fn request_next(&mut self, player_accuracy: Option<f64>) {
        if self.pending.is_some() {
            return;
        }
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        let request = SuggestionRequest {
            recent_combinations: self.history[start..].to_vec(),
            max_punches: self.max_punches,
            player_accuracy,
            custom_prompt: self.steering_hint.clone(),
            generation: self.generation,
        };
        debug!(
            "requesting combination (history={}, max={})",
            request.recent_combinations.len(),
            request.max_punches
        );
        let reply = self.client.suggest(request);
        self.pending = Some((self.generation, reply));
    }

    /// Polls the outstanding fetch. `Some(Ok(()))` means a fresh
    /// combination was installed; stale replies are dropped silently.
    pub fn poll(&mut self) -> Option<Result<(), SessionError>> {
        let (requested_at, reply) = self.pending.as_ref()?;
        let requested_at = *requested_at;
        let received = match reply.try_recv() {
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => None,
            Ok(reply) => Some(reply),
        };
        self.pending = None;

        // Outcomes of a superseded fetch, including its channel closing,
        // never reach the current session.
        if requested_at != self.generation {
            debug!("discarding suggestion reply from a stopped session");
            return None;
        }

        let Some(reply) = received else {
            return Some(Err(SessionError::SuggestionFailed(
                "suggestion reply channel closed".to_string(),
            )));
        };

        match reply {
            Err(e) => Some(Err(SessionError::SuggestionFailed(e.to_string()))),
            Ok(response) => {
                let parsed = parse_combination(&response.suggested_combination, self.max_punches);
                if parsed.is_empty() {
                    return Some(Err(SessionError::EmptyCombination(
                        response.suggested_combination,
                    )));
                }
                self.history.push(response.suggested_combination);
                self.current = parsed;
                self.cursor = 0;
                Some(Ok(()))
            }
        }
    }

    pub fn current_punch(&self) -> Option<PunchType> {
        self.current.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// True when there is no unconsumed punch, including before the first
    /// fetch has resolved.
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.current.len()
    }

    /// Bumps the generation so any reply still in flight is discarded on
    /// arrival, and clears consumed state for a fresh session.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.current.clear();
        self.cursor = 0;
        self.history.clear();
    }
}

/// Stateless view over a static, beat-sorted punch list. The cursor only
/// moves forward; replaying earlier beats is not supported.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    events: Vec<BeatEvent>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(events: Vec<BeatEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    /// Returns every not-yet-consumed event whose beat has arrived.
    /// Near-simultaneous events come back together in one call.
    pub fn due(&mut self, current_beat: f64) -> Vec<BeatEvent> {
        let mut out = Vec::new();
        while self.cursor < self.events.len() && self.events[self.cursor].beat <= current_beat {
            out.push(self.events[self.cursor]);
            self.cursor += 1;
        }
        out
    }

    pub fn exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// The active source for a session, fixed at configuration time.
pub enum ComboSource {
    Scripted(ScriptedSource),
    Generated(GeneratedSource),
}
