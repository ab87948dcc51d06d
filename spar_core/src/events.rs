use crossbeam_channel::{unbounded, Receiver, Sender};

use spar_schema::PunchType;

/// One registered hit, consumed by the stats aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub target_id: u64,
    pub punch: PunchType,
    /// Session time of the registration, in seconds.
    pub timestamp: f64,
}

/// Queue between the hit detector and the stats aggregator.
pub struct HitQueue {
    sender: Sender<HitEvent>,
    receiver: Receiver<HitEvent>,
}

impl HitQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn push(&self, event: HitEvent) {
        let _ = self.sender.send(event);
    }

    /// Non-blocking. Returns None if the queue is empty.
    pub fn pop(&self) -> Option<HitEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn drain(&self) {
        while self.pop().is_some() {}
    }
}

impl Default for HitQueue {
    fn default() -> Self {
        Self::new()
    }
}
