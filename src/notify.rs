use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::YearMonth;

const CHANNEL_CAPACITY: usize = 64;

/// What a calendar UI needs to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A fetch was applied; selections made against older data are stale.
    MonthReplaced { month: YearMonth, generation: u64 },
    /// A booking request reached the collaborator.
    Submitted { request_id: Ulid },
}

/// Broadcast hub for view events per trainer.
pub struct ViewHub {
    channels: DashMap<Ulid, broadcast::Sender<ViewEvent>>,
}

impl Default for ViewHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a trainer. Creates the channel if needed.
    pub fn subscribe(&self, trainer_id: Ulid) -> broadcast::Receiver<ViewEvent> {
        let sender = self
            .channels
            .entry(trainer_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event. No-op if nobody is listening.
    pub fn send(&self, trainer_id: Ulid, event: ViewEvent) {
        if let Some(sender) = self.channels.get(&trainer_id) {
            let _ = sender.send(event);
        }
    }

    pub fn remove(&self, trainer_id: &Ulid) {
        self.channels.remove(trainer_id);
    }
}
