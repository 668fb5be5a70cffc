use std::sync::{Arc, Mutex};

use practice_core::model::{GateState, StreakState, Tier};

use crate::session_tracker::SessionProgress;

/// Typed events the engine emits for rendering code to consume.
///
/// One internal bus replaces scattered auth-change and storage-event
/// listeners; components publish here and subscribers render.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    AuthChanged { signed_in: bool },
    TierChanged { tier: Tier },
    SessionUpdated { progress: SessionProgress },
    GateChanged { state: GateState },
    StreakUpdated { streak: StreakState },
}

type Subscriber = Box<dyn Fn(&EngineEvent) + Send + Sync>;

/// Subscriber registry for [`EngineEvent`]s.
///
/// Emission is synchronous on the calling thread; subscribers must not
/// block. A poisoned registry drops the emit rather than propagating.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&EngineEvent) + Send + Sync + 'static) {
        if let Ok(mut guard) = self.subscribers.lock() {
            guard.push(Box::new(subscriber));
        }
    }

    pub fn emit(&self, event: &EngineEvent) {
        if let Ok(guard) = self.subscribers.lock() {
            for subscriber in guard.iter() {
                subscriber(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| {
                if matches!(event, EngineEvent::AuthChanged { signed_in: true }) {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        bus.emit(&EngineEvent::AuthChanged { signed_in: true });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
