//! Cover readiness notifications
//!
//! Observers subscribe directly on the orchestrator instead of listening
//! on a global event bus: either for one document id or as a wildcard.
//! A [`CoverReady`] event lets the UI repaint a single card without
//! re-scanning the whole batch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Per-document readiness event: a PDF thumbnail became renderable.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverReady {
    pub id: String,
    pub thumbnail_uri: String,
}

type Listener = Arc<dyn Fn(&CoverReady) + Send + Sync>;

#[derive(Default)]
struct Registry {
    wildcard: Vec<Listener>,
    by_id: HashMap<String, Vec<Listener>>,
}

/// Subscription registry for [`CoverReady`] events.
#[derive(Clone, Default)]
pub struct CoverEvents {
    registry: Arc<RwLock<Registry>>,
}

impl CoverEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for every document's readiness.
    pub fn subscribe(&self, listener: impl Fn(&CoverReady) + Send + Sync + 'static) {
        self.registry.write().wildcard.push(Arc::new(listener));
    }

    /// Listen for a single document id.
    pub fn subscribe_id(
        &self,
        id: impl Into<String>,
        listener: impl Fn(&CoverReady) + Send + Sync + 'static,
    ) {
        self.registry
            .write()
            .by_id
            .entry(id.into())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Dispatch an event to wildcard listeners and listeners registered
    /// for its id. Listeners are cloned out before invocation so a
    /// listener may subscribe without deadlocking.
    pub fn emit(&self, event: &CoverReady) {
        let listeners: Vec<Listener> = {
            let registry = self.registry.read();
            registry
                .wildcard
                .iter()
                .chain(registry.by_id.get(&event.id).into_iter().flatten())
                .cloned()
                .collect()
        };
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn event(id: &str) -> CoverReady {
        CoverReady {
            id: id.to_string(),
            thumbnail_uri: format!("blob:thumb-{}", id),
        }
    }

    #[test]
    fn test_wildcard_sees_every_event() {
        let events = CoverEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        events.subscribe(move |e| sink.lock().push(e.id.clone()));

        events.emit(&event("a"));
        events.emit(&event("b"));

        assert_eq!(seen.lock().as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_per_id_listener_only_sees_its_document() {
        let events = CoverEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        events.subscribe_id("a", move |e| sink.lock().push(e.clone()));

        events.emit(&event("b"));
        events.emit(&event("a"));

        assert_eq!(seen.lock().as_slice(), [event("a")]);
    }

    #[test]
    fn test_listener_can_subscribe_from_callback() {
        let events = CoverEvents::new();
        let inner = events.clone();
        events.subscribe(move |_| inner.subscribe(|_| {}));
        events.emit(&event("a"));
    }
}
