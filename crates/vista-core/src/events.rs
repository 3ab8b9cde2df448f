//! Inbound media events and outbound player notifications
//!
//! Media events come from the host's video element and are dispatched into
//! the controller. Notifications flow the other way, to subscribers
//! registered on the [`EventBus`].

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Lifecycle events reported by the video element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    Play,
    Pause,
    CanPlay,
    CanPlayThrough,
    Playing,
    Stalled,
    Waiting,
    Error,
    Seeking,
    Progress,
    TimeUpdate,
    Ended,
    VolumeChange,
    LoadedData,
    LoadedMetadata,
}

impl MediaEvent {
    /// Every event the controller listens for
    pub const ALL: [MediaEvent; 15] = [
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::CanPlay,
        MediaEvent::CanPlayThrough,
        MediaEvent::Playing,
        MediaEvent::Stalled,
        MediaEvent::Waiting,
        MediaEvent::Error,
        MediaEvent::Seeking,
        MediaEvent::Progress,
        MediaEvent::TimeUpdate,
        MediaEvent::Ended,
        MediaEvent::VolumeChange,
        MediaEvent::LoadedData,
        MediaEvent::LoadedMetadata,
    ];

    /// DOM event type name
    pub fn dom_name(&self) -> &'static str {
        match self {
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::CanPlayThrough => "canplaythrough",
            MediaEvent::Playing => "playing",
            MediaEvent::Stalled => "stalled",
            MediaEvent::Waiting => "waiting",
            MediaEvent::Error => "error",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Progress => "progress",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::Ended => "ended",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::LoadedData => "loadeddata",
            MediaEvent::LoadedMetadata => "loadedmetadata",
        }
    }

    pub fn from_dom_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.dom_name() == name)
    }
}

impl std::fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dom_name())
    }
}

/// Inferred playback health. There are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferHealth {
    Buffered,
    Buffering,
}

/// Notifications emitted towards the embedding page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PlayerEvent {
    SceneLoaded(usize),
    NextLoaded,
    PrevLoaded,
    Buffered,
    Buffering,
    Stop,
}

impl PlayerEvent {
    /// Event name as seen by the host page
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::SceneLoaded(_) => "scene_loaded",
            PlayerEvent::NextLoaded => "next_loaded",
            PlayerEvent::PrevLoaded => "prev_loaded",
            PlayerEvent::Buffered => "buffered",
            PlayerEvent::Buffering => "buffering",
            PlayerEvent::Stop => "stop",
        }
    }

    /// Scene id carried by `scene_loaded`
    pub fn scene_id(&self) -> Option<usize> {
        match self {
            PlayerEvent::SceneLoaded(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<BufferHealth> for PlayerEvent {
    fn from(health: BufferHealth) -> Self {
        match health {
            BufferHealth::Buffered => PlayerEvent::Buffered,
            BufferHealth::Buffering => PlayerEvent::Buffering,
        }
    }
}

impl std::fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerEvent::SceneLoaded(id) => write!(f, "scene_loaded({})", id),
            other => f.write_str(other.name()),
        }
    }
}

/// Receives player notifications
pub trait PlayerObserver {
    fn notify(&mut self, event: &PlayerEvent);
}

impl<F> PlayerObserver for F
where
    F: FnMut(&PlayerEvent),
{
    fn notify(&mut self, event: &PlayerEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of notifications to registered observers, in subscription order
#[derive(Default)]
pub struct EventBus {
    observers: Vec<(SubscriptionId, Box<dyn PlayerObserver>)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl PlayerObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        trace!(event = %event, observers = self.observers.len(), "Emitting notification");
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dom_names_round_trip() {
        for event in MediaEvent::ALL {
            assert_eq!(MediaEvent::from_dom_name(event.dom_name()), Some(event));
        }
        assert_eq!(MediaEvent::from_dom_name("suspend"), None);
    }

    #[test]
    fn test_bus_delivers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe(move |e: &PlayerEvent| first.borrow_mut().push(("a", *e)));
        let second = Rc::clone(&seen);
        bus.subscribe(move |e: &PlayerEvent| second.borrow_mut().push(("b", *e)));

        bus.emit(PlayerEvent::SceneLoaded(3));

        assert_eq!(
            *seen.borrow(),
            vec![("a", PlayerEvent::SceneLoaded(3)), ("b", PlayerEvent::SceneLoaded(3))]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_: &PlayerEvent| *c.borrow_mut() += 1);

        bus.emit(PlayerEvent::Stop);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(PlayerEvent::Stop);

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_notification_json() {
        let json = serde_json::to_string(&PlayerEvent::SceneLoaded(2)).unwrap();
        assert_eq!(json, r#"{"type":"scene_loaded","id":2}"#);
        assert_eq!(PlayerEvent::Buffering.name(), "buffering");
        assert_eq!(PlayerEvent::SceneLoaded(1).to_string(), "scene_loaded(1)");
    }
}
