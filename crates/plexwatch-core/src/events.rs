//! Typed signal set emitted by a stream client, and its dispatcher.
//!
//! The client does not expose an open-ended emitter; it owns an
//! [`EventBus`] restricted to the fixed signal set below. Subscribers
//! receive events in emission order, either across all signals or
//! filtered down to one.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::notification::{PlaybackNotification, PlaybackState};
use crate::state::ConnectionState;

/// Session lifecycle events derived from playback notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Playing(PlaybackNotification),
    Paused(PlaybackNotification),
    Stopped(PlaybackNotification),
    /// Reserved for servers that push progress ticks on a dedicated
    /// channel; the current notification mapping never produces it.
    Progress(PlaybackNotification),
}

impl SessionEvent {
    /// Map a notification onto its session signal.
    ///
    /// `buffering` is reported as `Playing` — it resolves within the same
    /// session quickly enough that a distinct downstream signal is not
    /// worth having. Unknown states yield `None` and are dropped.
    pub fn from_notification(notification: PlaybackNotification) -> Option<Self> {
        match notification.state {
            PlaybackState::Playing | PlaybackState::Buffering => {
                Some(Self::Playing(notification))
            }
            PlaybackState::Paused => Some(Self::Paused(notification)),
            PlaybackState::Stopped => Some(Self::Stopped(notification)),
            PlaybackState::Unknown => None,
        }
    }

    /// The notification this event carries.
    pub fn notification(&self) -> &PlaybackNotification {
        match self {
            Self::Playing(n) | Self::Paused(n) | Self::Stopped(n) | Self::Progress(n) => n,
        }
    }
}

/// Everything a client can emit, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Session(SessionEvent),
    StateChanged {
        previous: ConnectionState,
        current: ConnectionState,
    },
    Error {
        message: String,
    },
}

/// Names for the fixed signal set, used for per-signal subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    SessionPlaying,
    SessionPaused,
    SessionStopped,
    SessionProgress,
    ConnectionState,
    ConnectionError,
}

impl ClientEvent {
    pub fn signal(&self) -> Signal {
        match self {
            Self::Session(SessionEvent::Playing(_)) => Signal::SessionPlaying,
            Self::Session(SessionEvent::Paused(_)) => Signal::SessionPaused,
            Self::Session(SessionEvent::Stopped(_)) => Signal::SessionStopped,
            Self::Session(SessionEvent::Progress(_)) => Signal::SessionProgress,
            Self::StateChanged { .. } => Signal::ConnectionState,
            Self::Error { .. } => Signal::ConnectionError,
        }
    }
}

struct Subscriber {
    filter: Option<Signal>,
    sender: mpsc::UnboundedSender<ClientEvent>,
}

/// Fan-out dispatcher for the fixed signal set.
///
/// Cheap to clone; all clones share the subscriber list. Subscribers
/// whose receiver has been dropped are pruned on the next emit.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every signal, in emission order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ClientEvent> {
        self.add(None)
    }

    /// Receive only events carrying the given signal.
    pub fn subscribe_signal(&self, signal: Signal) -> mpsc::UnboundedReceiver<ClientEvent> {
        self.add(Some(signal))
    }

    fn add(&self, filter: Option<Signal>) -> mpsc::UnboundedReceiver<ClientEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap()
            .push(Subscriber { filter, sender: tx });
        rx
    }

    /// Deliver an event to every matching subscriber.
    pub fn emit(&self, event: ClientEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|sub| {
            let matches = sub.filter.map_or(true, |f| f == event.signal());
            if matches {
                sub.sender.send(event.clone()).is_ok()
            } else {
                !sub.sender.is_closed()
            }
        });
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(key: &str) -> PlaybackNotification {
        PlaybackNotification {
            session_key: Some(key.into()),
            state: PlaybackState::Playing,
            extra: Default::default(),
        }
    }

    #[test]
    fn subscribe_and_emit_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(ClientEvent::Session(SessionEvent::Playing(playing("1"))));
        bus.emit(ClientEvent::Error {
            message: "boom".into(),
        });

        assert_eq!(rx.try_recv().unwrap().signal(), Signal::SessionPlaying);
        assert_eq!(rx.try_recv().unwrap().signal(), Signal::ConnectionError);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn per_signal_subscription_filters() {
        let bus = EventBus::new();
        let mut errors = bus.subscribe_signal(Signal::ConnectionError);

        bus.emit(ClientEvent::Session(SessionEvent::Playing(playing("1"))));
        bus.emit(ClientEvent::Error {
            message: "boom".into(),
        });

        let only = errors.try_recv().unwrap();
        assert_eq!(only.signal(), Signal::ConnectionError);
        assert!(errors.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);
        assert_eq!(bus.len(), 1);

        bus.emit(ClientEvent::Error {
            message: "x".into(),
        });
        assert!(bus.is_empty());
    }

    #[test]
    fn buffering_maps_to_playing() {
        let n = PlaybackNotification {
            session_key: Some("2".into()),
            state: PlaybackState::Buffering,
            extra: Default::default(),
        };
        match SessionEvent::from_notification(n) {
            Some(SessionEvent::Playing(inner)) => {
                assert_eq!(inner.session_key.as_deref(), Some("2"))
            }
            other => panic!("expected playing, got {other:?}"),
        }
    }

    #[test]
    fn unknown_state_is_dropped() {
        let n = PlaybackNotification {
            session_key: None,
            state: PlaybackState::Unknown,
            extra: Default::default(),
        };
        assert!(SessionEvent::from_notification(n).is_none());
    }
}
