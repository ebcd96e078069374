use std::collections::HashMap;

use tracing::trace;

/// Named event channels published by the engine.
///
/// The set is closed at compile time, so subscribing to or triggering an
/// unknown channel cannot happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Fires before an explicit seek; handlers may veto the seek.
    BeforeSetTime,
    /// Fires after an explicit seek was applied.
    AfterSetTime,
    /// Fires after a tick-driven time advance (never vetoable).
    SetTimeByTick,
    /// Fires before a play-rate change; handlers may veto the change.
    BeforeSetPlayRate,
    /// Fires after a play-rate change was applied.
    AfterSetPlayRate,
    /// Fires when playback starts.
    Play,
    /// Fires when playback pauses.
    Paused,
    /// Fires when playback reached its end.
    Ended,
}

/// Event payloads delivered to channel handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    BeforeSetTime { time: f64 },
    AfterSetTime { time: f64 },
    SetTimeByTick { time: f64 },
    BeforeSetPlayRate { rate: f64 },
    AfterSetPlayRate { rate: f64 },
    Play,
    Paused,
    Ended,
}

impl Event {
    /// Returns the channel this event is published on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::BeforeSetTime { .. } => Channel::BeforeSetTime,
            Self::AfterSetTime { .. } => Channel::AfterSetTime,
            Self::SetTimeByTick { .. } => Channel::SetTimeByTick,
            Self::BeforeSetPlayRate { .. } => Channel::BeforeSetPlayRate,
            Self::AfterSetPlayRate { .. } => Channel::AfterSetPlayRate,
            Self::Play => Channel::Play,
            Self::Paused => Channel::Paused,
            Self::Ended => Channel::Ended,
        }
    }
}

/// Identifier returned by [`Emitter::on`], used to remove a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&Event) -> bool>;

/// Publish/subscribe registry with veto semantics.
///
/// Handlers run in registration order. [`Emitter::trigger`] reduces their
/// results with all-of: every handler runs even after a veto, and the trigger
/// reports `false` as soon as any single handler returned `false`. The
/// `Before*` channels use this to gate the corresponding state change.
///
/// # Example
/// ```
/// use playback::{Channel, Emitter, Event};
///
/// let mut emitter = Emitter::new();
/// emitter.on(Channel::BeforeSetTime, |_event| false);
/// assert!(!emitter.trigger(&Event::BeforeSetTime { time: 3.0 }));
/// ```
#[derive(Default)]
pub struct Emitter {
    handlers: HashMap<Channel, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl Emitter {
    /// Creates an emitter with no handlers registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler on `channel` and returns its removal id.
    ///
    /// A handler vetoes the triggering operation by returning `false`.
    pub fn on(
        &mut self,
        channel: Channel,
        handler: impl FnMut(&Event) -> bool + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(channel)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Removes one handler from `channel`. Returns false when the id was not
    /// registered there.
    pub fn off(&mut self, channel: Channel, handler: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&channel) else {
            return false;
        };
        let Some(index) = list.iter().position(|(id, _)| *id == handler) else {
            return false;
        };
        list.remove(index);
        true
    }

    /// Removes every handler from `channel`.
    pub fn clear_channel(&mut self, channel: Channel) {
        if let Some(list) = self.handlers.get_mut(&channel) {
            list.clear();
        }
    }

    /// Removes every handler from every channel.
    pub fn off_all(&mut self) {
        self.handlers.clear();
    }

    /// Invokes every handler registered for the event's channel, in
    /// registration order, and returns `true` only if none of them vetoed.
    pub fn trigger(&mut self, event: &Event) -> bool {
        let channel = event.channel();
        let Some(list) = self.handlers.get_mut(&channel) else {
            return true;
        };
        trace!(?channel, handler_count = list.len(), "trigger");

        let mut accepted = true;
        for (_, handler) in list.iter_mut() {
            accepted = handler(event) && accepted;
        }
        accepted
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("channels", &self.handlers.keys())
            .finish()
    }
}
