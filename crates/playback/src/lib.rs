//! Host-agnostic timeline playback engine.
//!
//! The engine advances a virtual playhead over multi-track action intervals
//! and dispatches lifecycle callbacks (`enter`/`start`/`update`/`stop`/
//! `leave`) to per-media-type [`Controller`]s. The host owns the clock: it
//! implements [`TickScheduler`] and feeds wall time into [`Engine::tick`].

pub mod action;
pub mod active;
pub mod controller;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod index;
pub mod scheduler;

pub use action::{Action, ActionId, ControllerId, Track, TrackId};
pub use controller::{
    Controller, ControllerError, ControllerRegistry, EnterParams, LeaveParams, PreloadParams,
    Preloaded, StartParams, StopParams, UpdateParams,
};
pub use emitter::{Channel, Emitter, Event, HandlerId};
pub use engine::{Engine, EngineState, MAX_PLAY_RATE, MIN_PLAY_RATE, PlayOptions};
pub use error::{EngineError, Result};
pub use scheduler::{NoopScheduler, TickHandle, TickScheduler};
