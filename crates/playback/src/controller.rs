use std::collections::HashMap;

use crate::action::{Action, ControllerId, Track};

/// Error type controllers report from `preload`.
pub type ControllerError = Box<dyn std::error::Error + Send + Sync>;

/// Context for an `enter` call: the action's interval started containing the
/// playhead.
#[derive(Debug)]
pub struct EnterParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
    pub time: f64,
}

/// Context for a `start` call: playback began while the action was active.
#[derive(Debug)]
pub struct StartParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
    pub time: f64,
}

/// Context for an `update` call, issued once per tick for each active action.
#[derive(Debug)]
pub struct UpdateParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
    pub time: f64,
}

/// Context for a `stop` call: playback paused while the action was active.
#[derive(Debug)]
pub struct StopParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
    pub time: f64,
}

/// Context for a `leave` call: the action's interval no longer contains the
/// playhead, its track was hidden, or the engine is clearing.
#[derive(Debug)]
pub struct LeaveParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
    pub time: f64,
}

/// Context for a `preload` call, issued once per action at track assignment.
#[derive(Debug)]
pub struct PreloadParams<'a> {
    pub action: &'a Action,
    pub track: &'a Track,
}

/// Result of preloading one action's resources.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Preloaded {
    /// Media duration discovered during preload; the engine stamps it onto
    /// its action snapshot when present.
    pub duration: Option<f64>,
}

/// Per-media-type capability invoked at action lifecycle transitions.
///
/// Every method has a no-op default, so a controller implements only the
/// transitions it cares about. The engine provides no cancellation token and
/// does not wait between lifecycle calls; a controller interrupted mid-enter
/// by a leave must cope with the abrupt transition itself. Controllers may
/// cache per-action resources keyed by action id; the engine never touches
/// that cache.
pub trait Controller {
    /// Called once per action before scheduling begins. Resources needed by
    /// the other callbacks should be acquired here.
    fn preload(&mut self, params: PreloadParams<'_>) -> Result<Preloaded, ControllerError> {
        let _ = params;
        Ok(Preloaded::default())
    }

    /// The playhead moved into the action's interval.
    fn enter(&mut self, params: EnterParams<'_>) {
        let _ = params;
    }

    /// Playback started (or resumed) while the action was active.
    fn start(&mut self, params: StartParams<'_>) {
        let _ = params;
    }

    /// Per-tick update for an active action.
    fn update(&mut self, params: UpdateParams<'_>) {
        let _ = params;
    }

    /// Playback paused while the action was active.
    fn stop(&mut self, params: StopParams<'_>) {
        let _ = params;
    }

    /// The playhead moved out of the action's interval.
    fn leave(&mut self, params: LeaveParams<'_>) {
        let _ = params;
    }
}

/// Caller-built mapping from controller id to controller instance.
///
/// The registry is handed to [`Engine::new`](crate::Engine::new) and owned by
/// the engine from then on; there is no ambient global registry. A track
/// referencing an unregistered controller id is scheduled normally but its
/// actions receive no callbacks.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<ControllerId, Box<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<ControllerId>, controller: Box<dyn Controller>) {
        self.controllers.insert(id.into(), controller);
    }

    /// Registers a controller and returns the registry, for chained setup.
    pub fn with(mut self, id: impl Into<ControllerId>, controller: Box<dyn Controller>) -> Self {
        self.register(id, controller);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controllers.contains_key(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Controller + 'static)> {
        self.controllers.get_mut(id).map(|boxed| boxed.as_mut())
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("ids", &self.controllers.keys())
            .finish()
    }
}
