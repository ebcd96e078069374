use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Opaque identifier for timed actions.
pub type ActionId = String;
/// Opaque identifier for tracks.
pub type TrackId = String;
/// Identifier naming a registered controller, e.g. `"audio"` or `"video"`.
pub type ControllerId = String;

/// A single timed interval scheduled by the engine.
///
/// `start` and `end` are seconds on the virtual timeline, with `end > start`
/// enforced at construction. The engine snapshots actions when tracks are
/// assigned, so later caller-side mutation has no effect until the next
/// [`set_tracks`](crate::Engine::set_tracks).
///
/// # Example
/// ```
/// use playback::Action;
///
/// let action = Action::new("intro", 0.0, 2.5).expect("valid interval");
/// assert!(action.contains(1.0));
/// assert!(!action.contains(2.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub start: f64,
    pub end: f64,
    /// Disabled actions are skipped by scheduling entirely.
    #[serde(default)]
    pub disable: bool,
    /// UI selection flag, passed through opaquely.
    #[serde(default)]
    pub selected: bool,
    /// Media duration stamped by a controller's preload step, when reported.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Action {
    /// Creates a validated action.
    pub fn new(id: impl Into<ActionId>, start: f64, end: f64) -> Result<Self> {
        let id = id.into();
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(EngineError::InvalidActionInterval {
                action_id: id,
                start,
                end,
            });
        }
        Ok(Self {
            id,
            start,
            end,
            disable: false,
            selected: false,
            duration: None,
        })
    }

    /// Marks the action as disabled.
    pub fn disabled(mut self) -> Self {
        self.disable = true;
        self
    }

    /// Marks the action as selected.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Returns true when `time` lies inside the half-open interval
    /// `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// A named ordered group of actions sharing one controller and a visibility
/// flag. A hidden track's actions are treated as inactive regardless of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub controller_id: ControllerId,
    #[serde(default)]
    pub hidden: bool,
    pub actions: Vec<Action>,
}

impl Track {
    /// Creates an empty visible track.
    pub fn new(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        controller_id: impl Into<ControllerId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            controller_id: controller_id.into(),
            hidden: false,
            actions: Vec::new(),
        }
    }

    /// Appends an action to the track.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Marks the track as hidden.
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }
}
