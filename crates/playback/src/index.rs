use std::collections::HashMap;

use tracing::debug;

use crate::action::{Action, ActionId, Track, TrackId};
use crate::error::{EngineError, Result};

/// Time-sorted view over every action of an assigned track list.
///
/// Built once per [`set_tracks`](crate::Engine::set_tracks) call: all tracks'
/// actions are flattened into one id sequence sorted ascending by start time
/// (the sort is stable, so actions with identical starts keep their track
/// enumeration order), with reverse lookups from action id to the action
/// snapshot and its owning track.
#[derive(Debug, Default)]
pub struct ActionIndex {
    actions: HashMap<ActionId, Action>,
    owner: HashMap<ActionId, TrackId>,
    tracks: HashMap<TrackId, Track>,
    sorted_ids: Vec<ActionId>,
}

impl ActionIndex {
    /// Builds the index from a track list, snapshotting every action.
    ///
    /// Action ids must be unique across all tracks.
    pub fn build(tracks: &[Track]) -> Result<Self> {
        let mut index = Self::default();

        let mut entries: Vec<&Action> = Vec::new();
        for track in tracks {
            for action in &track.actions {
                if index.owner.contains_key(&action.id) {
                    return Err(EngineError::DuplicateActionId {
                        action_id: action.id.clone(),
                    });
                }
                index.owner.insert(action.id.clone(), track.id.clone());
                entries.push(action);
            }
            let mut snapshot = track.clone();
            snapshot.actions.clear();
            index.tracks.insert(track.id.clone(), snapshot);
        }

        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        for action in entries {
            index.sorted_ids.push(action.id.clone());
            index.actions.insert(action.id.clone(), action.clone());
        }

        debug!(
            track_count = tracks.len(),
            action_count = index.sorted_ids.len(),
            "action index built"
        );
        Ok(index)
    }

    /// Returns the snapshot of one action.
    pub fn action_at(&self, action_id: &str) -> Option<&Action> {
        self.actions.get(action_id)
    }

    pub(crate) fn action_at_mut(&mut self, action_id: &str) -> Option<&mut Action> {
        self.actions.get_mut(action_id)
    }

    /// Returns the track owning one action.
    pub fn track_of(&self, action_id: &str) -> Option<&Track> {
        let track_id = self.owner.get(action_id)?;
        self.tracks.get(track_id)
    }

    /// Returns one track by id.
    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    pub(crate) fn track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.get_mut(track_id)
    }

    /// Action ids sorted ascending by start time.
    pub fn sorted_ids(&self) -> &[ActionId] {
        &self.sorted_ids
    }

    /// Number of indexed actions.
    pub fn count(&self) -> usize {
        self.sorted_ids.len()
    }

    /// Largest action end across the index, or 0 when empty.
    pub fn duration(&self) -> f64 {
        self.actions
            .values()
            .map(|action| action.end)
            .fold(0.0, f64::max)
    }
}
