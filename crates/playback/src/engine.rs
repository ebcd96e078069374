use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::{Action, ActionId, Track};
use crate::active::ActiveSet;
use crate::controller::{
    ControllerRegistry, EnterParams, LeaveParams, PreloadParams, StartParams, StopParams,
    UpdateParams,
};
use crate::emitter::{Channel, Emitter, Event, HandlerId};
use crate::error::{EngineError, Result};
use crate::index::ActionIndex;
use crate::scheduler::{TickHandle, TickScheduler};

/// Smallest accepted playback rate.
pub const MIN_PLAY_RATE: f64 = -3.0;
/// Largest accepted playback rate.
pub const MAX_PLAY_RATE: f64 = 3.0;

/// Longest wall-clock gap integrated by a single tick, in seconds. Gaps
/// beyond this (for example after a host suspend) are clamped instead of
/// fast-forwarding the timeline.
const MAX_TICK_DELTA: f64 = 1.0;

/// Authoritative engine state.
///
/// `Playing` and `Paused` are mutually exclusive; `Loading` only exists
/// before the first successful track assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Loading,
    Ready,
    Playing,
    Paused,
}

/// Options accepted by [`Engine::play`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// Absolute time at which playback stops. Takes priority over
    /// `auto_end`.
    pub to_time: Option<f64>,
    /// Whether playback ends automatically once every action has been
    /// scheduled and left.
    pub auto_end: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            to_time: None,
            auto_end: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Start,
    Stop,
}

/// Time-driven scheduler for multi-track timelines.
///
/// The engine owns the current time, play rate, and play state, and drives
/// per-action lifecycle callbacks (`enter`/`start`/`update`/`stop`/`leave`)
/// on the controllers registered for each track. It never touches a clock
/// itself: the host requests ticks through the injected [`TickScheduler`]
/// and feeds wall time into [`Engine::tick`].
///
/// # Example
/// ```
/// use playback::{
///     Action, ControllerRegistry, Engine, NoopScheduler, PlayOptions, Track,
/// };
///
/// let track = Track::new("t1", "demo", "null")
///     .with_action(Action::new("a", 0.0, 2.0).expect("valid interval"));
/// let mut engine = Engine::new(ControllerRegistry::new(), NoopScheduler::new());
/// engine.set_tracks(&[track]).expect("tracks should load");
///
/// assert!(engine.play(PlayOptions::default()));
/// let mut now = 0.0;
/// while engine.is_playing() {
///     engine.tick(now);
///     now += 1.0 / 60.0;
/// }
/// assert!(engine.is_paused());
/// ```
#[derive(Debug)]
pub struct Engine<S> {
    scheduler: S,
    controllers: ControllerRegistry,
    emitter: Emitter,
    index: ActionIndex,
    active: ActiveSet,
    state: EngineState,
    current_time: f64,
    play_rate: f64,
    prev_tick: Option<f64>,
    tick_handle: Option<TickHandle>,
    play_options: PlayOptions,
}

impl<S> Engine<S>
where
    S: TickScheduler,
{
    /// Creates an engine with a caller-built controller registry and tick
    /// scheduler. The engine stays in `Loading` until the first successful
    /// [`set_tracks`](Engine::set_tracks).
    pub fn new(controllers: ControllerRegistry, scheduler: S) -> Self {
        Self {
            scheduler,
            controllers,
            emitter: Emitter::new(),
            index: ActionIndex::default(),
            active: ActiveSet::new(),
            state: EngineState::Loading,
            current_time: 0.0,
            play_rate: 1.0,
            prev_tick: None,
            tick_handle: None,
            play_options: PlayOptions::default(),
        }
    }

    /// Assigns the full track list, replacing any previous assignment.
    ///
    /// Actions are snapshotted into the engine's own index (sorted by start
    /// time), each action is preloaded through its controller, every
    /// previously active action is forcibly left, and the enter scan re-runs
    /// at the current time. Incremental single-action mutation is not
    /// supported; resubmit the list instead.
    pub fn set_tracks(&mut self, tracks: &[Track]) -> Result<()> {
        if self.is_playing() {
            self.pause();
        }

        let mut index = ActionIndex::build(tracks)?;
        self.preload(&mut index)?;

        self.deal_clear();
        self.index = index;
        if self.state == EngineState::Loading {
            self.state = EngineState::Ready;
        }
        self.deal_enter(self.current_time);

        info!(
            track_count = tracks.len(),
            action_count = self.index.count(),
            time = self.current_time,
            "tracks assigned"
        );
        Ok(())
    }

    /// Starts playback from the current time.
    ///
    /// Returns `false` without changing state when already playing, when
    /// `to_time` is not ahead of the current time, or before tracks were
    /// assigned. On success every currently active action receives `start`,
    /// the `Play` event fires, and the first tick is scheduled.
    pub fn play(&mut self, options: PlayOptions) -> bool {
        if self.state == EngineState::Loading {
            warn!("play requested before tracks were assigned");
            return false;
        }
        if self.is_playing() {
            return false;
        }
        if let Some(to_time) = options.to_time {
            if to_time <= self.current_time {
                debug!(to_time, time = self.current_time, "play rejected: target not ahead");
                return false;
            }
        }

        self.play_options = options;
        self.state = EngineState::Playing;
        self.start_or_stop(Bracket::Start);
        self.emitter.trigger(&Event::Play);

        self.prev_tick = None;
        self.tick_handle = Some(self.scheduler.schedule());
        info!(time = self.current_time, rate = self.play_rate, "playing");
        true
    }

    /// Pauses playback and cancels the scheduled tick.
    ///
    /// Returns `false` when the engine was not playing. On success every
    /// active action receives `stop` and the `Paused` event fires.
    pub fn pause(&mut self) -> bool {
        if self.state == EngineState::Loading {
            warn!("pause requested before tracks were assigned");
            return false;
        }

        let was_playing = self.is_playing();
        if was_playing {
            self.state = EngineState::Paused;
            self.start_or_stop(Bracket::Stop);
            self.emitter.trigger(&Event::Paused);
            info!(time = self.current_time, "paused");
        }
        if let Some(handle) = self.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
        was_playing
    }

    /// Seeks to `time`.
    ///
    /// Gated by the vetoable `BeforeSetTime` event; returns `false` when a
    /// handler vetoed. Seeking backward rewinds the scan cursor so earlier
    /// actions are rediscovered. Emits `AfterSetTime` on success.
    pub fn set_time(&mut self, time: f64) -> bool {
        self.apply_time(time, false)
    }

    /// Current playhead time in seconds.
    pub fn get_time(&self) -> f64 {
        self.current_time
    }

    /// Sets the playback rate.
    ///
    /// A rate is accepted iff it is finite, non-zero, and within
    /// [`MIN_PLAY_RATE`]..=[`MAX_PLAY_RATE`]; negative rates play in
    /// reverse. Gated by the vetoable `BeforeSetPlayRate` event.
    pub fn set_play_rate(&mut self, rate: f64) -> bool {
        if !rate.is_finite() || rate == 0.0 || !(MIN_PLAY_RATE..=MAX_PLAY_RATE).contains(&rate) {
            warn!(rate, "play rate rejected: must be non-zero within [-3, 3]");
            return false;
        }
        if !self.emitter.trigger(&Event::BeforeSetPlayRate { rate }) {
            debug!(rate, "play rate vetoed");
            return false;
        }
        self.play_rate = rate;
        self.emitter.trigger(&Event::AfterSetPlayRate { rate });
        true
    }

    /// Current playback rate.
    pub fn get_play_rate(&self) -> f64 {
        self.play_rate
    }

    /// Runs one update pass at the current time without advancing it.
    /// No-op while playing; used after external data edits.
    pub fn re_render(&mut self) {
        if self.state == EngineState::Loading {
            warn!("re-render requested before tracks were assigned");
            return;
        }
        if self.is_playing() {
            return;
        }
        self.tick_action(self.current_time);
    }

    /// Advances the playback loop by one frame.
    ///
    /// `now` is the host's wall time in seconds. The elapsed interval since
    /// the previous tick is clamped to one second, scaled by the play rate,
    /// and integrated into the virtual time; the update pass then runs for
    /// every active action and the next tick is scheduled unless playback
    /// ended. Ignored unless the engine is playing.
    pub fn tick(&mut self, now: f64) {
        if self.state == EngineState::Loading {
            warn!("tick received before tracks were assigned");
            return;
        }
        if !self.is_playing() {
            return;
        }
        self.tick_handle = None;

        let prev = self.prev_tick.replace(now).unwrap_or(now);
        let delta = (now - prev).clamp(0.0, MAX_TICK_DELTA);
        let mut time = self.current_time + delta * self.play_rate;

        let to_time = self.play_options.to_time;
        if let Some(to_time) = to_time {
            if to_time <= time {
                time = to_time;
            }
        }
        self.apply_time(time, true);
        self.tick_action(time);

        let exhausted =
            self.active.cursor() >= self.index.count() && self.active.is_empty();
        if to_time.is_none() && self.play_options.auto_end && exhausted {
            self.end();
            return;
        }
        if let Some(to_time) = to_time {
            if to_time <= time {
                self.end();
                return;
            }
        }

        if self.is_playing() {
            self.tick_handle = Some(self.scheduler.schedule());
        }
    }

    /// Toggles one track's visibility in place.
    ///
    /// Hiding forces the track's active actions to leave on the next scan;
    /// un-hiding rewinds the scan cursor so actions currently in range
    /// receive a deferred `enter` on the next tick or re-render.
    pub fn set_track_hidden(&mut self, track_id: &str, hidden: bool) -> Result<()> {
        let Some(track) = self.index.track_mut(track_id) else {
            return Err(EngineError::UnknownTrack {
                track_id: track_id.to_string(),
            });
        };
        if track.hidden == hidden {
            return Ok(());
        }
        track.hidden = hidden;
        info!(track_id, hidden, "track visibility changed");
        self.active.reset_cursor();
        Ok(())
    }

    /// Registers an event handler; returning `false` from a handler vetoes
    /// the operations gated by the `Before*` channels.
    pub fn on(
        &mut self,
        channel: Channel,
        handler: impl FnMut(&Event) -> bool + 'static,
    ) -> HandlerId {
        self.emitter.on(channel, handler)
    }

    /// Removes one event handler.
    pub fn off(&mut self, channel: Channel, handler: HandlerId) -> bool {
        self.emitter.off(channel, handler)
    }

    /// Removes every handler from one channel.
    pub fn clear_channel(&mut self, channel: Channel) {
        self.emitter.clear_channel(channel);
    }

    /// Removes every handler from every channel.
    pub fn off_all(&mut self) {
        self.emitter.off_all();
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == EngineState::Paused
    }

    /// Largest action end across the assigned tracks, or 0 when empty.
    pub fn duration(&self) -> f64 {
        self.index.duration()
    }

    /// Returns the engine's snapshot of one action.
    pub fn action(&self, action_id: &str) -> Option<&Action> {
        self.index.action_at(action_id)
    }

    /// Returns the track owning one action.
    pub fn track_of(&self, action_id: &str) -> Option<&Track> {
        self.index.track_of(action_id)
    }

    /// Ids of the currently active actions, in discovery order.
    pub fn active_action_ids(&self) -> Vec<ActionId> {
        self.active.ids().cloned().collect()
    }

    /// Currently active actions flagged `selected`, with their tracks.
    pub fn selected_actions(&self) -> Vec<(&Action, &Track)> {
        self.active
            .ids()
            .filter_map(|id| {
                let action = self.index.action_at(id)?;
                let track = self.index.track_of(id)?;
                action.selected.then_some((action, track))
            })
            .collect()
    }

    /// Current enter-scan position into the sorted action sequence.
    /// Non-decreasing while time only moves forward.
    pub fn scan_cursor(&self) -> usize {
        self.active.cursor()
    }

    fn apply_time(&mut self, time: f64, is_tick: bool) -> bool {
        if !is_tick && !self.emitter.trigger(&Event::BeforeSetTime { time }) {
            debug!(time, "seek vetoed");
            return false;
        }

        if time < self.current_time {
            self.active.reset_cursor();
        }
        self.current_time = time;

        self.deal_leave(time);
        self.deal_enter(time);

        if is_tick {
            self.emitter.trigger(&Event::SetTimeByTick { time });
        } else {
            self.emitter.trigger(&Event::AfterSetTime { time });
        }
        true
    }

    /// Playback completed.
    fn end(&mut self) {
        self.pause();
        self.emitter.trigger(&Event::Ended);
        info!(time = self.current_time, "ended");
    }

    fn preload(&mut self, index: &mut ActionIndex) -> Result<()> {
        let ids: Vec<ActionId> = index.sorted_ids().to_vec();
        for action_id in ids {
            let Some(track) = index.track_of(&action_id) else {
                continue;
            };
            let Some(action) = index.action_at(&action_id) else {
                continue;
            };
            let Some(controller) = self.controllers.get_mut(&track.controller_id) else {
                continue;
            };

            let preloaded = controller
                .preload(PreloadParams { action, track })
                .map_err(|source| EngineError::Preload {
                    action_id: action_id.clone(),
                    source,
                })?;
            if let Some(duration) = preloaded.duration {
                if let Some(action) = index.action_at_mut(&action_id) {
                    action.duration = Some(duration);
                }
            }
        }
        Ok(())
    }

    /// Dispatches `start` or `stop` to every active action on a visible
    /// track, bracketing the playing/paused transition.
    fn start_or_stop(&mut self, bracket: Bracket) {
        let time = self.current_time;
        let ids: Vec<ActionId> = self.active.ids().cloned().collect();
        for action_id in ids {
            let Some(action) = self.index.action_at(&action_id) else {
                continue;
            };
            let Some(track) = self.index.track_of(&action_id) else {
                continue;
            };
            if track.hidden {
                continue;
            }
            let Some(controller) = self.controllers.get_mut(&track.controller_id) else {
                continue;
            };
            match bracket {
                Bracket::Start => controller.start(StartParams { action, track, time }),
                Bracket::Stop => controller.stop(StopParams { action, track, time }),
            }
        }
    }

    /// Runs the update pass for one frame: enter scan, leave scan, then
    /// `update` for every still-active action.
    fn tick_action(&mut self, time: f64) {
        self.deal_enter(time);
        self.deal_leave(time);

        let ids: Vec<ActionId> = self.active.ids().cloned().collect();
        for action_id in ids {
            let Some(action) = self.index.action_at(&action_id) else {
                continue;
            };
            let Some(track) = self.index.track_of(&action_id) else {
                continue;
            };
            let Some(controller) = self.controllers.get_mut(&track.controller_id) else {
                continue;
            };
            controller.update(UpdateParams { action, track, time });
        }
    }

    /// Enter scan: walks the sorted sequence from the cursor, entering every
    /// action whose interval contains `time`. Sortedness bounds the walk at
    /// the first action starting in the future. An action first examined
    /// with `end <= time` is skipped over without ever entering.
    fn deal_enter(&mut self, time: f64) {
        while self.active.cursor() < self.index.count() {
            let position = self.active.cursor();
            let action_id = self.index.sorted_ids()[position].clone();
            let Some(action) = self.index.action_at(&action_id) else {
                self.active.advance_cursor();
                continue;
            };

            if !action.disable {
                if action.start > time {
                    break;
                }
                let hidden = self
                    .index
                    .track_of(&action_id)
                    .is_some_and(|track| track.hidden);
                if action.end > time && !self.active.contains(&action_id) && !hidden {
                    if let Some(track) = self.index.track_of(&action_id) {
                        if let Some(controller) = self.controllers.get_mut(&track.controller_id) {
                            debug!(action_id = %action_id, time, "action enter");
                            controller.enter(EnterParams { action, track, time });
                        }
                    }
                    self.active.insert(action_id, position);
                }
            }
            self.active.advance_cursor();
        }
    }

    /// Leave scan: removes every active action whose interval no longer
    /// contains `time` or whose track became hidden. At `time == end`
    /// exactly, the action stays active (and is not re-entered), avoiding
    /// flicker at exact boundaries. Bounded by the active-set size.
    fn deal_leave(&mut self, time: f64) {
        let leaving: Vec<ActionId> = self
            .active
            .ids()
            .filter(|action_id| match self.index.action_at(action_id) {
                Some(action) => {
                    let hidden = self
                        .index
                        .track_of(action_id)
                        .is_some_and(|track| track.hidden);
                    action.start > time || action.end < time || hidden
                }
                None => true,
            })
            .cloned()
            .collect();

        for action_id in leaving {
            self.active.remove(&action_id);
            self.leave_action(&action_id, time);
        }
    }

    /// Forcibly leaves every active action regardless of time and rewinds
    /// the scan cursor. Used when tracks are reassigned.
    fn deal_clear(&mut self) {
        let time = self.current_time;
        for action_id in self.active.drain() {
            self.leave_action(&action_id, time);
        }
    }

    fn leave_action(&mut self, action_id: &str, time: f64) {
        let Some(action) = self.index.action_at(action_id) else {
            return;
        };
        let Some(track) = self.index.track_of(action_id) else {
            return;
        };
        let Some(controller) = self.controllers.get_mut(&track.controller_id) else {
            return;
        };
        debug!(action_id, time, "action leave");
        controller.leave(LeaveParams { action, track, time });
    }
}
