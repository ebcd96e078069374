//! Headless demo: plays a two-track timeline in a fixed-step loop and logs
//! every lifecycle callback.

use playback::{
    Action, Controller, ControllerRegistry, Engine, EnterParams, LeaveParams, NoopScheduler,
    PlayOptions, Result, StartParams, StopParams, Track, UpdateParams,
};
use tracing::info;

struct LoggingController {
    label: &'static str,
}

impl Controller for LoggingController {
    fn enter(&mut self, params: EnterParams<'_>) {
        info!(kind = self.label, action = %params.action.id, time = params.time, "enter");
    }

    fn start(&mut self, params: StartParams<'_>) {
        info!(kind = self.label, action = %params.action.id, time = params.time, "start");
    }

    fn update(&mut self, params: UpdateParams<'_>) {
        info!(kind = self.label, action = %params.action.id, time = params.time, "update");
    }

    fn stop(&mut self, params: StopParams<'_>) {
        info!(kind = self.label, action = %params.action.id, time = params.time, "stop");
    }

    fn leave(&mut self, params: LeaveParams<'_>) {
        info!(kind = self.label, action = %params.action.id, time = params.time, "leave");
    }
}

fn main() -> Result<()> {
    init_tracing();

    let registry = ControllerRegistry::new()
        .with("audio", Box::new(LoggingController { label: "audio" }))
        .with("video", Box::new(LoggingController { label: "video" }));
    let mut engine = Engine::new(registry, NoopScheduler::new());

    let tracks = vec![
        Track::new("t-audio", "music", "audio").with_action(Action::new("intro", 0.0, 2.0)?),
        Track::new("t-video", "clips", "video")
            .with_action(Action::new("title", 0.5, 1.5)?)
            .with_action(Action::new("outro", 1.5, 3.0)?),
    ];
    engine.set_tracks(&tracks)?;
    info!(duration = engine.duration(), "timeline loaded");

    engine.play(PlayOptions::default());
    let mut now = 0.0;
    while engine.is_playing() {
        engine.tick(now);
        now += 0.25;
    }
    info!(time = engine.get_time(), "playback ended");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
