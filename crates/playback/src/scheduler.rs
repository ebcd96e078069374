/// Token identifying one scheduled tick request, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Seam between the engine and whatever drives its frames.
///
/// The engine calls [`schedule`](TickScheduler::schedule) whenever it wants
/// another tick and [`cancel`](TickScheduler::cancel) when pausing; the host
/// honors an outstanding request by calling [`Engine::tick`](crate::Engine::tick)
/// with the current wall time in seconds. Keeping the callback on the host
/// side lets the same engine run under a display-synced clock, a headless
/// fixed-step loop, or a test-controlled virtual clock.
pub trait TickScheduler {
    /// Requests one tick callback before the host's next frame.
    fn schedule(&mut self) -> TickHandle;

    /// Cancels a previously scheduled tick, if it has not fired yet.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler for hosts that drive the engine themselves in a fixed-step
/// loop: requests are acknowledged and nothing is tracked.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler {
    next: u64,
}

impl NoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickScheduler for NoopScheduler {
    fn schedule(&mut self) -> TickHandle {
        let handle = TickHandle(self.next);
        self.next += 1;
        handle
    }

    fn cancel(&mut self, _handle: TickHandle) {}
}
