use super::frame_clock::{FrameClock, FrameTime};

/// Handle returned by [`Ticker::add`], used to remove a callback later.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TickerId(u64);

type Callback<C> = Box<dyn FnMut(&mut C, f32) -> anyhow::Result<()>>;

/// Per-frame callback scheduler.
///
/// The ticker is an owned value rather than a process-wide registry: the
/// context `C` it drives is passed in on every tick, so several independent
/// scenes can coexist in one process (and in one test binary).
///
/// Callbacks run on the calling thread, in registration order. They must not
/// block; anything that waits on I/O belongs in the asset pipeline.
pub struct Ticker<C> {
    clock: FrameClock,
    callbacks: Vec<(TickerId, Callback<C>)>,
    next_id: u64,
    running: bool,
}

impl<C> Ticker<C> {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            clock,
            callbacks: Vec::new(),
            next_id: 0,
            running: false,
        }
    }

    /// Arms the ticker. The first `tick()` afterwards measures from this call.
    pub fn start(&mut self) {
        self.clock.reset();
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registers a callback invoked once per tick with the elapsed seconds.
    pub fn add<F>(&mut self, callback: F) -> TickerId
    where
        F: FnMut(&mut C, f32) -> anyhow::Result<()> + 'static,
    {
        let id = TickerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Unregisters a callback. Returns `false` if `id` was not registered.
    pub fn remove(&mut self, id: TickerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Measures the frame delta and runs every callback.
    ///
    /// Returns `None` (and runs nothing) until [`start`](Self::start) is called.
    pub fn tick(&mut self, ctx: &mut C) -> Option<FrameTime> {
        if !self.running {
            return None;
        }

        let ft = self.clock.tick();
        self.dispatch(ctx, ft.dt);
        Some(ft)
    }

    /// Runs every callback with an explicit delta, bypassing the clock.
    ///
    /// Used for deterministic stepping (tests, fixed-step replays).
    pub fn advance(&mut self, ctx: &mut C, dt: f32) -> usize {
        self.dispatch(ctx, dt)
    }

    /// Returns the number of callbacks that failed.
    fn dispatch(&mut self, ctx: &mut C, dt: f32) -> usize {
        let mut failures = 0;
        for (id, callback) in self.callbacks.iter_mut() {
            if let Err(err) = callback(ctx, dt) {
                failures += 1;
                log::error!("ticker callback {id:?} failed: {err:#}");
            }
        }
        failures
    }
}

impl<C> Default for Ticker<C> {
    fn default() -> Self {
        Self::new()
    }
}
