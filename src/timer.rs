use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests; time only moves on `advance`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Single-use stopwatch measuring one reaction interval
#[derive(Debug)]
pub struct Timer<C: Clock = MonotonicClock> {
    clock: C,
    started_at: Option<Instant>,
}

impl Timer<MonotonicClock> {
    pub fn monotonic() -> Self {
        Self::new(MonotonicClock)
    }
}

impl<C: Clock> Timer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            started_at: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Arm the timer, returning the start mark.
    pub fn start(&mut self) -> Instant {
        let now = self.clock.now();
        self.started_at = Some(now);
        now
    }

    /// Elapsed seconds since `start`, clearing the mark. 0.0 when not running.
    pub fn stop(&mut self) -> f64 {
        match self.started_at.take() {
            Some(start) => self.clock.now().duration_since(start).as_secs_f64(),
            None => 0.0,
        }
    }

    pub fn get_elapsed(&self) -> f64 {
        self.started_at
            .map(|start| self.clock.now().duration_since(start).as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}
