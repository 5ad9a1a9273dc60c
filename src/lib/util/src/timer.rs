//! Monotonic time source and stopwatch used by polling loops.
//!
//! Firmware at this stage cannot yield, so every wait is a bounded busy loop:
//! arm a [`Stopwatch`], poll, [`Clock::udelay`] between polls, and give up once
//! [`Stopwatch::expired`] reports the budget is gone.

pub const USECS_PER_MSEC: u64 = 1000;
pub const USECS_PER_SEC: u64 = 1_000_000;

/// Source of monotonic microseconds plus a calibrated busy delay.
pub trait Clock {
    /// Microseconds since an arbitrary, fixed point in the past
    fn now_us(&self) -> u64;

    /// Spin for at least `us` microseconds
    fn udelay(&self, us: u64);

    fn mdelay(&self, ms: u64) {
        self.udelay(ms * USECS_PER_MSEC);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn udelay(&self, us: u64) {
        (**self).udelay(us)
    }
}

pub struct Stopwatch<'a> {
    clock: &'a dyn Clock,
    start: u64,
    expires: u64,
}

impl<'a> Stopwatch<'a> {
    /// Start a stopwatch with no expiry armed
    pub fn new(clock: &'a dyn Clock) -> Self {
        let now = clock.now_us();
        Self {
            clock,
            start: now,
            expires: now,
        }
    }

    /// Restart and expire `us` microseconds from now
    pub fn init_usecs_expire(&mut self, us: u64) {
        self.start = self.clock.now_us();
        self.expires = self.start.saturating_add(us);
    }

    pub fn init_msecs_expire(&mut self, ms: u64) {
        self.init_usecs_expire(ms * USECS_PER_MSEC);
    }

    pub fn expired(&self) -> bool {
        self.clock.now_us() >= self.expires
    }

    /// Microseconds elapsed since the stopwatch was (re)started
    pub fn duration_usecs(&self) -> u64 {
        self.clock.now_us().saturating_sub(self.start)
    }

    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }
}

/// Poll `cond` every `step_us` until it holds or `timeout_us` elapses.
///
/// Returns the elapsed microseconds on success, `None` on timeout. The
/// condition is always evaluated one final time after the budget runs out.
pub fn wait_us(
    clock: &dyn Clock,
    timeout_us: u64,
    step_us: u64,
    mut cond: impl FnMut() -> bool,
) -> Option<u64> {
    let mut sw = Stopwatch::new(clock);
    sw.init_usecs_expire(timeout_us);
    loop {
        if cond() {
            return Some(sw.duration_usecs());
        }
        if sw.expired() {
            return None;
        }
        clock.udelay(step_us);
    }
}
