use std::sync::atomic::{AtomicU64, Ordering};

use util::timer::Clock;

/// A clock that only moves when somebody delays on it
#[derive(Debug, Default)]
pub struct FakeClock {
    now: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, us: u64) {
        self.now.fetch_add(us, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_us(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn udelay(&self, us: u64) {
        self.advance(us);
    }
}
