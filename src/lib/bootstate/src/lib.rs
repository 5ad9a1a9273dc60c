/* SPDX-License-Identifier: GPL-2.0-only */
#![no_std]

extern crate alloc;

mod cleanup;

pub use cleanup::{CleanupFn, CleanupFunc, CleanupList, CleanupType};

/// The payload moves through a short, strictly ordered sequence of states.
/// Hardware is only touched from `BoardSetup` onward and every driver is
/// released at `Handoff`:
///
/// ```text
///        start
///          |
///        Init ------------ registry constructed, nothing registered
///          |
///      BoardSetup -------- board_setup() runs exactly once
///          |
///     DevicesReady ------- boot flow enumerates the registry
///          |
///       Handoff ---------- cleanup callbacks run, drivers dropped
///          |
///      os / next stage
/// ```
///
/// A failed `BoardSetup` never reaches `DevicesReady`; the payload halts with
/// a diagnostic instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum BootState {
    Init,
    BoardSetup,
    DevicesReady,
    Handoff,
}

impl BootState {
    /// The only state that may follow `self`
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::BoardSetup),
            Self::BoardSetup => Some(Self::DevicesReady),
            Self::DevicesReady => Some(Self::Handoff),
            Self::Handoff => None,
        }
    }

    pub fn can_enter(self, to: Self) -> bool {
        self.next() == Some(to)
    }
}
