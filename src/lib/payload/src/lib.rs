/* SPDX-License-Identifier: GPL-2.0-only */
#![no_std]

//! Payload lifecycle around board setup.
//!
//! A [`Payload`] owns the [`Registry`] from construction to handoff. Board
//! setup runs exactly once; enumeration is only possible once it succeeded;
//! handoff runs the cleanup callbacks and drops every driver.

use bootstate::{BootState, CleanupType};
use core::fmt::{self, Display};
use device::{ErrorKind, Platform, Registry};
use log::{error, info};
use util::cb_err::CbErr;

#[derive(Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// The requested step is not valid from the current state
    OutOfOrder { from: BootState, to: BootState },
    /// Board setup failed; the payload cannot continue
    Board(E),
    /// A cleanup callback failed
    Cleanup(CbErr),
    /// No power driver was registered
    NoPower,
    /// The power driver returned instead of resetting the machine
    Power(ErrorKind),
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { from, to } => write!(f, "cannot go from {:?} to {:?}", from, to),
            Self::Board(e) => write!(f, "board setup failed: {}", e),
            Self::Cleanup(e) => write!(f, "cleanup failed: {}", e),
            Self::NoPower => write!(f, "no power ops registered"),
            Self::Power(e) => write!(f, "power ops returned: {}", e),
        }
    }
}

impl<E: device::Error> device::Error for Error<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfOrder { .. } => ErrorKind::InvalidArgument,
            Self::Board(e) => e.kind(),
            Self::Cleanup(_) => ErrorKind::Device,
            Self::NoPower => ErrorKind::NotInstalled,
            Self::Power(e) => *e,
        }
    }
}

pub struct Payload {
    state: BootState,
    registry: Registry,
    platform: Platform,
}

impl Payload {
    pub fn new(platform: Platform) -> Self {
        Self {
            state: BootState::Init,
            registry: Registry::new(),
            platform,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    fn enter<E>(&mut self, to: BootState) -> Result<(), Error<E>> {
        if !self.state.can_enter(to) {
            error!("payload: {:?} -> {:?} refused", self.state, to);
            return Err(Error::OutOfOrder { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }

    /// Run the board's setup function against the registry.
    ///
    /// A failing board leaves the payload in `BoardSetup`, from which only a
    /// reboot or power off is possible.
    pub fn setup_board<E: Display>(
        &mut self,
        board_setup: impl FnOnce(&mut Registry, &Platform) -> Result<(), E>,
    ) -> Result<(), Error<E>> {
        self.enter::<E>(BootState::BoardSetup)?;
        if let Err(e) = board_setup(&mut self.registry, &self.platform) {
            error!("payload: board setup failed: {}", e);
            return Err(Error::Board(e));
        }
        self.enter::<E>(BootState::DevicesReady)?;
        info!("payload: devices ready");
        Ok(())
    }

    /// Registered drivers, available once board setup succeeded
    pub fn devices(&mut self) -> Option<&mut Registry> {
        match self.state {
            BootState::DevicesReady => Some(&mut self.registry),
            _ => None,
        }
    }

    /// Run the handoff cleanups and release every driver
    pub fn handoff<E>(mut self) -> Result<(), Error<E>> {
        self.enter::<E>(BootState::Handoff)?;
        info!("payload: handoff");
        self.registry.teardown(CleanupType::ON_HANDOFF).map_err(Error::Cleanup)
    }

    fn reset<E>(&mut self, event: CleanupType, off: bool) -> Error<E> {
        if let Err(e) = self.registry.run_cleanups(event) {
            error!("payload: {:?} cleanups failed: {}", event, e);
        }
        let Some(power) = self.registry.power() else {
            return Error::NoPower;
        };
        let res = if off { power.power_off() } else { power.cold_reboot() };
        match res {
            Err(e) => Error::Power(e),
            Ok(()) => Error::Power(ErrorKind::Timeout),
        }
    }

    /// Run reboot cleanups and reset the machine. Only returns on failure.
    pub fn cold_reboot<E>(&mut self) -> Error<E> {
        self.reset(CleanupType::ON_REBOOT, false)
    }

    /// Run power-off cleanups and enter S5. Only returns on failure.
    pub fn power_off<E>(&mut self) -> Error<E> {
        self.reset(CleanupType::ON_POWER_OFF, true)
    }
}
