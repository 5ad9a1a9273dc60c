//! Boot flags.
//!
//! Each flag is backed by at most one [`GpioInput`]. Boards bind the sources
//! during setup; the boot flow only ever reads them.

use alloc::boxed::Box;
use core::array;
use log::{debug, error};

use crate::{gpio::GpioInput, ErrorKind, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flag {
    WriteProtect,
    Recovery,
    Developer,
    LidOpen,
    Power,
    EcInRw,
    OptionRom,
    PhysPresence,
}

impl Flag {
    pub const COUNT: usize = 8;

    pub const ALL: [Flag; Self::COUNT] = [
        Self::WriteProtect,
        Self::Recovery,
        Self::Developer,
        Self::LidOpen,
        Self::Power,
        Self::EcInRw,
        Self::OptionRom,
        Self::PhysPresence,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Flag to GPIO source bindings
pub struct Flags {
    sources: [Option<Box<dyn GpioInput>>; Flag::COUNT],
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        Self {
            sources: array::from_fn(|_| None),
        }
    }

    /// Bind `gpio` to an unbound flag
    pub fn install(&mut self, flag: Flag, gpio: Box<dyn GpioInput>) -> Result<()> {
        let slot = &mut self.sources[flag.index()];
        if slot.is_some() {
            error!("flag {:?} already installed", flag);
            return Err(ErrorKind::AlreadyInstalled);
        }
        *slot = Some(gpio);
        Ok(())
    }

    /// Bind `gpio` to a flag, dropping any previous source
    pub fn replace(&mut self, flag: Flag, gpio: Box<dyn GpioInput>) {
        if self.sources[flag.index()].replace(gpio).is_some() {
            debug!("flag {:?} replaced", flag);
        }
    }

    pub fn fetch(&mut self, flag: Flag) -> Result<bool> {
        match &mut self.sources[flag.index()] {
            Some(gpio) => gpio.get(),
            None => Err(ErrorKind::NotInstalled),
        }
    }

    pub fn is_installed(&self, flag: Flag) -> bool {
        self.sources[flag.index()].is_some()
    }

    pub fn installed(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::Fixed;

    #[test]
    fn install_rejects_duplicates() {
        let mut flags = Flags::new();
        assert_eq!(flags.install(Flag::LidOpen, Box::new(Fixed(true))), Ok(()));
        assert_eq!(
            flags.install(Flag::LidOpen, Box::new(Fixed(false))),
            Err(ErrorKind::AlreadyInstalled)
        );
        assert_eq!(flags.fetch(Flag::LidOpen), Ok(true));
    }

    #[test]
    fn replace_overwrites() {
        let mut flags = Flags::new();
        flags.install(Flag::Recovery, Box::new(Fixed(false))).unwrap();
        flags.replace(Flag::Recovery, Box::new(Fixed(true)));
        assert_eq!(flags.fetch(Flag::Recovery), Ok(true));
        assert_eq!(flags.installed(), 1);
    }

    #[test]
    fn unbound_flag_is_not_installed() {
        let mut flags = Flags::new();
        assert_eq!(flags.fetch(Flag::PhysPresence), Err(ErrorKind::NotInstalled));
        assert!(Flag::ALL.iter().all(|f| !flags.is_installed(*f)));
    }
}
