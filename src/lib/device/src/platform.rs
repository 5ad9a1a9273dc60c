//! Hardware primitives handed to board setup.
//!
//! Board files never touch raw addresses. Port I/O, MMIO, PCI config space,
//! the clock and the SoC-specific controller factories all arrive through a
//! [`Platform`], so boards can be composed against real or simulated hardware.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use heapless::String;
use oreboot_asm::{Mmio, PortIo};
use util::timer::Clock;

use crate::{
    gpio::{GpioInput, GpioOutput},
    i2c::{I2cOps, I2cSpeed},
    i2s::{I2sConfig, I2sOps},
    pci::{PciConfig, PciDev},
    spi::SpiOps,
    Result, Shared,
};

/// Length of a GPIO name in the coreboot table, including the terminator
pub const GPIO_MAX_NAME_LENGTH: usize = 16;

/// One entry of the coreboot GPIO table
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CbGpio {
    /// `None` for entries with no backing pad (the value is fixed)
    pub port: Option<u32>,
    pub active_high: bool,
    pub value: bool,
    pub name: String<GPIO_MAX_NAME_LENGTH>,
}

impl CbGpio {
    /// Build an entry, truncating `name` to the table's field width
    pub fn new(port: Option<u32>, active_high: bool, value: bool, name: &str) -> Self {
        let mut s = String::new();
        for c in name.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self {
            port,
            active_high,
            value,
            name: s,
        }
    }
}

/// Information coreboot left for the payload
#[derive(Clone, Debug, Default)]
pub struct SysInfo {
    pub gpios: Vec<CbGpio>,
}

/// Where an I2C controller lives
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum I2cBus {
    /// PCI function with its registers behind BAR0
    Pci(PciDev),
    /// Fixed MMIO base
    Mmio(usize),
}

/// SoC-specific controller factories.
///
/// Pad numbers and controller bases are board constants; the SoC decides how
/// they map to registers.
pub trait Soc {
    fn gpio_input(&self, pad: u32) -> Result<Box<dyn GpioInput>>;
    fn gpio_output(&self, pad: u32, value: bool) -> Result<Box<dyn GpioOutput>>;
    fn i2c_bus(&self, bus: I2cBus, speed: I2cSpeed) -> Result<Shared<dyn I2cOps>>;
    fn spi_bus(&self, base: usize) -> Result<Shared<dyn SpiOps>>;
    fn i2s(&self, base: usize, config: I2sConfig) -> Result<Box<dyn I2sOps>>;
    /// Current state of general purpose event `gpe`
    fn gpe_status(&self, gpe: u32) -> bool;
}

/// Everything a board needs to construct its drivers
#[derive(Clone)]
pub struct Platform {
    pub ports: Arc<dyn PortIo>,
    pub mmio: Arc<dyn Mmio>,
    pub pci: Arc<dyn PciConfig>,
    pub clock: Arc<dyn Clock>,
    pub soc: Arc<dyn Soc>,
    pub sysinfo: SysInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpio_names_are_truncated() {
        let gpio = CbGpio::new(Some(3), true, false, "a name longer than the table allows");
        assert_eq!(gpio.name.len(), GPIO_MAX_NAME_LENGTH);
        assert_eq!(gpio.name.as_str(), "a name longer th");
    }
}
