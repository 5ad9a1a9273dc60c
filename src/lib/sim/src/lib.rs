//! Simulated hardware for host-side tests.
//!
//! Every fake implements one of the primitive traits drivers are written
//! against ([`PortIo`](oreboot_asm::PortIo), [`Mmio`](oreboot_asm::Mmio),
//! [`PciConfig`](device::pci::PciConfig), [`Clock`](util::timer::Clock),
//! [`Soc`](device::Soc)) and records what the driver did with it.

mod clock;
mod cros_ec;
mod emi;
mod mmio;
mod pci;
mod port;
mod soc;
mod wilco;

use std::sync::Arc;

use device::{platform::SysInfo, Platform};

pub use self::{
    clock::FakeClock,
    cros_ec::{CrosEcLpcSim, CrosEcSpiSim, EcCommand},
    emi::EmiWindow,
    mmio::FakeMmio,
    pci::FakePci,
    port::{PortBus, PortDevice},
    soc::{FakeI2c, FakeI2s, FakeSoc, FakeSpi},
    wilco::{WilcoRequest, WilcoSim},
};

/// One of each fake, ready to be handed to board setup
#[derive(Clone, Default)]
pub struct SimPlatform {
    pub ports: Arc<PortBus>,
    pub mmio: Arc<FakeMmio>,
    pub pci: Arc<FakePci>,
    pub clock: Arc<FakeClock>,
    pub soc: Arc<FakeSoc>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(&self, sysinfo: SysInfo) -> Platform {
        Platform {
            ports: self.ports.clone(),
            mmio: self.mmio.clone(),
            pci: self.pci.clone(),
            clock: self.clock.clone(),
            soc: self.soc.clone(),
            sysinfo,
        }
    }
}
