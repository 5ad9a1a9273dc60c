//! Chrome OS embedded controller.
//!
//! [`CrosEc`] issues host commands through any [`CrosEcBus`]. Several
//! `CrosEc`s may share one bus: a PD chip behind the main EC is reached with
//! passthru commands carrying its device index.

mod commands;
pub mod lpc;
pub mod proto;
pub mod spi;

use device::Shared;
use log::info;

pub use self::{
    commands::*,
    lpc::{CrosEcLpcBus, LpcVariant},
    proto::{CrosEcCommand, Error},
    spi::CrosEcSpiBus,
};

/// A transport able to move one v3 packet to the EC and its answer back
pub trait CrosEcBus {
    /// Send `req` and read up to `resp.len()` bytes of the response packet
    fn send_packet(&mut self, req: &[u8], resp: &mut [u8]) -> Result<(), Error>;
}

pub struct CrosEc {
    bus: Shared<dyn CrosEcBus>,
    dev_index: u8,
}

impl CrosEc {
    pub fn new(bus: Shared<dyn CrosEcBus>, dev_index: u8) -> Self {
        info!("Chrome EC device {}", dev_index);
        Self { bus, dev_index }
    }

    pub fn dev_index(&self) -> u8 {
        self.dev_index
    }

    /// Run host command `code` and return the response length
    pub fn command(
        &mut self,
        code: u16,
        version: u8,
        data_in: &[u8],
        data_out: &mut [u8],
    ) -> Result<usize, Error> {
        let mut cmd = CrosEcCommand {
            code,
            version,
            data_in,
            data_out,
            dev_index: self.dev_index,
        };
        let mut bus = self.bus.lock();
        proto::send_command_proto3(&mut cmd, &mut *bus)
    }
}
