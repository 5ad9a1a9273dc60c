//! Chrome EC host commands over LPC.
//!
//! Packets live in a 256 byte window at [`EC_LPC_ADDR_HOST_PACKET`]. On
//! generic LPC ECs the window is plain I/O ports; on Microchip MEC parts it is
//! reached through the EMI interface at the same base.

use alloc::sync::Arc;
use log::{error, info};
use oreboot_asm::PortIo;
use util::timer::{wait_us, Clock};

use super::{
    proto::{EcHostResponse, Error, EC_HOST_RESPONSE_HEADER_BYTES},
    CrosEcBus,
};
use crate::mec::MecEmi;

pub const EC_LPC_ADDR_HOST_DATA: u16 = 0x200;
pub const EC_LPC_ADDR_HOST_CMD: u16 = 0x204;
pub const EC_LPC_ADDR_HOST_PACKET: u16 = 0x800;
pub const EC_LPC_HOST_PACKET_SIZE: usize = 0x100;

/// Start a version 3 host command
pub const EC_COMMAND_PROTOCOL_3: u8 = 0xda;

pub const EC_LPC_STATUS_FROM_HOST: u8 = 0x02;
pub const EC_LPC_STATUS_PROCESSING: u8 = 0x04;
pub const EC_LPC_STATUS_BUSY_MASK: u8 = EC_LPC_STATUS_FROM_HOST | EC_LPC_STATUS_PROCESSING;

pub const EC_LPC_TIMEOUT_US: u64 = 1_000_000;
const EC_LPC_POLL_US: u64 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LpcVariant {
    Generic,
    Mec,
}

pub struct CrosEcLpcBus {
    io: Arc<dyn PortIo>,
    clock: Arc<dyn Clock>,
    variant: LpcVariant,
}

impl CrosEcLpcBus {
    pub fn new(io: Arc<dyn PortIo>, clock: Arc<dyn Clock>, variant: LpcVariant) -> Self {
        info!("Chrome EC LPC bus ({:?})", variant);
        Self { io, clock, variant }
    }

    pub fn variant(&self) -> LpcVariant {
        self.variant
    }

    fn write_bytes(&self, offset: u16, data: &[u8]) {
        match self.variant {
            LpcVariant::Generic => {
                for (i, b) in data.iter().enumerate() {
                    self.io.outb(EC_LPC_ADDR_HOST_PACKET + offset + i as u16, *b);
                }
            }
            LpcVariant::Mec => {
                MecEmi::new(EC_LPC_ADDR_HOST_PACKET).write(self.io.as_ref(), offset, data);
            }
        }
    }

    fn read_bytes(&self, offset: u16, buf: &mut [u8]) {
        match self.variant {
            LpcVariant::Generic => {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = self.io.inb(EC_LPC_ADDR_HOST_PACKET + offset + i as u16);
                }
            }
            LpcVariant::Mec => {
                MecEmi::new(EC_LPC_ADDR_HOST_PACKET).read(self.io.as_ref(), offset, buf);
            }
        }
    }

    fn wait_ready(&self) -> Result<(), Error> {
        let io = self.io.as_ref();
        wait_us(self.clock.as_ref(), EC_LPC_TIMEOUT_US, EC_LPC_POLL_US, || {
            io.inb(EC_LPC_ADDR_HOST_CMD) & EC_LPC_STATUS_BUSY_MASK == 0
        })
        .map(|_| ())
        .ok_or_else(|| {
            error!("cros_ec: LPC timeout, status 0x{:02x}", io.inb(EC_LPC_ADDR_HOST_CMD));
            Error::NotResponding
        })
    }
}

impl CrosEcBus for CrosEcLpcBus {
    fn send_packet(&mut self, req: &[u8], resp: &mut [u8]) -> Result<(), Error> {
        if req.len() > EC_LPC_HOST_PACKET_SIZE || resp.len() > EC_LPC_HOST_PACKET_SIZE {
            return Err(Error::RequestTruncated);
        }
        if resp.len() < EC_HOST_RESPONSE_HEADER_BYTES {
            return Err(Error::ResponseTooSmall);
        }

        self.wait_ready()?;
        self.write_bytes(0, req);
        self.io.outb(EC_LPC_ADDR_HOST_CMD, EC_COMMAND_PROTOCOL_3);
        self.wait_ready()?;

        let result = self.io.inb(EC_LPC_ADDR_HOST_DATA);
        if result != 0 {
            error!("cros_ec: EC returned error result code {}", result);
            return Err(Error::Response(result as u16));
        }

        let (header, data) = resp.split_at_mut(EC_HOST_RESPONSE_HEADER_BYTES);
        self.read_bytes(0, header);
        let mut raw = [0u8; EC_HOST_RESPONSE_HEADER_BYTES];
        raw.copy_from_slice(header);
        let len = (EcHostResponse::from_bytes(&raw).data_len as usize).min(data.len());
        self.read_bytes(EC_HOST_RESPONSE_HEADER_BYTES as u16, &mut data[..len]);
        Ok(())
    }
}
