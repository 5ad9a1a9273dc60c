//! Wilco embedded controller.
//!
//! Wilco is a Microchip MEC based EC. The host talks to it through a small
//! I/O port range (data and command ports) plus the MEC EMI window, which
//! carries the request and response packets. See [`mailbox`] for framing.

mod commands;
mod mailbox;

use alloc::{boxed::Box, sync::Arc};
use bootstate::CleanupType;
use core::fmt;
use device::{gpio::GpioInput, ErrorKind, Registry, Shared};
use log::{error, info};
use oreboot_asm::PortIo;
use util::{cb_err::CbErr, timer::Clock};

use crate::mec::MecEmi;

pub use self::{
    commands::{PowerStatus, BIOS_PROGRESS_EXIT_FIRMWARE},
    mailbox::{
        EcStatus, Message, MessageFlags, Request, Response, MAILBOX_DATA_SIZE, MAILBOX_RETRIES,
        MAILBOX_TIMEOUT_US,
    },
};

/// Why a completed mailbox transaction was rejected
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Nonzero error flag on the data port
    Flag(u8),
    /// Response bytes did not sum to zero
    Checksum(u8),
    /// Nonzero result field
    Result(u16),
    /// Response data size other than the mailbox size
    Size(u16),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Host base or EMI base of zero
    InvalidBase,
    /// The EC stayed busy for the whole polling budget
    NotResponding,
    /// The EC answered, but with an error
    Device(Status),
    /// Request payload larger than the mailbox, in bytes
    RequestTooBig(usize),
}

impl device::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBase | Self::RequestTooBig(_) => ErrorKind::InvalidArgument,
            Self::NotResponding => ErrorKind::Timeout,
            Self::Device(_) => ErrorKind::Device,
        }
    }
}

impl From<Error> for CbErr {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidBase | Error::RequestTooBig(_) => CbErr::ErrArg,
            Error::NotResponding => CbErr::ECNotResponding,
            Error::Device(Status::Checksum(_) | Status::Size(_)) => CbErr::ECInvalidResponse,
            Error::Device(_) => CbErr::ECDeviceError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBase => write!(f, "invalid I/O base"),
            Self::NotResponding => write!(f, "EC not responding"),
            Self::Device(Status::Flag(v)) => write!(f, "EC error flag 0x{:02x}", v),
            Self::Device(Status::Checksum(v)) => write!(f, "bad response checksum 0x{:02x}", v),
            Self::Device(Status::Result(v)) => write!(f, "EC result 0x{:04x}", v),
            Self::Device(Status::Size(v)) => write!(f, "unexpected response size {}", v),
            Self::RequestTooBig(n) => write!(f, "request of {} bytes too big", n),
        }
    }
}

pub struct WilcoEc {
    io: Arc<dyn PortIo>,
    clock: Arc<dyn Clock>,
    io_base_data: u16,
    io_base_command: u16,
    emi: MecEmi,
}

impl WilcoEc {
    pub fn new(
        io: Arc<dyn PortIo>,
        clock: Arc<dyn Clock>,
        ec_host_base: u16,
        mec_emi_base: u16,
    ) -> Result<Self, Error> {
        if ec_host_base == 0 || mec_emi_base == 0 {
            error!("Wilco EC: invalid parameter");
            return Err(Error::InvalidBase);
        }
        info!("Wilco EC [base 0x{:x} emi 0x{:x}]", ec_host_base, mec_emi_base);
        Ok(Self {
            io,
            clock,
            io_base_data: ec_host_base,
            io_base_command: ec_host_base + 4,
            emi: MecEmi::new(mec_emi_base),
        })
    }

    pub fn data_port(&self) -> u16 {
        self.io_base_data
    }

    pub fn command_port(&self) -> u16 {
        self.io_base_command
    }

    pub fn packet_base(&self) -> u16 {
        self.emi.base()
    }
}

/// Lid switch backed by the EC power status
pub struct LidSwitch(Shared<WilcoEc>);

impl GpioInput for LidSwitch {
    fn get(&mut self) -> device::Result<bool> {
        self.0.lock().lid_open().map_err(|e| device::Error::kind(&e))
    }
}

/// Flag source reporting whether the lid is open
pub fn lid_switch_flag(ec: &Shared<WilcoEc>) -> Box<dyn GpioInput> {
    Box::new(LidSwitch(ec.clone()))
}

/// Tell the EC firmware is done when the payload hands off
pub fn register_cleanup(ec: &Shared<WilcoEc>, registry: &mut Registry) {
    let ec = ec.clone();
    registry.add_cleanup(
        "wilco_ec",
        CleanupType::ON_HANDOFF,
        Box::new(move |_| ec.lock().exit_firmware().map_err(CbErr::from)),
    );
}
