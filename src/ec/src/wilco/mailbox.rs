//! Wilco mailbox transport.
//!
//! A request is a 10-byte header followed by up to [`MAILBOX_DATA_SIZE`]
//! bytes of payload, written to EMI offset 0:
//!
//! | byte | field                                   |
//! |------|-----------------------------------------|
//! | 0    | struct version (3)                      |
//! | 1    | checksum, whole packet sums to zero     |
//! | 2-3  | mailbox id, little endian (0x00f0)      |
//! | 4    | mailbox version (0)                     |
//! | 5    | reserved                                |
//! | 6-7  | data size, little endian (payload + 2)  |
//! | 8    | command                                 |
//! | 9    | reserved                                |
//!
//! Writing [`MAILBOX_START`] to the command port starts the transaction. The
//! host polls the command port until the EC clears its pending and busy bits,
//! checks the error flag on the data port, and reads the response from EMI
//! offset 0: result (u16), data size (u16), two reserved bytes and a fixed
//! 32 byte data area. The response also sums to zero.

use bitfield::bitfield;
use bitflags::bitflags;
use log::{debug, error, trace, warn};
use util::timer::wait_us;

use super::{Error, Status, WilcoEc};

pub const MAILBOX_STRUCT_VERSION: u8 = 3;
/// Legacy mailbox id
pub const MAILBOX_ID: u16 = 0x00f0;
pub const MAILBOX_VERSION: u8 = 0;
pub const MAILBOX_DATA_SIZE: usize = 32;
pub const MAILBOX_START: u8 = 0x0f;

/// Poll budget for a single transaction
pub const MAILBOX_TIMEOUT_US: u64 = 300_000;
pub const MAILBOX_DELAY_US: u64 = 100;
/// Attempts made by [`WilcoEc::mailbox_retry`]
pub const MAILBOX_RETRIES: usize = 3;

const REQUEST_HEADER_SIZE: usize = 10;
const RESPONSE_HEADER_SIZE: usize = 6;
const RESPONSE_SIZE: usize = RESPONSE_HEADER_SIZE + MAILBOX_DATA_SIZE;

bitfield! {
    /// Command port status
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct EcStatus(u8);
    impl Debug;
    pub data_ready, _: 0;
    pub pending, _: 1;
    pub busy_bit, _: 2;
    pub cmd, _: 3;
}

impl EcStatus {
    /// The EC still owns the mailbox
    pub fn busy(&self) -> bool {
        self.pending() || self.busy_bit()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct MessageFlags: u8 {
        /// The EC does not answer, e.g. because it resets
        const NO_RESPONSE = 1 << 0;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Message<'a> {
    pub command: u8,
    pub flags: MessageFlags,
    pub data: &'a [u8],
}

impl<'a> Message<'a> {
    pub const fn new(command: u8, data: &'a [u8]) -> Self {
        Self {
            command,
            flags: MessageFlags::empty(),
            data,
        }
    }

    pub const fn no_response(command: u8, data: &'a [u8]) -> Self {
        Self {
            command,
            flags: MessageFlags::NO_RESPONSE,
            data,
        }
    }
}

/// A framed request packet
pub struct Request {
    bytes: [u8; REQUEST_HEADER_SIZE + MAILBOX_DATA_SIZE],
    len: usize,
}

impl Request {
    pub fn new(msg: &Message<'_>) -> Result<Self, Error> {
        if msg.data.len() > MAILBOX_DATA_SIZE {
            return Err(Error::RequestTooBig(msg.data.len()));
        }
        let mut bytes = [0u8; REQUEST_HEADER_SIZE + MAILBOX_DATA_SIZE];
        let data_size = (msg.data.len() + 2) as u16;
        bytes[0] = MAILBOX_STRUCT_VERSION;
        bytes[2..4].copy_from_slice(&MAILBOX_ID.to_le_bytes());
        bytes[4] = MAILBOX_VERSION;
        bytes[6..8].copy_from_slice(&data_size.to_le_bytes());
        bytes[8] = msg.command;
        bytes[REQUEST_HEADER_SIZE..REQUEST_HEADER_SIZE + msg.data.len()].copy_from_slice(msg.data);

        let len = REQUEST_HEADER_SIZE + msg.data.len();
        let sum = bytes[..len].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        bytes[1] = sum.wrapping_neg();
        Ok(Self { bytes, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A response packet as read back from EMI
pub struct Response {
    bytes: [u8; RESPONSE_SIZE],
}

impl Response {
    /// Validate raw response bytes whose 8-bit sum is `sum`
    pub fn parse(bytes: [u8; RESPONSE_SIZE], sum: u8) -> Result<Self, Error> {
        let rsp = Self { bytes };
        if sum != 0 {
            return Err(Error::Device(Status::Checksum(sum)));
        }
        if rsp.result() != 0 {
            return Err(Error::Device(Status::Result(rsp.result())));
        }
        if rsp.data_size() as usize != MAILBOX_DATA_SIZE {
            return Err(Error::Device(Status::Size(rsp.data_size())));
        }
        Ok(rsp)
    }

    pub fn result(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    pub fn data_size(&self) -> u16 {
        u16::from_le_bytes([self.bytes[2], self.bytes[3]])
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes[RESPONSE_HEADER_SIZE..]
    }
}

impl WilcoEc {
    pub fn status(&self) -> EcStatus {
        EcStatus(self.io.inb(self.io_base_command))
    }

    /// Run one mailbox transaction.
    ///
    /// Copies up to `response.len()` bytes of the response data area and
    /// returns how many were copied. Messages flagged
    /// [`MessageFlags::NO_RESPONSE`] return 0 as soon as the command starts.
    pub fn mailbox(&mut self, msg: &Message<'_>, response: &mut [u8]) -> Result<usize, Error> {
        let request = Request::new(msg)?;
        trace!("wilco: cmd 0x{:02x} {:02x?}", msg.command, request.as_bytes());

        self.emi.write(self.io.as_ref(), 0, request.as_bytes());
        self.io.outb(self.io_base_command, MAILBOX_START);

        if msg.flags.contains(MessageFlags::NO_RESPONSE) {
            return Ok(0);
        }

        let io = self.io.as_ref();
        let command = self.io_base_command;
        let elapsed = wait_us(self.clock.as_ref(), MAILBOX_TIMEOUT_US, MAILBOX_DELAY_US, || {
            !EcStatus(io.inb(command)).busy()
        });
        match elapsed {
            Some(us) => debug!("wilco: cmd 0x{:02x} done in {} us", msg.command, us),
            None => {
                error!("wilco: cmd 0x{:02x} timed out", msg.command);
                return Err(Error::NotResponding);
            }
        }

        let flag = self.io.inb(self.io_base_data);
        if flag != 0 {
            error!("wilco: cmd 0x{:02x} error flag 0x{:02x}", msg.command, flag);
            return Err(Error::Device(Status::Flag(flag)));
        }

        let mut raw = [0u8; RESPONSE_SIZE];
        let sum = self.emi.read(self.io.as_ref(), 0, &mut raw);
        let rsp = Response::parse(raw, sum).map_err(|e| {
            error!("wilco: cmd 0x{:02x}: {}", msg.command, e);
            e
        })?;

        let n = response.len().min(MAILBOX_DATA_SIZE);
        response[..n].copy_from_slice(&rsp.data()[..n]);
        Ok(n)
    }

    /// [`mailbox`](Self::mailbox), restarted while the EC is not responding.
    ///
    /// Only for commands that are safe to repeat.
    pub fn mailbox_retry(&mut self, msg: &Message<'_>, response: &mut [u8]) -> Result<usize, Error> {
        let mut attempt = 1;
        loop {
            match self.mailbox(msg, response) {
                Err(Error::NotResponding) if attempt < MAILBOX_RETRIES => {
                    warn!("wilco: cmd 0x{:02x} retry {}", msg.command, attempt);
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
