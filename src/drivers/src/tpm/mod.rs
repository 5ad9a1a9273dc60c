//! TPM 1.2 TIS / PTP FIFO interface.
//!
//! The command/response state machine is the same whether registers are
//! memory mapped or reached over I2C; only register access differs, which is
//! what [`TisBus`] abstracts.

mod i2c;
mod lpc;

pub use self::{
    i2c::{Cr50I2c, Cr50Irq, I2cTisBus, ReadyWait, SettleDelay, TisI2c, CR50_I2C_ADDR, SLB9645_I2C_ADDR},
    lpc::{LpcTisBus, LpcTpm, LPC_TPM_BASE},
};

use alloc::sync::Arc;
use bitfield::bitfield;
use device::{tpm::TpmOps, ErrorKind, Result};
use log::{debug, error};
use util::timer::{wait_us, Clock};

pub const TPM_ACCESS_VALID: u8 = 1 << 7;
pub const TPM_ACCESS_ACTIVE_LOCALITY: u8 = 1 << 5;
pub const TPM_ACCESS_REQUEST_USE: u8 = 1 << 1;

pub const TPM_STS_VALID: u32 = 1 << 7;
pub const TPM_STS_COMMAND_READY: u32 = 1 << 6;
pub const TPM_STS_GO: u32 = 1 << 5;
pub const TPM_STS_DATA_AVAIL: u32 = 1 << 4;
pub const TPM_STS_EXPECT: u32 = 1 << 3;

const TPM_HEADER_SIZE: usize = 10;

const TIS_SHORT_TIMEOUT_US: u64 = 750_000;
const TIS_LONG_TIMEOUT_US: u64 = 2_000_000;
const TIS_POLL_US: u64 = 10;

bitfield! {
    /// TPM_STS_x
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct TpmSts(u32);
    impl Debug;
    pub expect, _: 3;
    pub data_avail, _: 4;
    pub go, _: 5;
    pub command_ready, _: 6;
    pub valid, _: 7;
    pub u16, burst_count, _: 23, 8;
}

/// Locality 0 registers used by the FIFO protocol
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TisReg {
    Access,
    Sts,
    Fifo,
    DidVid,
}

/// Register transport under the FIFO protocol
pub trait TisBus {
    fn read(&mut self, reg: TisReg, buf: &mut [u8]) -> Result<()>;
    fn write(&mut self, reg: TisReg, data: &[u8]) -> Result<()>;
}

/// A TPM speaking the FIFO protocol over `B`
pub struct Tis<B> {
    bus: B,
    clock: Arc<dyn Clock>,
}

impl<B: TisBus> Tis<B> {
    pub fn with_bus(bus: B, clock: Arc<dyn Clock>) -> Self {
        Self { bus, clock }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// `(vendor id, device id)`
    pub fn did_vid(&mut self) -> Result<(u16, u16)> {
        let mut b = [0u8; 4];
        self.bus.read(TisReg::DidVid, &mut b)?;
        let v = u32::from_le_bytes(b);
        Ok((v as u16, (v >> 16) as u16))
    }

    fn access(&mut self) -> Result<u8> {
        let mut b = [0u8];
        self.bus.read(TisReg::Access, &mut b)?;
        Ok(b[0])
    }

    fn status(&mut self) -> Result<TpmSts> {
        let mut b = [0u8; 4];
        self.bus.read(TisReg::Sts, &mut b)?;
        Ok(TpmSts(u32::from_le_bytes(b)))
    }

    fn set_status(&mut self, bits: u32) -> Result<()> {
        self.bus.write(TisReg::Sts, &[bits as u8])
    }

    /// Poll until `cond` holds on a status read, surfacing bus errors
    fn wait_status(&mut self, timeout_us: u64, cond: impl Fn(TpmSts) -> bool) -> Result<TpmSts> {
        let clock = self.clock.clone();
        let mut last = Ok(TpmSts(0));
        let done = wait_us(clock.as_ref(), timeout_us, TIS_POLL_US, || {
            last = self.status();
            matches!(last, Ok(sts) if cond(sts)) || last.is_err()
        });
        let sts = last?;
        match done {
            Some(_) => Ok(sts),
            None => Err(ErrorKind::Timeout),
        }
    }

    fn request_locality(&mut self) -> Result<()> {
        let want = TPM_ACCESS_VALID | TPM_ACCESS_ACTIVE_LOCALITY;
        if self.access()? & want == want {
            return Ok(());
        }
        self.bus.write(TisReg::Access, &[TPM_ACCESS_REQUEST_USE])?;
        let clock = self.clock.clone();
        let mut last = Ok(0);
        wait_us(clock.as_ref(), TIS_SHORT_TIMEOUT_US, TIS_POLL_US, || {
            last = self.access();
            matches!(last, Ok(a) if a & want == want) || last.is_err()
        })
        .ok_or(ErrorKind::Timeout)?;
        last.map(|_| ())
    }

    fn burst(&mut self) -> Result<usize> {
        let sts = self.wait_status(TIS_SHORT_TIMEOUT_US, |s| s.burst_count() != 0)?;
        Ok(sts.burst_count() as usize)
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.set_status(TPM_STS_COMMAND_READY)?;
        self.wait_status(TIS_SHORT_TIMEOUT_US, |s| s.command_ready())?;

        let mut sent = 0;
        while sent < data.len() {
            let n = self.burst()?.min(data.len() - sent);
            self.bus.write(TisReg::Fifo, &data[sent..sent + n])?;
            sent += n;
        }

        let sts = self.wait_status(TIS_SHORT_TIMEOUT_US, |s| s.valid())?;
        if sts.expect() {
            error!("TPM: still expecting data after {} bytes", data.len());
            return Err(ErrorKind::Device);
        }
        self.set_status(TPM_STS_GO)
    }

    fn read_fifo(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut got = 0;
        while got < buf.len() {
            let n = self.burst()?.min(buf.len() - got);
            self.bus.read(TisReg::Fifo, &mut buf[got..got + n])?;
            got += n;
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.wait_status(TIS_LONG_TIMEOUT_US, |s| s.valid() && s.data_avail())?;
        if buf.len() < TPM_HEADER_SIZE {
            return Err(ErrorKind::OutOfRange);
        }
        self.read_fifo(&mut buf[..TPM_HEADER_SIZE])?;
        let len = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
        if len < TPM_HEADER_SIZE || len > buf.len() {
            error!("TPM: response of {} bytes does not fit {}", len, buf.len());
            return Err(ErrorKind::OutOfRange);
        }
        self.read_fifo(&mut buf[TPM_HEADER_SIZE..len])?;
        Ok(len)
    }
}

impl<B: TisBus> TpmOps for Tis<B> {
    fn xmit(&mut self, sendbuf: &[u8], recvbuf: &mut [u8]) -> Result<usize> {
        debug!("TPM: command of {} bytes", sendbuf.len());
        self.request_locality()?;
        self.send(sendbuf)?;
        let len = self.recv(recvbuf);
        // Ready for the next command whether or not the response was read.
        self.set_status(TPM_STS_COMMAND_READY)?;
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fields() {
        let sts = TpmSts(0x0000_0490);
        assert!(sts.valid());
        assert!(sts.data_avail());
        assert!(!sts.expect());
        assert_eq!(sts.burst_count(), 4);
    }
}
