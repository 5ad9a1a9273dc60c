use std::{collections::VecDeque, sync::Arc};

use device::{
    i2c::I2cOps,
    platform::I2cBus,
    tpm::TpmOps,
    ErrorKind, Result, Shared,
};
use drivers::tpm::{
    Cr50I2c, LpcTpm, Tis, TisBus, TisI2c, TisReg, CR50_I2C_ADDR, LPC_TPM_BASE, SLB9645_I2C_ADDR,
    TPM_ACCESS_ACTIVE_LOCALITY, TPM_ACCESS_REQUEST_USE, TPM_ACCESS_VALID, TPM_STS_COMMAND_READY,
    TPM_STS_DATA_AVAIL, TPM_STS_EXPECT, TPM_STS_GO, TPM_STS_VALID,
};
use sim::{FakeClock, FakeI2c, FakeMmio, FakeSoc};
use util::timer::Clock;

/// FIFO-interface TPM replying with a canned response
#[derive(Default)]
struct TpmModel {
    locality: bool,
    ready: bool,
    command: Vec<u8>,
    executed_command: Vec<u8>,
    response: VecDeque<u8>,
    reply: Vec<u8>,
    executed: usize,
}

impl TpmModel {
    fn replying(reply: &[u8]) -> Self {
        Self {
            reply: reply.to_vec(),
            ..Default::default()
        }
    }

    fn expect(&self) -> bool {
        if !self.ready {
            return false;
        }
        match self.command.get(2..6) {
            Some(len) => self.command.len() < u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize,
            None => true,
        }
    }

    fn sts(&self) -> u32 {
        let mut sts = TPM_STS_VALID;
        if self.ready {
            sts |= TPM_STS_COMMAND_READY;
        }
        if self.expect() {
            sts |= TPM_STS_EXPECT;
        }
        if !self.response.is_empty() {
            sts |= TPM_STS_DATA_AVAIL;
        }
        if self.ready || !self.response.is_empty() {
            sts |= 4 << 8;
        }
        sts
    }
}

impl TisBus for TpmModel {
    fn read(&mut self, reg: TisReg, buf: &mut [u8]) -> Result<()> {
        match reg {
            TisReg::Access => {
                buf[0] = TPM_ACCESS_VALID;
                if self.locality {
                    buf[0] |= TPM_ACCESS_ACTIVE_LOCALITY;
                }
            }
            TisReg::Sts => buf.copy_from_slice(&self.sts().to_le_bytes()[..buf.len()]),
            TisReg::Fifo => buf.iter_mut().for_each(|b| *b = self.response.pop_front().unwrap_or(0xff)),
            TisReg::DidVid => buf.copy_from_slice(&0x001a_15d1u32.to_le_bytes()),
        }
        Ok(())
    }

    fn write(&mut self, reg: TisReg, data: &[u8]) -> Result<()> {
        match reg {
            TisReg::Access if data[0] & TPM_ACCESS_REQUEST_USE != 0 => self.locality = true,
            TisReg::Sts if data[0] as u32 & TPM_STS_COMMAND_READY != 0 => {
                self.ready = true;
                self.command.clear();
                self.response.clear();
            }
            TisReg::Sts if data[0] as u32 & TPM_STS_GO != 0 => {
                self.ready = false;
                self.executed += 1;
                self.executed_command = self.command.clone();
                self.response = self.reply.iter().copied().collect();
            }
            TisReg::Fifo => self.command.extend_from_slice(data),
            _ => {}
        }
        Ok(())
    }
}

const STARTUP: [u8; 12] = [0x80, 0x01, 0, 0, 0, 0x0c, 0, 0, 0x01, 0x44, 0, 0];
const SUCCESS: [u8; 10] = [0x80, 0x01, 0, 0, 0, 0x0a, 0, 0, 0, 0];

#[test]
fn test_fifo_command_round_trip() -> Result<()> {
    let mut tpm = Tis::with_bus(TpmModel::replying(&SUCCESS), Arc::new(FakeClock::new()));
    let mut resp = [0u8; 64];
    let n = tpm.xmit(&STARTUP, &mut resp)?;

    assert_eq!(&resp[..n], &SUCCESS);
    let model = tpm.bus();
    assert!(model.locality);
    assert_eq!(model.executed_command, STARTUP);
    assert_eq!(model.executed, 1);
    // Left ready for the next command.
    assert!(model.ready);
    Ok(())
}

#[test]
fn test_short_command_is_rejected() {
    let mut tpm = Tis::with_bus(TpmModel::replying(&SUCCESS), Arc::new(FakeClock::new()));
    let mut resp = [0u8; 64];
    assert_eq!(tpm.xmit(&STARTUP[..8], &mut resp), Err(ErrorKind::Device));
    assert_eq!(tpm.bus().executed, 0);
}

#[test]
fn test_response_larger_than_buffer() {
    let mut reply = vec![0x80, 0x01, 0, 0, 0, 0x20];
    reply.resize(0x20, 0);
    let mut tpm = Tis::with_bus(TpmModel::replying(&reply), Arc::new(FakeClock::new()));
    let mut resp = [0u8; 16];
    assert_eq!(tpm.xmit(&STARTUP, &mut resp), Err(ErrorKind::OutOfRange));
    assert!(tpm.bus().ready);
}

#[test]
fn test_lpc_tpm_probe() -> Result<()> {
    let mmio = Arc::new(FakeMmio::new());
    let clock = Arc::new(FakeClock::new());
    assert!(matches!(
        LpcTpm::new(mmio.clone(), clock.clone(), LPC_TPM_BASE),
        Err(ErrorKind::NoDevice)
    ));

    mmio.set32(LPC_TPM_BASE + 0xf00, 0x001a_15d1);
    let mut tpm = LpcTpm::new(mmio, clock, LPC_TPM_BASE)?;
    assert_eq!(tpm.did_vid()?, (0x15d1, 0x001a));
    assert_eq!(tpm.bus().base(), LPC_TPM_BASE);
    Ok(())
}

fn i2c_bus(chip: u16) -> (Shared<FakeI2c>, Shared<dyn I2cOps>) {
    let soc = FakeSoc::new();
    let i2c = soc.i2c(I2cBus::Mmio(0x12e1_0000));
    i2c.lock().add_chip(chip);
    let bus: Shared<dyn I2cOps> = i2c.clone();
    (i2c, bus)
}

#[test]
fn test_cr50_register_framing() -> Result<()> {
    let (i2c, bus) = i2c_bus(CR50_I2C_ADDR);
    for (i, b) in [0xe0, 0x1a, 0x28, 0x00].into_iter().enumerate() {
        i2c.lock().regs.insert((CR50_I2C_ADDR, 6 + i as u8), b);
    }
    let mut tpm = Cr50I2c::new(bus, CR50_I2C_ADDR, Box::new(|| true), Arc::new(FakeClock::new()))?;

    assert_eq!(tpm.did_vid()?, (0x1ae0, 0x0028));
    let i2c = i2c.lock();
    assert_eq!(i2c.log[0], (CR50_I2C_ADDR, false, vec![0x06]));
    assert_eq!(i2c.log[1], (CR50_I2C_ADDR, true, vec![0xe0, 0x1a, 0x28, 0x00]));
    Ok(())
}

#[test]
fn test_cr50_without_irq_times_out() -> Result<()> {
    let (_, bus) = i2c_bus(CR50_I2C_ADDR);
    let clock = Arc::new(FakeClock::new());
    let mut tpm = Cr50I2c::new(bus, CR50_I2C_ADDR, Box::new(|| false), clock.clone())?;
    let mut resp = [0u8; 16];
    assert_eq!(tpm.xmit(&STARTUP, &mut resp), Err(ErrorKind::Timeout));
    assert!(clock.now_us() >= 100_000);
    Ok(())
}

#[test]
fn test_tis_i2c_settles_after_each_transaction() -> Result<()> {
    let (_, bus) = i2c_bus(SLB9645_I2C_ADDR);
    let clock = Arc::new(FakeClock::new());
    let mut tpm = TisI2c::new(bus, SLB9645_I2C_ADDR, clock.clone())?;
    tpm.did_vid()?;
    assert_eq!(clock.now_us(), 60);
    assert_eq!(tpm.bus().addr(), SLB9645_I2C_ADDR);
    Ok(())
}

#[test]
fn test_i2c_tpm_address_is_checked() {
    let (_, bus) = i2c_bus(CR50_I2C_ADDR);
    assert!(TisI2c::new(bus, 0x80, Arc::new(FakeClock::new())).is_err());
}
