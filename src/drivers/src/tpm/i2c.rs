use alloc::{boxed::Box, sync::Arc, vec::Vec};
use device::{
    i2c::{check_addr, I2cOps, I2cSeg},
    ErrorKind, Result, Shared,
};
use log::{info, warn};
use util::timer::{wait_us, Clock};

use super::{Tis, TisBus, TisReg};

/// cr50 (H1) I2C address
pub const CR50_I2C_ADDR: u16 = 0x50;
/// Infineon SLB9645 I2C address
pub const SLB9645_I2C_ADDR: u16 = 0x20;

const CR50_IRQ_TIMEOUT_US: u64 = 100_000;
const CR50_IRQ_POLL_US: u64 = 10;
const SLB9645_SETTLE_US: u64 = 60;

/// How the host waits for the TPM between bus transactions
pub trait ReadyWait {
    fn wait(&mut self, clock: &dyn Clock) -> Result<()>;
}

/// cr50 pulls an interrupt line once it has digested a transaction
pub struct Cr50Irq(pub Box<dyn Fn() -> bool>);

impl ReadyWait for Cr50Irq {
    fn wait(&mut self, clock: &dyn Clock) -> Result<()> {
        let irq = &self.0;
        if wait_us(clock, CR50_IRQ_TIMEOUT_US, CR50_IRQ_POLL_US, || irq()).is_none() {
            warn!("cr50: timed out waiting for IRQ");
            return Err(ErrorKind::Timeout);
        }
        Ok(())
    }
}

/// Fixed settling time after each transaction
pub struct SettleDelay(pub u64);

impl ReadyWait for SettleDelay {
    fn wait(&mut self, clock: &dyn Clock) -> Result<()> {
        clock.udelay(self.0);
        Ok(())
    }
}

/// TIS registers behind an I2C address: one register index byte, then data
pub struct I2cTisBus<W> {
    i2c: Shared<dyn I2cOps>,
    addr: u16,
    clock: Arc<dyn Clock>,
    ready: W,
}

impl<W> I2cTisBus<W> {
    fn index(reg: TisReg) -> u8 {
        match reg {
            TisReg::Access => 0x00,
            TisReg::Sts => 0x01,
            TisReg::Fifo => 0x05,
            TisReg::DidVid => 0x06,
        }
    }

    pub fn addr(&self) -> u16 {
        self.addr
    }
}

impl<W: ReadyWait> TisBus for I2cTisBus<W> {
    fn read(&mut self, reg: TisReg, buf: &mut [u8]) -> Result<()> {
        let mut index = [Self::index(reg)];
        self.i2c.lock().transfer(&mut [I2cSeg::write(self.addr, &mut index)])?;
        self.ready.wait(self.clock.as_ref())?;
        self.i2c.lock().transfer(&mut [I2cSeg::read(self.addr, buf)])
    }

    fn write(&mut self, reg: TisReg, data: &[u8]) -> Result<()> {
        let mut msg = Vec::with_capacity(data.len() + 1);
        msg.push(Self::index(reg));
        msg.extend_from_slice(data);
        self.i2c.lock().transfer(&mut [I2cSeg::write(self.addr, &mut msg)])?;
        self.ready.wait(self.clock.as_ref())
    }
}

pub type Cr50I2c = Tis<I2cTisBus<Cr50Irq>>;

impl Cr50I2c {
    /// cr50 at `addr`; `irq` reports the TPM's ready interrupt.
    ///
    /// Nothing is sent to the TPM until the first command.
    pub fn new(
        i2c: Shared<dyn I2cOps>,
        addr: u16,
        irq: Box<dyn Fn() -> bool>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        check_addr(addr)?;
        info!("cr50 on I2C 0x{:02x}", addr);
        let bus = I2cTisBus {
            i2c,
            addr,
            clock: clock.clone(),
            ready: Cr50Irq(irq),
        };
        Ok(Self::with_bus(bus, clock))
    }
}

pub type TisI2c = Tis<I2cTisBus<SettleDelay>>;

impl TisI2c {
    pub fn new(i2c: Shared<dyn I2cOps>, addr: u16, clock: Arc<dyn Clock>) -> Result<Self> {
        check_addr(addr)?;
        info!("TIS TPM on I2C 0x{:02x}", addr);
        let bus = I2cTisBus {
            i2c,
            addr,
            clock: clock.clone(),
            ready: SettleDelay(SLB9645_SETTLE_US),
        };
        Ok(Self::with_bus(bus, clock))
    }
}
