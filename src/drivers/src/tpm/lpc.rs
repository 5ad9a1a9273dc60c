use alloc::sync::Arc;
use device::{ErrorKind, Result};
use log::{info, warn};
use oreboot_asm::Mmio;
use util::timer::Clock;

use super::{Tis, TisBus, TisReg};

/// Standard TIS window for locality 0
pub const LPC_TPM_BASE: usize = 0xfed4_0000;

/// Memory mapped TIS registers, whether the TPM sits on LPC or on SPI behind
/// a bridge that decodes the same window
pub struct LpcTisBus {
    mmio: Arc<dyn Mmio>,
    base: usize,
}

impl LpcTisBus {
    fn offset(reg: TisReg) -> usize {
        match reg {
            TisReg::Access => 0x0000,
            TisReg::Sts => 0x0018,
            TisReg::Fifo => 0x0024,
            TisReg::DidVid => 0x0f00,
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }
}

impl TisBus for LpcTisBus {
    fn read(&mut self, reg: TisReg, buf: &mut [u8]) -> Result<()> {
        let addr = self.base + Self::offset(reg);
        for (i, b) in buf.iter_mut().enumerate() {
            // The FIFO is a single byte-wide port.
            *b = match reg {
                TisReg::Fifo => self.mmio.read8(addr),
                _ => self.mmio.read8(addr + i),
            };
        }
        Ok(())
    }

    fn write(&mut self, reg: TisReg, data: &[u8]) -> Result<()> {
        let addr = self.base + Self::offset(reg);
        for (i, b) in data.iter().enumerate() {
            match reg {
                TisReg::Fifo => self.mmio.write8(addr, *b),
                _ => self.mmio.write8(addr + i, *b),
            }
        }
        Ok(())
    }
}

pub type LpcTpm = Tis<LpcTisBus>;

impl LpcTpm {
    /// Probe the TIS window at `base`; an all-zero or all-ones DID_VID means
    /// nothing decodes there.
    pub fn new(mmio: Arc<dyn Mmio>, clock: Arc<dyn Clock>, base: usize) -> Result<Self> {
        let mut tpm = Self::with_bus(LpcTisBus { mmio, base }, clock);
        match tpm.did_vid()? {
            (0, 0) | (0xffff, 0xffff) => {
                warn!("LPC TPM: nothing at 0x{:x}", base);
                Err(ErrorKind::NoDevice)
            }
            (vid, did) => {
                info!("LPC TPM: vid 0x{:04x} did 0x{:04x} at 0x{:x}", vid, did, base);
                Ok(tpm)
            }
        }
    }
}
