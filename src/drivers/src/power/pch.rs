use alloc::sync::Arc;
use device::{power::PowerOps, ErrorKind, Result};
use log::info;
use oreboot_asm::PortIo;

use super::{FULL_RST, RST_CNT, RST_CPU, SLP_EN, SLP_TYP, SLP_TYP_S5, SLP_TYP_SHIFT, SYS_RST};

const PM1_STS: u16 = 0x00;
const PM1_CNT: u16 = 0x04;
const GPE0_EN: u16 = 0x70;
const GPE0_EN_COUNT: u16 = 4;
const PWRBTN_STS: u16 = 1 << 8;

/// Intel PCH reset and S5 entry through the ACPI PM block at `pmbase`
pub struct PchPower {
    io: Arc<dyn PortIo>,
    pmbase: u16,
}

impl PchPower {
    pub fn new(io: Arc<dyn PortIo>, pmbase: u16) -> Self {
        Self { io, pmbase }
    }

    pub fn pmbase(&self) -> u16 {
        self.pmbase
    }
}

impl PowerOps for PchPower {
    fn cold_reboot(&mut self) -> Result<()> {
        info!("PCH: full reset");
        self.io.outb(RST_CNT, SYS_RST | RST_CPU | FULL_RST);
        Err(ErrorKind::Timeout)
    }

    fn power_off(&mut self) -> Result<()> {
        // Wake events left enabled would bring the system straight back.
        for i in 0..GPE0_EN_COUNT {
            self.io.outl(self.pmbase + GPE0_EN + i * 4, 0);
        }
        self.io.outw(self.pmbase + PM1_STS, PWRBTN_STS);

        let cnt = self.pmbase + PM1_CNT;
        let mut reg = self.io.inl(cnt);
        reg &= !SLP_TYP;
        reg |= SLP_TYP_S5 << SLP_TYP_SHIFT;
        self.io.outl(cnt, reg);
        self.io.outl(cnt, reg | SLP_EN);
        Err(ErrorKind::Timeout)
    }
}
