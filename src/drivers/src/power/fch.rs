use alloc::sync::Arc;
use device::{power::PowerOps, ErrorKind, Result};
use log::info;
use oreboot_asm::PortIo;

use super::{FULL_RST, RST_CNT, RST_CPU, SLP_EN, SLP_TYP, SLP_TYP_S5, SLP_TYP_SHIFT, SYS_RST};

/// PM1 control block programmed by firmware on Stoney Ridge and Picasso
pub const FCH_PM1_CNT_BLK: u16 = 0x404;

/// AMD FCH reset and soft-off
pub struct FchPower {
    io: Arc<dyn PortIo>,
    pm1_cnt: u16,
}

impl FchPower {
    pub fn new(io: Arc<dyn PortIo>) -> Self {
        Self::with_pm1_cnt(io, FCH_PM1_CNT_BLK)
    }

    pub fn with_pm1_cnt(io: Arc<dyn PortIo>, pm1_cnt: u16) -> Self {
        Self { io, pm1_cnt }
    }
}

impl PowerOps for FchPower {
    fn cold_reboot(&mut self) -> Result<()> {
        info!("FCH: full reset");
        self.io.outb(RST_CNT, SYS_RST | RST_CPU | FULL_RST);
        Err(ErrorKind::Timeout)
    }

    fn power_off(&mut self) -> Result<()> {
        let mut reg = self.io.inw(self.pm1_cnt) as u32;
        reg &= !SLP_TYP;
        reg |= SLP_TYP_S5 << SLP_TYP_SHIFT | SLP_EN;
        self.io.outw(self.pm1_cnt, reg as u16);
        Err(ErrorKind::Timeout)
    }
}
