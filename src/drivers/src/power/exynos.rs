use alloc::sync::Arc;
use device::{power::PowerOps, ErrorKind, Result};
use oreboot_asm::Mmio;

pub const EXYNOS5_POWER_BASE: usize = 0x1004_0000;

const SW_RESET: usize = 0x400;
const PS_HOLD_CONTROL: usize = 0x330c;
const PS_HOLD_EN: u32 = 1 << 8;

/// Exynos5 PMU: software reset and PS_HOLD release
pub struct ExynosPower {
    mmio: Arc<dyn Mmio>,
    base: usize,
}

impl ExynosPower {
    pub fn new(mmio: Arc<dyn Mmio>) -> Self {
        Self {
            mmio,
            base: EXYNOS5_POWER_BASE,
        }
    }
}

impl PowerOps for ExynosPower {
    fn cold_reboot(&mut self) -> Result<()> {
        self.mmio.write32(self.base + SW_RESET, 1);
        Err(ErrorKind::Timeout)
    }

    fn power_off(&mut self) -> Result<()> {
        self.mmio.clrsetbits32(self.base + PS_HOLD_CONTROL, PS_HOLD_EN, 0);
        Err(ErrorKind::Timeout)
    }
}
