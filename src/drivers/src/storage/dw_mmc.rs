use alloc::{format, string::String, sync::Arc};
use device::{block::BlockCtrlr, ErrorKind, Result};
use log::info;
use oreboot_asm::Mmio;

const DWMCI_VERID: usize = 0x6c;
const DWMCI_CLKSEL: usize = 0x9c;

/// CLKSEL value from sample phase, drive phase and divider ratio
pub const fn dwmci_clksel(sample: u32, drive: u32, div_ratio: u32) -> u32 {
    (sample & 0x7) | (drive & 0x7) << 16 | (div_ratio & 0x7) << 24
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DwmciWidth {
    One = 1,
    Four = 4,
    Eight = 8,
}

impl TryFrom<u32> for DwmciWidth {
    type Error = ErrorKind;

    fn try_from(width: u32) -> Result<Self> {
        match width {
            1 => Ok(Self::One),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => Err(ErrorKind::InvalidArgument),
        }
    }
}

/// Synopsys DesignWare MMC host, as found on Exynos
pub struct DwmciHost {
    mmio: Arc<dyn Mmio>,
    base: usize,
    src_hz: u32,
    width: DwmciWidth,
    removable: bool,
    clksel: u32,
    name: String,
    ready: bool,
}

impl DwmciHost {
    pub fn new(
        mmio: Arc<dyn Mmio>,
        base: usize,
        src_hz: u32,
        width: u32,
        removable: bool,
        clksel: u32,
    ) -> Result<Self> {
        if src_hz == 0 {
            return Err(ErrorKind::InvalidArgument);
        }
        Ok(Self {
            mmio,
            base,
            src_hz,
            width: DwmciWidth::try_from(width)?,
            removable,
            clksel,
            name: format!("dwmmc 0x{:x}", base),
            ready: false,
        })
    }

    pub fn width(&self) -> DwmciWidth {
        self.width
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    pub fn src_hz(&self) -> u32 {
        self.src_hz
    }
}

impl BlockCtrlr for DwmciHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<()> {
        let ver = self.mmio.read32(self.base + DWMCI_VERID);
        if ver == 0 || ver == 0xffff_ffff {
            return Err(ErrorKind::NoDevice);
        }
        if self.clksel != 0 {
            self.mmio.write32(self.base + DWMCI_CLKSEL, self.clksel);
        }
        info!("{}: version 0x{:x}, {} bit", self.name, ver & 0xffff, self.width as u32);
        self.ready = true;
        Ok(())
    }

    fn need_update(&self) -> bool {
        !self.ready
    }
}
