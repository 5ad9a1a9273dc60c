use alloc::{format, string::String, sync::Arc};
use bitflags::bitflags;
use device::{
    block::BlockCtrlr,
    pci::{PciConfig, PciDev},
    ErrorKind, Result,
};
use log::{debug, info};
use oreboot_asm::Mmio;

use super::pci_enable;

bitflags! {
    /// Controller quirks a board knows about
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct SdhciPlatform: u32 {
        const NO_EMMC_HS200 = 1 << 0;
        const CLEAR_TRANSFER_BEFORE_CMD = 1 << 1;
        const REMOVABLE = 1 << 2;
    }
}

const SDHCI_HOST_VERSION: usize = 0xfe;
const SDHCI_SPEC_VER_MASK: u16 = 0xff;

enum Location {
    Pci(PciDev),
    Mmio(usize),
}

pub struct SdhciHost {
    pci: Arc<dyn PciConfig>,
    mmio: Arc<dyn Mmio>,
    location: Location,
    platform: SdhciPlatform,
    clock_min: u32,
    clock_max: u32,
    name: String,
    base: Option<usize>,
}

impl SdhciHost {
    fn check_clocks(clock_min: u32, clock_max: u32) -> Result<()> {
        if clock_min == 0 || clock_min > clock_max {
            return Err(ErrorKind::InvalidArgument);
        }
        Ok(())
    }

    /// Host on a PCI function, registers behind BAR0
    pub fn new_pci(
        pci: Arc<dyn PciConfig>,
        mmio: Arc<dyn Mmio>,
        dev: PciDev,
        platform: SdhciPlatform,
        clock_min: u32,
        clock_max: u32,
    ) -> Result<Self> {
        Self::check_clocks(clock_min, clock_max)?;
        debug!("sdhci {}: {:?}", dev, platform);
        Ok(Self {
            pci,
            mmio,
            location: Location::Pci(dev),
            platform,
            clock_min,
            clock_max,
            name: format!("sdhci {}", dev),
            base: None,
        })
    }

    /// Host at a fixed MMIO base
    pub fn new_mmio(
        pci: Arc<dyn PciConfig>,
        mmio: Arc<dyn Mmio>,
        base: usize,
        platform: SdhciPlatform,
        clock_min: u32,
        clock_max: u32,
    ) -> Result<Self> {
        Self::check_clocks(clock_min, clock_max)?;
        Ok(Self {
            pci,
            mmio,
            location: Location::Mmio(base),
            platform,
            clock_min,
            clock_max,
            name: format!("sdhci 0x{:x}", base),
            base: None,
        })
    }

    pub fn platform(&self) -> SdhciPlatform {
        self.platform
    }

    pub fn clock_range(&self) -> (u32, u32) {
        (self.clock_min, self.clock_max)
    }

    pub fn pci_dev(&self) -> Option<PciDev> {
        match self.location {
            Location::Pci(dev) => Some(dev),
            Location::Mmio(_) => None,
        }
    }

    pub fn is_removable(&self) -> bool {
        self.platform.contains(SdhciPlatform::REMOVABLE)
    }
}

impl BlockCtrlr for SdhciHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<()> {
        let base = match self.location {
            Location::Pci(dev) => pci_enable(&self.pci, dev, 0)? as usize,
            Location::Mmio(base) => base,
        };
        let version = self.mmio.read16(base + SDHCI_HOST_VERSION) & SDHCI_SPEC_VER_MASK;
        info!("{}: spec version {}", self.name, version + 1);
        self.base = Some(base);
        Ok(())
    }

    fn need_update(&self) -> bool {
        self.base.is_none()
    }
}
