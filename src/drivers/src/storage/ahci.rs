use alloc::{format, string::String, sync::Arc};
use device::{
    block::BlockCtrlr,
    pci::{PciConfig, PciDev},
    Result,
};
use log::info;

use super::pci_enable;

/// AHCI base address lives in BAR5 (ABAR)
const AHCI_ABAR: u16 = 5;

pub struct AhciCtrlr {
    pci: Arc<dyn PciConfig>,
    dev: PciDev,
    name: String,
    abar: Option<u32>,
}

impl AhciCtrlr {
    pub fn new(pci: Arc<dyn PciConfig>, dev: PciDev) -> Self {
        Self {
            pci,
            dev,
            name: format!("ahci {}", dev),
            abar: None,
        }
    }

    pub fn dev(&self) -> PciDev {
        self.dev
    }

    pub fn abar(&self) -> Option<u32> {
        self.abar
    }
}

impl BlockCtrlr for AhciCtrlr {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<()> {
        let abar = pci_enable(&self.pci, self.dev, AHCI_ABAR)?;
        info!("{}: ABAR 0x{:x}", self.name, abar);
        self.abar = Some(abar);
        Ok(())
    }

    fn need_update(&self) -> bool {
        self.abar.is_none()
    }
}
