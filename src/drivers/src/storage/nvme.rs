use alloc::{format, string::String, sync::Arc};
use device::{
    block::BlockCtrlr,
    pci::{PciConfig, PciDev},
    Result,
};
use log::info;

use super::pci_enable;

/// NVMe controller behind a PCIe root port.
///
/// Boards list every port an SSD may sit behind; empty ports fail `update`
/// and are skipped by enumeration.
pub struct NvmeCtrlr {
    pci: Arc<dyn PciConfig>,
    dev: PciDev,
    name: String,
    bar: Option<u32>,
}

impl NvmeCtrlr {
    pub fn new(pci: Arc<dyn PciConfig>, dev: PciDev) -> Self {
        Self {
            pci,
            dev,
            name: format!("nvme {}", dev),
            bar: None,
        }
    }

    pub fn dev(&self) -> PciDev {
        self.dev
    }
}

impl BlockCtrlr for NvmeCtrlr {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<()> {
        let bar = pci_enable(&self.pci, self.dev, 0)?;
        info!("{}: registers at 0x{:x}", self.name, bar);
        self.bar = Some(bar);
        Ok(())
    }

    fn need_update(&self) -> bool {
        self.bar.is_none()
    }
}
