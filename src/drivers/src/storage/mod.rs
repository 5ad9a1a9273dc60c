//! Block device controllers.
//!
//! Construction only records where a controller lives. Probing happens in
//! [`BlockCtrlr::update`](device::block::BlockCtrlr::update), which the boot
//! flow calls before it enumerates media.

mod ahci;
mod dw_mmc;
mod nvme;
mod sdhci;

pub use self::{
    ahci::AhciCtrlr,
    dw_mmc::{dwmci_clksel, DwmciHost, DwmciWidth},
    nvme::NvmeCtrlr,
    sdhci::{SdhciHost, SdhciPlatform},
};

use alloc::sync::Arc;
use device::{
    pci::{PciConfig, PciDev, PCI_COMMAND, PCI_COMMAND_MASTER, PCI_COMMAND_MEMORY},
    ErrorKind, Result,
};
use log::warn;

/// Enable decoding and bus mastering on `dev`, returning its memory BAR
fn pci_enable(pci: &Arc<dyn PciConfig>, dev: PciDev, bar: u16) -> Result<u32> {
    if !pci.present(dev) {
        warn!("{}: no device", dev);
        return Err(ErrorKind::NoDevice);
    }
    let base = pci.bar(dev, bar);
    if base == 0 {
        warn!("{}: BAR{} not assigned", dev, bar);
        return Err(ErrorKind::NoDevice);
    }
    let cmd = pci.read16(dev, PCI_COMMAND);
    pci.write16(dev, PCI_COMMAND, cmd | PCI_COMMAND_MEMORY | PCI_COMMAND_MASTER);
    Ok(base)
}
