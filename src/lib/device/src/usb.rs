use log::{info, warn};

use crate::pci::{PciConfig, PciDev};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UsbHcType {
    Ohci,
    Uhci,
    Ehci,
    Xhci,
}

/// A USB host controller the boot flow will bring up later.
///
/// Nothing is touched at registration time; only the register base is
/// recorded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UsbHostController {
    pub kind: UsbHcType,
    pub base: usize,
}

impl UsbHostController {
    pub const fn new(kind: UsbHcType, base: usize) -> Self {
        Self { kind, base }
    }

    /// Controller behind BAR0 of `dev`, or `None` when the function is absent
    /// or its BAR is unassigned
    pub fn from_pci(kind: UsbHcType, pci: &dyn PciConfig, dev: PciDev) -> Option<Self> {
        if !pci.present(dev) {
            warn!("USB {:?} at {} not present, skipping", kind, dev);
            return None;
        }
        let base = pci.bar(dev, 0);
        if base == 0 {
            warn!("USB {:?} at {} has no BAR, skipping", kind, dev);
            return None;
        }
        info!("USB {:?} at {} [base 0x{:x}]", kind, dev, base);
        Some(Self::new(kind, base as usize))
    }
}
