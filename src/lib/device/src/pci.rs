//! PCI configuration space access.

use core::fmt;

pub const PCI_VENDOR_ID: u16 = 0x00;
pub const PCI_DEVICE_ID: u16 = 0x02;
pub const PCI_COMMAND: u16 = 0x04;
pub const PCI_COMMAND_MEMORY: u16 = 0x2;
pub const PCI_COMMAND_MASTER: u16 = 0x4;
pub const PCI_BASE_ADDRESS_0: u16 = 0x10;
pub const PCI_BASE_ADDRESS_5: u16 = 0x24;
pub const PCI_BASE_ADDRESS_MEM_MASK: u32 = !0xf;

/// Bus/device/function triple
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct PciDev {
    pub bus: u8,
    pub dev: u8,
    pub func: u8,
}

impl PciDev {
    pub const fn new(bus: u8, dev: u8, func: u8) -> Self {
        Self { bus, dev, func }
    }
}

impl fmt::Debug for PciDev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{:x}", self.bus, self.dev, self.func)
    }
}

impl fmt::Display for PciDev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub trait PciConfig {
    fn read32(&self, dev: PciDev, reg: u16) -> u32;
    fn write32(&self, dev: PciDev, reg: u16, value: u32);

    fn read16(&self, dev: PciDev, reg: u16) -> u16 {
        (self.read32(dev, reg & !3) >> ((reg & 2) * 8)) as u16
    }

    fn write16(&self, dev: PciDev, reg: u16, value: u16) {
        let shift = (reg & 2) * 8;
        let old = self.read32(dev, reg & !3);
        let new = (old & !(0xffff << shift)) | ((value as u32) << shift);
        self.write32(dev, reg & !3, new);
    }

    /// Memory BAR `index` with the type bits masked off; zero if unassigned
    fn bar(&self, dev: PciDev, index: u16) -> u32 {
        self.read32(dev, PCI_BASE_ADDRESS_0 + index * 4) & PCI_BASE_ADDRESS_MEM_MASK
    }

    /// Whether anything answers at `dev`
    fn present(&self, dev: PciDev) -> bool {
        !matches!(self.read16(dev, PCI_VENDOR_ID), 0 | 0xffff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct OneReg(Cell<u32>);

    impl PciConfig for OneReg {
        fn read32(&self, _dev: PciDev, _reg: u16) -> u32 {
            self.0.get()
        }

        fn write32(&self, _dev: PciDev, _reg: u16, value: u32) {
            self.0.set(value)
        }
    }

    #[test]
    fn sub_dword_access() {
        let cfg = OneReg(Cell::new(0x1234_8086));
        let dev = PciDev::new(0, 0x1d, 4);
        assert_eq!(cfg.read16(dev, PCI_VENDOR_ID), 0x8086);
        assert_eq!(cfg.read16(dev, PCI_DEVICE_ID), 0x1234);
        cfg.write16(dev, PCI_DEVICE_ID, 0xabcd);
        assert_eq!(cfg.0.get(), 0xabcd_8086);
        assert!(cfg.present(dev));
    }

    #[test]
    fn bar_masks_type_bits() {
        let cfg = OneReg(Cell::new(0xfe00_000c));
        assert_eq!(cfg.bar(PciDev::new(0, 0x17, 0), 0), 0xfe00_0000);
    }

    #[test]
    fn formats_as_bdf() {
        assert_eq!(alloc::format!("{}", PciDev::new(1, 0, 0)), "01:00.0");
    }
}
