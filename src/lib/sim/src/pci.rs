use std::{collections::HashMap, sync::Mutex};

use device::pci::{PciConfig, PciDev, PCI_BASE_ADDRESS_0};

/// Config space with only the registers a test populated.
///
/// Missing registers read as all ones, like an empty slot.
#[derive(Default)]
pub struct FakePci {
    regs: Mutex<HashMap<(PciDev, u16), u32>>,
}

impl FakePci {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, dev: PciDev, reg: u16, value: u32) {
        self.regs.lock().unwrap().insert((dev, reg), value);
    }

    /// Present a device with `vendor`/`device` ids and memory BAR0 at `bar0`
    pub fn add_device(&self, dev: PciDev, vendor: u16, device: u16, bar0: u32) {
        self.set(dev, 0, (device as u32) << 16 | vendor as u32);
        self.set(dev, PCI_BASE_ADDRESS_0, bar0);
    }

    pub fn get(&self, dev: PciDev, reg: u16) -> Option<u32> {
        self.regs.lock().unwrap().get(&(dev, reg)).copied()
    }
}

impl PciConfig for FakePci {
    fn read32(&self, dev: PciDev, reg: u16) -> u32 {
        self.get(dev, reg).unwrap_or(0xffff_ffff)
    }

    fn write32(&self, dev: PciDev, reg: u16, value: u32) {
        self.set(dev, reg, value)
    }
}
