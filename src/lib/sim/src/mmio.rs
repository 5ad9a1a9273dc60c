use std::{collections::HashMap, sync::Mutex};

use oreboot_asm::Mmio;

/// Sparse byte-addressed memory. Unwritten bytes read as zero.
#[derive(Default)]
pub struct FakeMmio {
    mem: Mutex<HashMap<usize, u8>>,
    writes: Mutex<Vec<(usize, u32)>>,
}

impl FakeMmio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set8(&self, addr: usize, value: u8) {
        self.mem.lock().unwrap().insert(addr, value);
    }

    pub fn set32(&self, addr: usize, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set8(addr + i, b);
        }
    }

    pub fn fill(&self, addr: usize, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.set8(addr + i, *b);
        }
    }

    /// Register writes issued by drivers, in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().unwrap().clone()
    }

    fn get(&self, addr: usize, len: usize) -> u32 {
        let mem = self.mem.lock().unwrap();
        (0..len).fold(0u32, |v, i| v | (*mem.get(&(addr + i)).unwrap_or(&0) as u32) << (8 * i))
    }

    fn put(&self, addr: usize, len: usize, value: u32) {
        self.writes.lock().unwrap().push((addr, value));
        let mut mem = self.mem.lock().unwrap();
        for i in 0..len {
            mem.insert(addr + i, (value >> (8 * i)) as u8);
        }
    }
}

impl Mmio for FakeMmio {
    fn read8(&self, addr: usize) -> u8 {
        self.get(addr, 1) as u8
    }

    fn read16(&self, addr: usize) -> u16 {
        self.get(addr, 2) as u16
    }

    fn read32(&self, addr: usize) -> u32 {
        self.get(addr, 4)
    }

    fn write8(&self, addr: usize, value: u8) {
        self.put(addr, 1, value as u32)
    }

    fn write16(&self, addr: usize, value: u16) {
        self.put(addr, 2, value as u32)
    }

    fn write32(&self, addr: usize, value: u32) {
        self.put(addr, 4, value)
    }
}
