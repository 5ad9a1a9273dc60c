use core::ptr::{read_volatile, write_volatile};

///! Memory-mapped IO accessors, modelled on u-boot's <arch/arm/include/asm/io.h>

/// Byte/word/long access to a memory-mapped register window.
///
/// Drivers receive an `Mmio` instead of touching addresses directly so the
/// same code runs against real hardware ([`Volatile`]) or a simulated window.
pub trait Mmio {
    fn read8(&self, addr: usize) -> u8;
    fn read16(&self, addr: usize) -> u16;
    fn read32(&self, addr: usize) -> u32;
    fn write8(&self, addr: usize, value: u8);
    fn write16(&self, addr: usize, value: u16);
    fn write32(&self, addr: usize, value: u32);

    /// Copy `buf.len()` bytes starting at `addr`
    fn read_bytes(&self, addr: usize, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read8(addr + i);
        }
    }

    /// Read-modify-write clearing `clear` and setting `set`
    fn clrsetbits32(&self, addr: usize, clear: u32, set: u32) {
        let v = self.read32(addr);
        self.write32(addr, (v & !clear) | set);
    }
}

/// Physical MMIO through volatile pointer accesses.
///
/// Every address handed to it must be a mapped device or memory window.
#[derive(Clone, Copy, Debug, Default)]
pub struct Volatile;

impl Mmio for Volatile {
    fn read8(&self, addr: usize) -> u8 {
        readb(addr)
    }

    fn read16(&self, addr: usize) -> u16 {
        readw(addr)
    }

    fn read32(&self, addr: usize) -> u32 {
        readl(addr)
    }

    fn write8(&self, addr: usize, value: u8) {
        writeb(value, addr)
    }

    fn write16(&self, addr: usize, value: u16) {
        writew(value, addr)
    }

    fn write32(&self, addr: usize, value: u32) {
        writel(value, addr)
    }
}

fn _raw_readb(a: usize) -> u8 {
    unsafe { read_volatile::<u8>(a as *const u8) }
}

fn _raw_readw(a: usize) -> u16 {
    unsafe { read_volatile::<u16>(a as *const u16) }
}

fn _raw_readl(a: usize) -> u32 {
    unsafe { read_volatile::<u32>(a as *const u32) }
}

fn _raw_writeb(v: u8, a: usize) {
    unsafe { write_volatile::<u8>(a as *mut u8, v) }
}

fn _raw_writew(v: u16, a: usize) {
    unsafe { write_volatile::<u16>(a as *mut u16, v) }
}

fn _raw_writel(v: u32, a: usize) {
    unsafe { write_volatile::<u32>(a as *mut u32, v) }
}

pub fn readb(c: usize) -> u8 {
    _raw_readb(c)
}

/// Registers are little-endian regardless of host order
pub fn readw(c: usize) -> u16 {
    u16::from_le(_raw_readw(c))
}

pub fn readl(c: usize) -> u32 {
    u32::from_le(_raw_readl(c))
}

pub fn writeb(v: u8, c: usize) {
    _raw_writeb(v, c);
}

pub fn writew(v: u16, c: usize) {
    _raw_writew(v.to_le(), c);
}

pub fn writel(v: u32, c: usize) {
    _raw_writel(v.to_le(), c);
}
