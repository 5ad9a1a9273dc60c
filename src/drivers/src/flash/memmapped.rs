use alloc::sync::Arc;
use device::{
    flash::{check_range, FlashOps},
    ErrorKind, Result,
};
use log::info;
use oreboot_asm::Mmio;

/// Boot flash decoded into the top of the 32-bit address space
pub struct MemMappedFlash {
    mmio: Arc<dyn Mmio>,
    base: usize,
    size: u32,
}

impl MemMappedFlash {
    pub fn new(mmio: Arc<dyn Mmio>, base: usize, size: u32) -> Result<Self> {
        if size == 0 || base.checked_add(size as usize - 1).is_none() {
            return Err(ErrorKind::InvalidArgument);
        }
        info!("memory mapped flash [0x{:x}, {} KiB]", base, size / 1024);
        Ok(Self { mmio, base, size })
    }
}

impl FlashOps for MemMappedFlash {
    fn size(&self) -> u32 {
        self.size
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        self.mmio.read_bytes(self.base + offset as usize, buf);
        Ok(())
    }
}
