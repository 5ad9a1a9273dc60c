use device::{
    flash::{check_range, FlashOps},
    spi::{with_bus, SpiOps},
    ErrorKind, Result, Shared,
};
use log::info;

const SPI_FLASH_READ: u8 = 0x03;
/// Most bytes moved per read command
const SPI_FLASH_READ_CHUNK: usize = 0x1000;

/// SPI NOR flash read with the plain READ command
pub struct SpiFlash {
    spi: Shared<dyn SpiOps>,
    size: u32,
}

impl SpiFlash {
    pub fn new(spi: Shared<dyn SpiOps>, size: u32) -> Result<Self> {
        if size == 0 || size > 1 << 24 {
            return Err(ErrorKind::InvalidArgument);
        }
        info!("SPI flash [{} KiB]", size / 1024);
        Ok(Self { spi, size })
    }
}

impl FlashOps for SpiFlash {
    fn size(&self) -> u32 {
        self.size
    }

    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        let mut spi = self.spi.lock();
        let mut addr = offset;
        for chunk in buf.chunks_mut(SPI_FLASH_READ_CHUNK) {
            let a = addr.to_be_bytes();
            let cmd = [SPI_FLASH_READ, a[1], a[2], a[3]];
            with_bus(&mut *spi, |s| s.transfer(&cmd, chunk))?;
            addr += chunk.len() as u32;
        }
        Ok(())
    }
}
