mod memmapped;
mod spi;

pub use self::{memmapped::MemMappedFlash, spi::SpiFlash};
