use crate::{ErrorKind, Result};

/// Read access to the boot flash
pub trait FlashOps {
    /// Size of the flash part in bytes
    fn size(&self) -> u32;

    /// Fill `buf` from flash starting at `offset`
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;
}

/// Reject accesses that run past the end of a `size`-byte part
pub fn check_range(offset: u32, len: usize, size: u32) -> Result<()> {
    let end = (offset as u64).checked_add(len as u64).ok_or(ErrorKind::OutOfRange)?;
    if end > size as u64 {
        return Err(ErrorKind::OutOfRange);
    }
    Ok(())
}
