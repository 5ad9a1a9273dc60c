use crate::{ErrorKind, Result};

/// struct i2c_msg - an I2C transaction segment beginning with START
/// @flags: I2C_M_RD is handled by all adapters.
/// @slave: Slave address, either seven or ten bits.  When this is a ten
///	bit address, I2C_M_TEN must be set in @flags.
/// @buf: The buffer into which data is read, or from which it's written.
///
/// An I2cSeg is the low level representation of one segment of an I2C
/// transaction.  Each transaction begins with a START.  That is followed by
/// the slave address, and a bit encoding read versus write.  Then follow all
/// the data bytes.  If this is the last segment in a group, it is followed by
/// a STOP.  Otherwise it is followed by the next segment, beginning with a
/// (repeated) START.
pub struct I2cSeg<'a> {
    pub flags: u16,
    pub slave: u16,
    pub buf: &'a mut [u8],
}

impl<'a> I2cSeg<'a> {
    /// read data, from slave to master
    pub const I2C_M_RD: u16 = 0x0001;
    /// this is a ten bit chip address
    pub const I2C_M_TEN: u16 = 0x0010;
    /// don't send a repeated START
    pub const I2C_M_NOSTART: u16 = 0x4000;

    pub fn write(slave: u16, buf: &'a mut [u8]) -> Self {
        Self { flags: 0, slave, buf }
    }

    pub fn read(slave: u16, buf: &'a mut [u8]) -> Self {
        Self {
            flags: Self::I2C_M_RD,
            slave,
            buf,
        }
    }

    pub fn is_read(&self) -> bool {
        self.flags & Self::I2C_M_RD != 0
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum I2cSpeed {
    Standard = 100000,
    Fast = 400000,
    FastPlus = 1000000,
    High = 3400000,
}

impl I2cSpeed {
    pub const fn hz(self) -> u32 {
        self as u32
    }
}

/// An I2C bus master
pub trait I2cOps {
    fn transfer(&mut self, segments: &mut [I2cSeg<'_>]) -> Result<()>;
}

/// Read one register of an 8-bit register device
pub fn i2c_readb(bus: &mut dyn I2cOps, chip: u16, reg: u8) -> Result<u8> {
    let mut addr = [reg];
    let mut data = [0u8];
    bus.transfer(&mut [I2cSeg::write(chip, &mut addr), I2cSeg::read(chip, &mut data)])?;
    Ok(data[0])
}

pub fn i2c_writeb(bus: &mut dyn I2cOps, chip: u16, reg: u8, value: u8) -> Result<()> {
    let mut buf = [reg, value];
    bus.transfer(&mut [I2cSeg::write(chip, &mut buf)])
}

/// Read-modify-write clearing `mask` in register `reg`
pub fn i2c_clear_bits(bus: &mut dyn I2cOps, chip: u16, reg: u8, mask: u8) -> Result<()> {
    let value = i2c_readb(bus, chip, reg)?;
    i2c_writeb(bus, chip, reg, value & !mask)
}

/// Validate a 7-bit slave address
pub fn check_addr(slave: u16) -> Result<()> {
    if slave > 0x7f {
        return Err(ErrorKind::InvalidArgument);
    }
    Ok(())
}
