//! Microchip MEC embedded memory interface (EMI).
//!
//! The EMI is an eight byte I/O window onto EC memory. The host programs an
//! address into bytes 2-3 and then moves data through bytes 4-7. In 32-bit
//! auto-increment mode the EC advances the address by four every time data
//! byte 3 is accessed, so a packet can be streamed with byte accesses only.

use oreboot_asm::PortIo;

/// Host to EC mailbox
pub const MEC_EMI_HOST_TO_EC: u16 = 0;
/// EC to host mailbox
pub const MEC_EMI_EC_TO_HOST: u16 = 1;
pub const MEC_EMI_EC_ADDRESS_B0: u16 = 2;
pub const MEC_EMI_EC_ADDRESS_B1: u16 = 3;
pub const MEC_EMI_EC_DATA_B0: u16 = 4;
pub const MEC_EMI_EC_DATA_B3: u16 = 7;

/// Access type encoded in bits 1:0 of the address LSB
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EmiAccess {
    Byte = 0,
    Word = 1,
    Long = 2,
    LongAutoIncrement = 3,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MecEmi {
    base: u16,
}

impl MecEmi {
    pub const fn new(base: u16) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> u16 {
        self.base
    }

    fn set_addr(&self, io: &dyn PortIo, offset: u16) {
        io.outb(
            self.base + MEC_EMI_EC_ADDRESS_B0,
            (offset & 0xfc) as u8 | EmiAccess::LongAutoIncrement as u8,
        );
        io.outb(self.base + MEC_EMI_EC_ADDRESS_B1, ((offset >> 8) & 0x7f) as u8);
    }

    /// Walk `len` bytes from EC memory `offset`, handing `f` the data port
    /// and buffer index for each byte
    fn io_bytes(&self, io: &dyn PortIo, offset: u16, len: usize, mut f: impl FnMut(u16, usize)) {
        self.set_addr(io, offset);
        let mut port = self.base + MEC_EMI_EC_DATA_B0 + (offset & 3);
        let mut offset = offset;
        for i in 0..len {
            f(port, i);
            offset = offset.wrapping_add(1);
            port += 1;
            // Address advanced by the EC after the access to data byte 3
            if offset & 3 == 0 {
                port = self.base + MEC_EMI_EC_DATA_B0;
            }
        }
    }

    /// Write `data` at EC memory `offset`, returning the 8-bit sum of the
    /// bytes written
    pub fn write(&self, io: &dyn PortIo, offset: u16, data: &[u8]) -> u8 {
        let mut sum = 0u8;
        self.io_bytes(io, offset, data.len(), |port, i| {
            io.outb(port, data[i]);
            sum = sum.wrapping_add(data[i]);
        });
        sum
    }

    /// Fill `buf` from EC memory `offset`, returning the 8-bit sum of the
    /// bytes read
    pub fn read(&self, io: &dyn PortIo, offset: u16, buf: &mut [u8]) -> u8 {
        let mut sum = 0u8;
        let len = buf.len();
        self.io_bytes(io, offset, len, |port, i| {
            buf[i] = io.inb(port);
            sum = sum.wrapping_add(buf[i]);
        });
        sum
    }
}
