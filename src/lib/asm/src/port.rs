/// x86 I/O port space.
///
/// Port accesses are not idempotent (a read may clear status, a write may
/// start a command), so implementations must issue exactly one bus cycle per
/// call.
pub trait PortIo {
    fn inb(&self, port: u16) -> u8;
    fn outb(&self, port: u16, value: u8);

    fn inw(&self, port: u16) -> u16;
    fn outw(&self, port: u16, value: u16);

    fn inl(&self, port: u16) -> u32;
    fn outl(&self, port: u16, value: u32);
}

/// The CPU's own port space through `in`/`out` instructions.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct Ports;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for Ports {
    fn inb(&self, port: u16) -> u8 {
        let value: u8;
        unsafe {
            core::arch::asm!("in al, dx", out("al") value, in("dx") port,
                options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn outb(&self, port: u16, value: u8) {
        unsafe {
            core::arch::asm!("out dx, al", in("dx") port, in("al") value,
                options(nomem, nostack, preserves_flags));
        }
    }

    fn inw(&self, port: u16) -> u16 {
        let value: u16;
        unsafe {
            core::arch::asm!("in ax, dx", out("ax") value, in("dx") port,
                options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn outw(&self, port: u16, value: u16) {
        unsafe {
            core::arch::asm!("out dx, ax", in("dx") port, in("ax") value,
                options(nomem, nostack, preserves_flags));
        }
    }

    fn inl(&self, port: u16) -> u32 {
        let value: u32;
        unsafe {
            core::arch::asm!("in eax, dx", out("eax") value, in("dx") port,
                options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn outl(&self, port: u16, value: u32) {
        unsafe {
            core::arch::asm!("out dx, eax", in("dx") port, in("eax") value,
                options(nomem, nostack, preserves_flags));
        }
    }
}
