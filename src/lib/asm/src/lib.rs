#![no_std]

mod io;
mod port;

pub use self::{
    io::{readb, readl, readw, writeb, writel, writew, Mmio, Volatile},
    port::PortIo,
};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use self::port::Ports;
