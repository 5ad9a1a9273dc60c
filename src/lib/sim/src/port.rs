use std::{
    ops::Range,
    sync::{Arc, Mutex},
};

use oreboot_asm::PortIo;

/// A device decoding a range of I/O ports
pub trait PortDevice: Send {
    fn read(&mut self, port: u16) -> u8;
    fn write(&mut self, port: u16, value: u8);
}

/// I/O port space routing accesses to mapped devices.
///
/// Unclaimed reads float high. Wider accesses are split into little-endian
/// byte cycles.
#[derive(Default)]
pub struct PortBus {
    devices: Mutex<Vec<(Range<u16>, Arc<Mutex<dyn PortDevice>>)>>,
    log: Mutex<Vec<(u16, u8)>>,
}

impl PortBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self, ports: Range<u16>, dev: Arc<Mutex<dyn PortDevice>>) {
        self.devices.lock().unwrap().push((ports, dev));
    }

    /// Every byte written so far, in order
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.log.lock().unwrap().clone()
    }

    fn find(&self, port: u16) -> Option<Arc<Mutex<dyn PortDevice>>> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|(r, _)| r.contains(&port))
            .map(|(_, d)| d.clone())
    }
}

impl PortIo for PortBus {
    fn inb(&self, port: u16) -> u8 {
        match self.find(port) {
            Some(dev) => dev.lock().unwrap().read(port),
            None => 0xff,
        }
    }

    fn outb(&self, port: u16, value: u8) {
        self.log.lock().unwrap().push((port, value));
        if let Some(dev) = self.find(port) {
            dev.lock().unwrap().write(port, value);
        }
    }

    fn inw(&self, port: u16) -> u16 {
        u16::from_le_bytes([self.inb(port), self.inb(port + 1)])
    }

    fn outw(&self, port: u16, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.outb(port + i as u16, b);
        }
    }

    fn inl(&self, port: u16) -> u32 {
        let mut b = [0u8; 4];
        for (i, v) in b.iter_mut().enumerate() {
            *v = self.inb(port + i as u16);
        }
        u32::from_le_bytes(b)
    }

    fn outl(&self, port: u16, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.outb(port + i as u16, b);
        }
    }
}
