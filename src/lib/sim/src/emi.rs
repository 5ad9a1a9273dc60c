/// EC side of a MEC EMI window: the address registers and the auto-increment
/// data bytes in front of EC memory.
pub struct EmiWindow {
    base: u16,
    pub mem: [u8; 0x200],
    addr: usize,
    access: u8,
}

impl EmiWindow {
    pub fn new(base: u16) -> Self {
        Self {
            base,
            mem: [0; 0x200],
            addr: 0,
            access: 0,
        }
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn claims(&self, port: u16) -> bool {
        (self.base..self.base + 8).contains(&port)
    }

    fn data_index(&mut self, port: u16) -> Option<usize> {
        let reg = port.checked_sub(self.base)?;
        if !(4..8).contains(&reg) {
            return None;
        }
        let byte = (reg - 4) as usize;
        let index = (self.addr + byte) % self.mem.len();
        Some(index)
    }

    fn after_data(&mut self, port: u16) {
        if port - self.base == 7 && self.access == 3 {
            self.addr = (self.addr + 4) % self.mem.len();
        }
    }

    pub fn read(&mut self, port: u16) -> u8 {
        match self.data_index(port) {
            Some(i) => {
                let v = self.mem[i];
                self.after_data(port);
                v
            }
            None => 0,
        }
    }

    pub fn write(&mut self, port: u16, value: u8) {
        match port - self.base {
            2 => {
                self.access = value & 3;
                self.addr = (self.addr & !0xff) | (value & 0xfc) as usize;
            }
            3 => self.addr = (self.addr & 0xff) | ((value & 0x7f) as usize) << 8,
            _ => {
                if let Some(i) = self.data_index(port) {
                    self.mem[i] = value;
                    self.after_data(port);
                }
            }
        }
    }
}
