use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    emi::EmiWindow,
    port::{PortBus, PortDevice},
};

const STATUS_PENDING: u8 = 1 << 1;
const STATUS_BUSY: u8 = 1 << 2;
const MAILBOX_START: u8 = 0x0f;
const DATA_SIZE: usize = 32;

/// A request as it arrived in EC memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WilcoRequest {
    pub command: u8,
    pub data: Vec<u8>,
    pub raw: Vec<u8>,
}

/// Wilco EC mailbox, host side ports plus the EMI packet window
pub struct WilcoSim {
    host_base: u16,
    emi: EmiWindow,
    polls_left: usize,
    stalled: bool,
    responses: HashMap<u8, Vec<u8>>,
    /// Busy polls before each command completes
    pub busy_polls: usize,
    /// Number of upcoming commands that never complete
    pub stall_commands: usize,
    /// Value of the data port error flag
    pub error_flag: u8,
    pub result: u16,
    /// Data size to report instead of 32
    pub data_size: Option<u16>,
    pub corrupt_checksum: bool,
    pub requests: Vec<WilcoRequest>,
    /// Start commands seen, including ones that stalled
    pub starts: usize,
}

impl WilcoSim {
    pub fn new(host_base: u16, emi_base: u16) -> Self {
        Self {
            host_base,
            emi: EmiWindow::new(emi_base),
            polls_left: 0,
            stalled: false,
            responses: HashMap::new(),
            busy_polls: 0,
            stall_commands: 0,
            error_flag: 0,
            result: 0,
            data_size: None,
            corrupt_checksum: false,
            requests: Vec::new(),
            starts: 0,
        }
    }

    /// Map the host ports and the EMI window onto `bus`
    pub fn attach(self, bus: &PortBus) -> Arc<Mutex<Self>> {
        let host = self.host_base;
        let emi = self.emi.base();
        let sim = Arc::new(Mutex::new(self));
        bus.map(host..host + 8, sim.clone());
        bus.map(emi..emi + 8, sim.clone());
        sim
    }

    /// Payload returned for `command`, zero padded to 32 bytes
    pub fn respond(&mut self, command: u8, data: &[u8]) {
        self.responses.insert(command, data.to_vec());
    }

    fn start(&mut self) {
        self.starts += 1;
        let mem = &self.emi.mem;
        let data_size = u16::from_le_bytes([mem[6], mem[7]]) as usize;
        let len = (8 + data_size).min(mem.len());
        let raw = mem[..len].to_vec();
        let command = raw.get(8).copied().unwrap_or(0);
        let data = raw.get(10..).map(<[u8]>::to_vec).unwrap_or_default();
        self.requests.push(WilcoRequest { command, data, raw });

        if self.stall_commands > 0 {
            self.stall_commands -= 1;
            self.stalled = true;
            return;
        }
        self.stalled = false;
        self.polls_left = self.busy_polls;

        let mut payload = self.responses.get(&command).cloned().unwrap_or_default();
        payload.resize(DATA_SIZE, 0);
        let mem = &mut self.emi.mem;
        mem[..2].copy_from_slice(&self.result.to_le_bytes());
        let size = self.data_size.unwrap_or(DATA_SIZE as u16);
        mem[2..4].copy_from_slice(&size.to_le_bytes());
        mem[4] = 0;
        mem[5] = 0;
        mem[6..6 + DATA_SIZE].copy_from_slice(&payload);
        let sum = mem[..6 + DATA_SIZE].iter().fold(0u8, |a, b| a.wrapping_add(*b));
        mem[4] = sum.wrapping_neg();
        if self.corrupt_checksum {
            mem[4] = mem[4].wrapping_add(1);
        }
    }

    fn status(&mut self) -> u8 {
        if self.stalled {
            return STATUS_PENDING | STATUS_BUSY;
        }
        if self.polls_left > 0 {
            self.polls_left -= 1;
            return STATUS_BUSY;
        }
        0
    }
}

impl PortDevice for WilcoSim {
    fn read(&mut self, port: u16) -> u8 {
        if self.emi.claims(port) {
            return self.emi.read(port);
        }
        match port - self.host_base {
            0 => self.error_flag,
            4 => self.status(),
            _ => 0xff,
        }
    }

    fn write(&mut self, port: u16, value: u8) {
        if self.emi.claims(port) {
            return self.emi.write(port, value);
        }
        if port - self.host_base == 4 && value == MAILBOX_START {
            self.start();
        }
    }
}
