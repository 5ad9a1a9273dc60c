use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use device::{spi::SpiOps, ErrorKind};

use crate::{
    emi::EmiWindow,
    port::{PortBus, PortDevice},
};

const HOST_DATA: u16 = 0x200;
const HOST_CMD: u16 = 0x204;
const HOST_PACKET: u16 = 0x800;
const PACKET_SIZE: usize = 0x100;
const PROTOCOL_3: u8 = 0xda;
const STATUS_PROCESSING: u8 = 0x04;
const FRAME_START: u8 = 0xec;
const NOT_READY: u8 = 0xfb;

/// A host command as decoded by the simulated EC
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcCommand {
    /// Command code including any passthru offset
    pub command: u16,
    pub version: u8,
    pub data: Vec<u8>,
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |a, b| a.wrapping_add(*b))
}

/// Scripted v3 command handling shared by the LPC and SPI front ends
#[derive(Default)]
struct Responder {
    responses: HashMap<u16, (u16, Vec<u8>)>,
    commands: Vec<EcCommand>,
}

impl Responder {
    fn handle(&mut self, packet: &[u8]) -> Vec<u8> {
        let command = u16::from_le_bytes([packet[2], packet[3]]);
        let data_len = u16::from_le_bytes([packet[6], packet[7]]) as usize;
        let data = packet[8..(8 + data_len).min(packet.len())].to_vec();
        self.commands.push(EcCommand {
            command,
            version: packet[4],
            data,
        });

        let (result, data) = self.responses.get(&command).cloned().unwrap_or_default();
        let mut out = vec![3, 0];
        out.extend_from_slice(&result.to_le_bytes());
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&data);
        out[1] = sum(&out).wrapping_neg();
        out
    }
}

enum PacketWindow {
    Ports([u8; PACKET_SIZE]),
    Emi(EmiWindow),
}

/// Chrome EC on LPC, either a generic part or a MEC one behind EMI
pub struct CrosEcLpcSim {
    window: PacketWindow,
    responder: Responder,
    polls_left: usize,
    /// Busy polls before each command completes
    pub busy_polls: usize,
    /// Never leave the processing state
    pub never_ready: bool,
    /// Value left on the data port after a command
    pub lpc_result: u8,
}

impl CrosEcLpcSim {
    pub fn generic() -> Self {
        Self::with_window(PacketWindow::Ports([0; PACKET_SIZE]))
    }

    pub fn mec() -> Self {
        Self::with_window(PacketWindow::Emi(EmiWindow::new(HOST_PACKET)))
    }

    fn with_window(window: PacketWindow) -> Self {
        Self {
            window,
            responder: Responder::default(),
            polls_left: 0,
            busy_polls: 0,
            never_ready: false,
            lpc_result: 0,
        }
    }

    pub fn attach(self, bus: &PortBus) -> Arc<Mutex<Self>> {
        let packet_len = match self.window {
            PacketWindow::Ports(_) => PACKET_SIZE as u16,
            PacketWindow::Emi(_) => 8,
        };
        let sim = Arc::new(Mutex::new(self));
        bus.map(HOST_DATA..HOST_CMD + 1, sim.clone());
        bus.map(HOST_PACKET..HOST_PACKET + packet_len, sim.clone());
        sim
    }

    /// Answer `command` with `result` and `data`
    pub fn respond(&mut self, command: u16, result: u16, data: &[u8]) {
        self.responder.responses.insert(command, (result, data.to_vec()));
    }

    pub fn commands(&self) -> &[EcCommand] {
        &self.responder.commands
    }

    fn mem(&mut self) -> &mut [u8] {
        match &mut self.window {
            PacketWindow::Ports(mem) => mem,
            PacketWindow::Emi(emi) => &mut emi.mem[..PACKET_SIZE],
        }
    }

    fn start(&mut self) {
        let request = self.mem().to_vec();
        let response = self.responder.handle(&request);
        self.mem()[..response.len()].copy_from_slice(&response);
        self.polls_left = self.busy_polls;
    }
}

impl PortDevice for CrosEcLpcSim {
    fn read(&mut self, port: u16) -> u8 {
        match port {
            HOST_DATA => self.lpc_result,
            HOST_CMD => {
                if self.never_ready {
                    STATUS_PROCESSING
                } else if self.polls_left > 0 {
                    self.polls_left -= 1;
                    STATUS_PROCESSING
                } else {
                    0
                }
            }
            _ => match &mut self.window {
                PacketWindow::Ports(mem) => mem[(port - HOST_PACKET) as usize],
                PacketWindow::Emi(emi) => emi.read(port),
            },
        }
    }

    fn write(&mut self, port: u16, value: u8) {
        match port {
            HOST_CMD if value == PROTOCOL_3 => self.start(),
            HOST_DATA | HOST_CMD => {}
            _ => match &mut self.window {
                PacketWindow::Ports(mem) => mem[(port - HOST_PACKET) as usize] = value,
                PacketWindow::Emi(emi) => emi.write(port, value),
            },
        }
    }
}

/// Chrome EC on a SPI bus
#[derive(Default)]
pub struct CrosEcSpiSim {
    responder: Responder,
    request: Vec<u8>,
    out: VecDeque<u8>,
    claimed: bool,
    /// Not-ready bytes sent before the frame start
    pub preamble: usize,
    /// Never send a frame start
    pub never_ready: bool,
    pub claims: usize,
}

impl CrosEcSpiSim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, command: u16, result: u16, data: &[u8]) {
        self.responder.responses.insert(command, (result, data.to_vec()));
    }

    pub fn commands(&self) -> &[EcCommand] {
        &self.responder.commands
    }

    pub fn claimed(&self) -> bool {
        self.claimed
    }
}

impl SpiOps for CrosEcSpiSim {
    fn claim_bus(&mut self) -> device::Result<()> {
        self.claimed = true;
        self.claims += 1;
        self.request.clear();
        self.out.clear();
        Ok(())
    }

    fn release_bus(&mut self) -> device::Result<()> {
        self.claimed = false;
        Ok(())
    }

    fn transfer(&mut self, dout: &[u8], din: &mut [u8]) -> device::Result<()> {
        if !self.claimed {
            return Err(ErrorKind::InvalidArgument);
        }
        self.request.extend_from_slice(dout);
        if din.is_empty() {
            return Ok(());
        }
        if self.out.is_empty() && !self.request.is_empty() {
            if !self.never_ready {
                let response = self.responder.handle(&self.request);
                self.out.extend(std::iter::repeat(NOT_READY).take(self.preamble));
                self.out.push_back(FRAME_START);
                self.out.extend(response);
            }
            self.request.clear();
        }
        for b in din.iter_mut() {
            *b = self.out.pop_front().unwrap_or(NOT_READY);
        }
        Ok(())
    }
}
