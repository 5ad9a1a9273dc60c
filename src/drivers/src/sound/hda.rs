//! Boot beep through an HD Audio codec's beep generator.
//!
//! Verbs go through the controller's immediate command interface, so no
//! CORB/RIRB rings are needed.

use alloc::sync::Arc;
use device::{
    pci::{PciConfig, PciDev, PCI_COMMAND, PCI_COMMAND_MEMORY},
    sound::SoundOps,
    ErrorKind, Result,
};
use log::{debug, info, warn};
use oreboot_asm::Mmio;
use util::timer::{wait_us, Clock};

const HDA_GCTL: usize = 0x08;
const HDA_GCTL_CRST: u32 = 1 << 0;
const HDA_STATESTS: usize = 0x0e;
const HDA_STATESTS_MASK: u16 = 0x7fff;
const HDA_ICOI: usize = 0x60;
const HDA_IRII: usize = 0x64;
const HDA_ICIS: usize = 0x68;
const HDA_ICIS_ICB: u16 = 1 << 0;
const HDA_ICIS_IRV: u16 = 1 << 1;

const HDA_RESET_TIMEOUT_US: u64 = 50_000;
const HDA_VERB_TIMEOUT_US: u64 = 1_000;

const VERB_GET_PARAMETER: u32 = 0xf00;
const VERB_SET_BEEP: u32 = 0x70a;
const PARAM_SUB_NODE_COUNT: u32 = 0x04;
const PARAM_AUDIO_WIDGET_CAPS: u32 = 0x09;
const WIDGET_TYPE_BEEP: u32 = 0x7;

/// Beep generator reference: the tone is `HDA_BEEP_RATE / (4 * divider)`
pub const HDA_BEEP_RATE: u32 = 48000;

fn verb(codec: u8, nid: u8, cmd: u32, payload: u32) -> u32 {
    (codec as u32) << 28 | (nid as u32) << 20 | (cmd << 8) | (payload & 0xff)
}

fn beep_divider(frequency: u32) -> Result<u8> {
    if frequency == 0 {
        return Err(ErrorKind::InvalidArgument);
    }
    Ok((HDA_BEEP_RATE / (4 * frequency)).clamp(1, 0xff) as u8)
}

pub struct HdaCodec {
    mmio: Arc<dyn Mmio>,
    pci: Arc<dyn PciConfig>,
    clock: Arc<dyn Clock>,
    dev: PciDev,
    beep_nid_override: Option<u8>,
    base: Option<usize>,
    codec: u8,
}

impl HdaCodec {
    pub fn new(mmio: Arc<dyn Mmio>, pci: Arc<dyn PciConfig>, clock: Arc<dyn Clock>, dev: PciDev) -> Self {
        Self {
            mmio,
            pci,
            clock,
            dev,
            beep_nid_override: None,
            base: None,
            codec: 0,
        }
    }

    /// Skip the widget scan and beep through `nid`
    pub fn set_beep_nid_override(&mut self, nid: u8) {
        self.beep_nid_override = Some(nid);
    }

    pub fn beep_nid_override(&self) -> Option<u8> {
        self.beep_nid_override
    }

    fn base(&mut self) -> Result<usize> {
        if let Some(base) = self.base {
            return Ok(base);
        }
        let bar = self.pci.bar(self.dev, 0);
        if bar == 0 {
            warn!("HDA {}: BAR0 not assigned", self.dev);
            return Err(ErrorKind::NoDevice);
        }
        let cmd = self.pci.read16(self.dev, PCI_COMMAND);
        self.pci.write16(self.dev, PCI_COMMAND, cmd | PCI_COMMAND_MEMORY);
        let base = bar as usize;

        if self.mmio.read32(base + HDA_GCTL) & HDA_GCTL_CRST == 0 {
            self.mmio.clrsetbits32(base + HDA_GCTL, 0, HDA_GCTL_CRST);
            let mmio = self.mmio.clone();
            wait_us(self.clock.as_ref(), HDA_RESET_TIMEOUT_US, 10, || {
                mmio.read32(base + HDA_GCTL) & HDA_GCTL_CRST != 0
            })
            .ok_or(ErrorKind::Timeout)?;
        }

        let present = self.mmio.read16(base + HDA_STATESTS) & HDA_STATESTS_MASK;
        if present == 0 {
            warn!("HDA {}: no codec", self.dev);
            return Err(ErrorKind::NoDevice);
        }
        self.codec = present.trailing_zeros() as u8;
        info!("HDA {}: codec {} at 0x{:x}", self.dev, self.codec, base);
        self.base = Some(base);
        Ok(base)
    }

    fn exec_verb(&mut self, nid: u8, cmd: u32, payload: u32) -> Result<u32> {
        let base = self.base()?;
        let mmio = self.mmio.clone();
        let clock = self.clock.as_ref();
        let idle = || mmio.read16(base + HDA_ICIS) & HDA_ICIS_ICB == 0;

        wait_us(clock, HDA_VERB_TIMEOUT_US, 1, idle).ok_or(ErrorKind::Timeout)?;
        mmio.write32(base + HDA_ICOI, verb(self.codec, nid, cmd, payload));
        mmio.write16(base + HDA_ICIS, HDA_ICIS_IRV | HDA_ICIS_ICB);
        wait_us(clock, HDA_VERB_TIMEOUT_US, 1, || {
            mmio.read16(base + HDA_ICIS) & (HDA_ICIS_ICB | HDA_ICIS_IRV) == HDA_ICIS_IRV
        })
        .ok_or(ErrorKind::Timeout)?;
        Ok(mmio.read32(base + HDA_IRII))
    }

    fn parameter(&mut self, nid: u8, param: u32) -> Result<u32> {
        self.exec_verb(nid, VERB_GET_PARAMETER, param)
    }

    /// First beep generator widget of the first function group
    fn find_beep_nid(&mut self) -> Result<u8> {
        let groups = self.parameter(0, PARAM_SUB_NODE_COUNT)?;
        let afg = ((groups >> 16) & 0xff) as u8;
        let widgets = self.parameter(afg, PARAM_SUB_NODE_COUNT)?;
        let first = (widgets >> 16) & 0xff;
        let count = widgets & 0xff;
        for nid in first..first + count {
            let caps = self.parameter(nid as u8, PARAM_AUDIO_WIDGET_CAPS)?;
            if (caps >> 20) & 0xf == WIDGET_TYPE_BEEP {
                debug!("HDA: beep generator at nid {}", nid);
                return Ok(nid as u8);
            }
        }
        Err(ErrorKind::Unsupported)
    }

    fn beep_nid(&mut self) -> Result<u8> {
        match self.beep_nid_override {
            Some(nid) => Ok(nid),
            None => self.find_beep_nid(),
        }
    }

    fn set_beep(&mut self, divider: u8) -> Result<()> {
        let nid = self.beep_nid()?;
        self.exec_verb(nid, VERB_SET_BEEP, divider as u32)?;
        Ok(())
    }
}

impl SoundOps for HdaCodec {
    fn play(&mut self, msec: u32, frequency: u32) -> Result<()> {
        let divider = beep_divider(frequency)?;
        self.set_beep(divider)?;
        self.clock.mdelay(msec as u64);
        self.set_beep(0)
    }

    fn set_volume(&mut self, _volume: u32) -> Result<()> {
        Err(ErrorKind::Unsupported)
    }
}
