use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use device::{
    gpio::{GpioInput, GpioOutput},
    i2c::{I2cOps, I2cSeg, I2cSpeed},
    i2s::{I2sConfig, I2sOps},
    platform::I2cBus,
    shared,
    spi::SpiOps,
    ErrorKind, Result, Shared, Soc,
};

type PadMap = Arc<Mutex<HashMap<u32, bool>>>;

struct PadIn {
    pad: u32,
    inputs: PadMap,
}

impl GpioInput for PadIn {
    fn get(&mut self) -> Result<bool> {
        Ok(self.inputs.lock().unwrap().get(&self.pad).copied().unwrap_or(false))
    }
}

struct PadOut {
    pad: u32,
    outputs: PadMap,
}

impl GpioOutput for PadOut {
    fn set(&mut self, value: bool) -> Result<()> {
        self.outputs.lock().unwrap().insert(self.pad, value);
        Ok(())
    }
}

/// I2C bus with byte-register devices behind it
#[derive(Debug, Default)]
pub struct FakeI2c {
    pub speed: Option<I2cSpeed>,
    /// `(chip, register) -> value`
    pub regs: HashMap<(u16, u8), u8>,
    /// Chips that acknowledge their address
    pub chips: HashSet<u16>,
    /// `(chip, read, bytes)` per segment
    pub log: Vec<(u16, bool, Vec<u8>)>,
    selected: HashMap<u16, u8>,
}

impl FakeI2c {
    pub fn add_chip(&mut self, chip: u16) {
        self.chips.insert(chip);
    }
}

impl I2cOps for FakeI2c {
    fn transfer(&mut self, segments: &mut [I2cSeg<'_>]) -> Result<()> {
        for seg in segments.iter_mut() {
            if !self.chips.contains(&seg.slave) {
                return Err(ErrorKind::NoDevice);
            }
            if seg.is_read() {
                let mut reg = self.selected.get(&seg.slave).copied().unwrap_or(0);
                for b in seg.buf.iter_mut() {
                    *b = self.regs.get(&(seg.slave, reg)).copied().unwrap_or(0);
                    reg = reg.wrapping_add(1);
                }
                self.log.push((seg.slave, true, seg.buf.to_vec()));
            } else {
                if let Some((reg, data)) = seg.buf.split_first() {
                    self.selected.insert(seg.slave, *reg);
                    for (i, v) in data.iter().enumerate() {
                        self.regs.insert((seg.slave, reg.wrapping_add(i as u8)), *v);
                    }
                }
                self.log.push((seg.slave, false, seg.buf.to_vec()));
            }
        }
        Ok(())
    }
}

/// SPI controller recording traffic; reads return 0xff
#[derive(Debug, Default)]
pub struct FakeSpi {
    pub claimed: bool,
    pub sent: Vec<u8>,
    pub reads: usize,
}

impl SpiOps for FakeSpi {
    fn claim_bus(&mut self) -> Result<()> {
        self.claimed = true;
        Ok(())
    }

    fn release_bus(&mut self) -> Result<()> {
        self.claimed = false;
        Ok(())
    }

    fn transfer(&mut self, dout: &[u8], din: &mut [u8]) -> Result<()> {
        self.sent.extend_from_slice(dout);
        din.fill(0xff);
        self.reads += din.len();
        Ok(())
    }
}

/// I2S controller keeping every sample it was given
#[derive(Clone, Default)]
pub struct FakeI2s {
    pub samples: Arc<Mutex<Vec<u32>>>,
}

impl I2sOps for FakeI2s {
    fn send(&mut self, data: &[u32]) -> Result<()> {
        self.samples.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

/// SoC whose pads and controllers are all recorders.
///
/// Controllers are created on first use and handed out again for the same
/// bus or base, so a test can inspect what a board did with them.
#[derive(Default)]
pub struct FakeSoc {
    inputs: PadMap,
    outputs: PadMap,
    gpes: Mutex<HashMap<u32, bool>>,
    i2c: Mutex<Vec<(I2cBus, Shared<FakeI2c>)>>,
    spi: Mutex<Vec<(usize, Shared<dyn SpiOps>)>>,
    i2s: Mutex<Vec<(usize, I2sConfig, FakeI2s)>>,
    missing: Mutex<HashSet<usize>>,
}

impl FakeSoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&self, pad: u32, value: bool) {
        self.inputs.lock().unwrap().insert(pad, value);
    }

    /// Last value driven on `pad`
    pub fn output(&self, pad: u32) -> Option<bool> {
        self.outputs.lock().unwrap().get(&pad).copied()
    }

    pub fn set_gpe(&self, gpe: u32, value: bool) {
        self.gpes.lock().unwrap().insert(gpe, value);
    }

    /// Make construction of the controller at `base` (or GPIO pad `base`) fail
    pub fn remove(&self, base: usize) {
        self.missing.lock().unwrap().insert(base);
    }

    fn check(&self, base: usize) -> Result<()> {
        if self.missing.lock().unwrap().contains(&base) {
            return Err(ErrorKind::NoDevice);
        }
        Ok(())
    }

    pub fn i2c(&self, bus: I2cBus) -> Shared<FakeI2c> {
        let mut buses = self.i2c.lock().unwrap();
        if let Some((_, i2c)) = buses.iter().find(|(b, _)| *b == bus) {
            return i2c.clone();
        }
        let i2c = shared(FakeI2c::default());
        buses.push((bus, i2c.clone()));
        i2c
    }

    /// Put `spi` behind the controller at `base`
    pub fn attach_spi(&self, base: usize, spi: Shared<dyn SpiOps>) {
        self.spi.lock().unwrap().push((base, spi));
    }

    pub fn i2s_samples(&self, base: usize) -> Vec<u32> {
        self.i2s
            .lock()
            .unwrap()
            .iter()
            .find(|(b, _, _)| *b == base)
            .map(|(_, _, i2s)| i2s.samples.lock().unwrap().clone())
            .unwrap_or_default()
    }

    pub fn i2s_config(&self, base: usize) -> Option<I2sConfig> {
        self.i2s.lock().unwrap().iter().find(|(b, _, _)| *b == base).map(|(_, c, _)| *c)
    }
}

impl Soc for FakeSoc {
    fn gpio_input(&self, pad: u32) -> Result<Box<dyn GpioInput>> {
        self.check(pad as usize)?;
        Ok(Box::new(PadIn {
            pad,
            inputs: self.inputs.clone(),
        }))
    }

    fn gpio_output(&self, pad: u32, value: bool) -> Result<Box<dyn GpioOutput>> {
        self.check(pad as usize)?;
        let mut out = PadOut {
            pad,
            outputs: self.outputs.clone(),
        };
        out.set(value)?;
        Ok(Box::new(out))
    }

    fn i2c_bus(&self, bus: I2cBus, speed: I2cSpeed) -> Result<Shared<dyn I2cOps>> {
        if let I2cBus::Mmio(base) = bus {
            self.check(base)?;
        }
        let i2c = self.i2c(bus);
        i2c.lock().speed = Some(speed);
        Ok(i2c)
    }

    fn spi_bus(&self, base: usize) -> Result<Shared<dyn SpiOps>> {
        self.check(base)?;
        let mut buses = self.spi.lock().unwrap();
        if let Some((_, spi)) = buses.iter().find(|(b, _)| *b == base) {
            return Ok(spi.clone());
        }
        let spi: Shared<dyn SpiOps> = shared(FakeSpi::default());
        buses.push((base, spi.clone()));
        Ok(spi)
    }

    fn i2s(&self, base: usize, config: I2sConfig) -> Result<Box<dyn I2sOps>> {
        self.check(base)?;
        let i2s = FakeI2s::default();
        self.i2s.lock().unwrap().push((base, config, i2s.clone()));
        Ok(Box::new(i2s))
    }

    fn gpe_status(&self, gpe: u32) -> bool {
        self.gpes.lock().unwrap().get(&gpe).copied().unwrap_or(false)
    }
}
