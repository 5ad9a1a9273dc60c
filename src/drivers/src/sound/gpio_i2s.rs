use alloc::boxed::Box;
use device::{gpio::GpioOutput, sound::SoundOps, ErrorKind, Result};

use super::{frames_for, square_wave};

const BITS_PER_SAMPLE: u32 = 16;

/// I2S transmitter bit-banged on three GPIOs.
///
/// There is no pacing: the sample rate is whatever the pads toggle at, so
/// boards pass a measured rate.
pub struct GpioI2s {
    bclk: Box<dyn GpioOutput>,
    lrclk: Box<dyn GpioOutput>,
    data: Box<dyn GpioOutput>,
    sample_rate: u32,
    channels: u32,
    volume: u16,
}

impl GpioI2s {
    pub fn new(
        bclk: Box<dyn GpioOutput>,
        lrclk: Box<dyn GpioOutput>,
        data: Box<dyn GpioOutput>,
        sample_rate: u32,
        channels: u32,
        volume: u16,
    ) -> Result<Self> {
        if sample_rate == 0 || !(1..=2).contains(&channels) {
            return Err(ErrorKind::InvalidArgument);
        }
        Ok(Self {
            bclk,
            lrclk,
            data,
            sample_rate,
            channels,
            volume,
        })
    }

    fn send_sample(&mut self, sample: i16) -> Result<()> {
        let bits = sample as u16;
        for bit in (0..BITS_PER_SAMPLE).rev() {
            self.bclk.set(false)?;
            self.data.set(bits & (1 << bit) != 0)?;
            self.bclk.set(true)?;
        }
        Ok(())
    }
}

impl SoundOps for GpioI2s {
    fn play(&mut self, msec: u32, frequency: u32) -> Result<()> {
        let frames = frames_for(self.sample_rate, msec);
        for sample in square_wave(self.sample_rate, frequency, self.volume, frames)? {
            for ch in 0..self.channels {
                self.lrclk.set(ch != 0)?;
                self.send_sample(sample)?;
            }
        }
        self.bclk.set(false)?;
        self.lrclk.set(false)?;
        self.data.set(false)
    }

    fn set_volume(&mut self, volume: u32) -> Result<()> {
        self.volume = volume.min(u16::MAX as u32) as u16;
        Ok(())
    }
}
