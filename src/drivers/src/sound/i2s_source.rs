use alloc::{boxed::Box, vec::Vec};
use device::{i2s::I2sOps, sound::SoundOps, ErrorKind, Result};

use super::{frames_for, square_wave};

const FRAMES_PER_SEND: usize = 1024;

/// Tone generator feeding an I2S controller
pub struct I2sSource {
    i2s: Box<dyn I2sOps>,
    sample_rate: u32,
    channels: u32,
    volume: u16,
}

impl I2sSource {
    pub fn new(i2s: Box<dyn I2sOps>, sample_rate: u32, channels: u32, volume: u16) -> Result<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(ErrorKind::InvalidArgument);
        }
        Ok(Self {
            i2s,
            sample_rate,
            channels,
            volume,
        })
    }
}

impl SoundOps for I2sSource {
    fn play(&mut self, msec: u32, frequency: u32) -> Result<()> {
        let frames = frames_for(self.sample_rate, msec);
        let wave = square_wave(self.sample_rate, frequency, self.volume, frames)?;
        let chunk = FRAMES_PER_SEND * self.channels as usize;
        let mut buf = Vec::with_capacity(chunk);
        for sample in wave {
            for _ in 0..self.channels {
                buf.push(sample as u16 as u32);
            }
            if buf.len() >= chunk {
                self.i2s.send(&buf)?;
                buf.clear();
            }
        }
        if !buf.is_empty() {
            self.i2s.send(&buf)?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: u32) -> Result<()> {
        self.volume = volume.min(u16::MAX as u32) as u16;
        Ok(())
    }
}
