mod gpio_i2s;
mod hda;
mod i2s_source;
mod max98357a;
mod route;

pub use self::{
    gpio_i2s::GpioI2s,
    hda::{HdaCodec, HDA_BEEP_RATE},
    i2s_source::I2sSource,
    max98357a::Max98357a,
    route::SoundRoute,
};

use device::{ErrorKind, Result};

/// Square wave at `frequency` sampled at `sample_rate`, `frames` long
pub(crate) fn square_wave(
    sample_rate: u32,
    frequency: u32,
    volume: u16,
    frames: u32,
) -> Result<impl Iterator<Item = i16>> {
    if frequency == 0 || frequency > sample_rate / 2 {
        return Err(ErrorKind::InvalidArgument);
    }
    let period = sample_rate / frequency;
    let half = period / 2;
    let amplitude = volume.min(i16::MAX as u16) as i16;
    Ok((0..frames).map(move |i| if i % period < half { amplitude } else { -amplitude }))
}

pub(crate) fn frames_for(sample_rate: u32, msec: u32) -> u32 {
    (sample_rate as u64 * msec as u64 / 1000) as u32
}
