use crate::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct I2sConfig {
    pub bits_per_sample: u32,
    pub channels: u32,
    /// Bit clocks per LR frame
    pub lr_frame_size: u32,
}

/// Serial audio output
pub trait I2sOps {
    /// Queue interleaved samples for transmission
    fn send(&mut self, data: &[u32]) -> Result<()>;
}
