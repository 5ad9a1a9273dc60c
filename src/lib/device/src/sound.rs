use crate::Result;

/// Simple tone output used for the boot beep
pub trait SoundOps {
    /// Play a tone of `frequency` Hz for `msec` milliseconds
    fn play(&mut self, msec: u32, frequency: u32) -> Result<()>;
    fn set_volume(&mut self, volume: u32) -> Result<()>;
}

/// A codec or amplifier that has to be switched on around playback
pub trait RouteComponent {
    fn enable(&mut self) -> Result<()>;
    fn disable(&mut self) -> Result<()>;
}
