use alloc::boxed::Box;
use device::{gpio::GpioOutput, sound::RouteComponent, Result};

/// Maxim class D amplifier, switched by its SD_MODE pin
pub struct Max98357a {
    sdmode: Box<dyn GpioOutput>,
}

impl Max98357a {
    pub fn new(sdmode: Box<dyn GpioOutput>) -> Self {
        Self { sdmode }
    }
}

impl RouteComponent for Max98357a {
    fn enable(&mut self) -> Result<()> {
        self.sdmode.set(true)
    }

    fn disable(&mut self) -> Result<()> {
        self.sdmode.set(false)
    }
}
