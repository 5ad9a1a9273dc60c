use alloc::{boxed::Box, vec::Vec};
use device::{
    sound::{RouteComponent, SoundOps},
    Result,
};
use log::debug;

/// A sound source plus the components (amps, muxes) between it and the
/// speaker. Components are enabled in the order they were added, once,
/// before the first sound is played.
pub struct SoundRoute {
    source: Box<dyn SoundOps>,
    components: Vec<Box<dyn RouteComponent>>,
    enabled: bool,
}

impl SoundRoute {
    pub fn new(source: Box<dyn SoundOps>) -> Self {
        Self {
            source,
            components: Vec::new(),
            enabled: false,
        }
    }

    pub fn add_component(&mut self, component: Box<dyn RouteComponent>) {
        self.components.push(component);
    }

    pub fn components(&self) -> usize {
        self.components.len()
    }

    fn enable_components(&mut self) -> Result<()> {
        if self.enabled {
            return Ok(());
        }
        for (i, c) in self.components.iter_mut().enumerate() {
            debug!("sound route: enabling component {}", i);
            c.enable()?;
        }
        self.enabled = true;
        Ok(())
    }

    /// Turn every component back off, in reverse order
    pub fn disable(&mut self) -> Result<()> {
        for c in self.components.iter_mut().rev() {
            c.disable()?;
        }
        self.enabled = false;
        Ok(())
    }
}

impl SoundOps for SoundRoute {
    fn play(&mut self, msec: u32, frequency: u32) -> Result<()> {
        self.enable_components()?;
        self.source.play(msec, frequency)
    }

    fn set_volume(&mut self, volume: u32) -> Result<()> {
        self.source.set_volume(volume)
    }
}
