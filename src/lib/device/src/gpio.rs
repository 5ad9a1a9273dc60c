use alloc::boxed::Box;

use crate::Result;

pub trait GpioInput {
    /// Logical value of the line, polarity already applied
    fn get(&mut self) -> Result<bool>;
}

pub trait GpioOutput {
    fn set(&mut self, value: bool) -> Result<()>;
}

impl<G: GpioInput + ?Sized> GpioInput for Box<G> {
    fn get(&mut self) -> Result<bool> {
        (**self).get()
    }
}

impl<G: GpioOutput + ?Sized> GpioOutput for Box<G> {
    fn set(&mut self, value: bool) -> Result<()> {
        (**self).set(value)
    }
}

/// Inverts the value read from another input
pub struct ActiveLow<G>(pub G);

impl<G: GpioInput> GpioInput for ActiveLow<G> {
    fn get(&mut self) -> Result<bool> {
        self.0.get().map(|v| !v)
    }
}

/// An input that always reads the same value
#[derive(Clone, Copy, Debug)]
pub struct Fixed(pub bool);

impl GpioInput for Fixed {
    fn get(&mut self) -> Result<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_inverts() {
        assert_eq!(ActiveLow(Fixed(true)).get(), Ok(false));
        assert_eq!(ActiveLow(Fixed(false)).get(), Ok(true));
    }

    #[test]
    fn active_low_over_boxed_input() {
        let pad: Box<dyn GpioInput> = Box::new(Fixed(true));
        let mut gpio: Box<dyn GpioInput> = Box::new(ActiveLow(pad));
        assert_eq!(gpio.get(), Ok(false));
    }
}
