use crate::{ErrorKind, Result};

/// Representation of SPI operation status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpiOpStatus {
    NotExecuted,
    Success,
    Failure,
}

/**
 * Representation of a SPI operation.
 *
 * dout:	Data to send.
 * din:	Buffer for received data.
 */
pub struct SpiOp<'a, 'b> {
    pub dout: &'a [u8],
    pub din: &'b mut [u8],
    pub status: SpiOpStatus,
}

impl<'a, 'b> SpiOp<'a, 'b> {
    pub fn new(dout: &'a [u8], din: &'b mut [u8]) -> Self {
        Self {
            dout,
            din,
            status: SpiOpStatus::NotExecuted,
        }
    }
}

/// A SPI controller with one chip select wired to the device using it.
///
/// `transfer` is half duplex: the controller first shifts out `dout`, then
/// clocks in `din.len()` bytes. Either side may be empty.
pub trait SpiOps {
    /// Claim SPI bus and assert chip select
    fn claim_bus(&mut self) -> Result<()>;
    /// Deassert chip select
    fn release_bus(&mut self) -> Result<()>;
    fn transfer(&mut self, dout: &[u8], din: &mut [u8]) -> Result<()>;

    /// Run `ops` in order, stopping at the first failure
    fn xfer_vector(&mut self, ops: &mut [SpiOp<'_, '_>]) -> Result<()> {
        for op in ops.iter_mut() {
            match self.transfer(op.dout, op.din) {
                Ok(()) => op.status = SpiOpStatus::Success,
                Err(e) => {
                    op.status = SpiOpStatus::Failure;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// Claim the bus, run `f`, and release the bus whatever `f` returned
pub fn with_bus<T>(spi: &mut dyn SpiOps, f: impl FnOnce(&mut dyn SpiOps) -> Result<T>) -> Result<T> {
    spi.claim_bus()?;
    let res = f(spi);
    let released = spi.release_bus();
    let value = res?;
    released.map(|_| value)
}

/// Reject zero-length transfers with nothing to do
pub fn check_xfer(dout: &[u8], din: &[u8]) -> Result<()> {
    if dout.is_empty() && din.is_empty() {
        return Err(ErrorKind::InvalidArgument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Loop {
        claimed: bool,
        releases: usize,
        fail_after: Option<usize>,
        xfers: usize,
    }

    impl SpiOps for Loop {
        fn claim_bus(&mut self) -> Result<()> {
            self.claimed = true;
            Ok(())
        }

        fn release_bus(&mut self) -> Result<()> {
            self.claimed = false;
            self.releases += 1;
            Ok(())
        }

        fn transfer(&mut self, dout: &[u8], din: &mut [u8]) -> Result<()> {
            if Some(self.xfers) == self.fail_after {
                return Err(ErrorKind::Timeout);
            }
            self.xfers += 1;
            for (i, b) in din.iter_mut().enumerate() {
                *b = dout.get(i).copied().unwrap_or(0xff);
            }
            Ok(())
        }
    }

    #[test]
    fn vector_stops_at_first_failure() {
        let mut spi = Loop {
            fail_after: Some(1),
            ..Default::default()
        };
        let (mut a, mut b, mut c) = ([0u8; 1], [0u8; 1], [0u8; 1]);
        let mut ops = [SpiOp::new(&[1], &mut a), SpiOp::new(&[2], &mut b), SpiOp::new(&[3], &mut c)];
        assert_eq!(spi.xfer_vector(&mut ops), Err(ErrorKind::Timeout));
        assert_eq!(ops[0].status, SpiOpStatus::Success);
        assert_eq!(ops[1].status, SpiOpStatus::Failure);
        assert_eq!(ops[2].status, SpiOpStatus::NotExecuted);
    }

    #[test]
    fn bus_is_released_on_error() {
        let mut spi = Loop {
            fail_after: Some(0),
            ..Default::default()
        };
        let res = with_bus(&mut spi, |s| s.transfer(&[0], &mut []));
        assert_eq!(res, Err(ErrorKind::Timeout));
        assert!(!spi.claimed);
        assert_eq!(spi.releases, 1);
    }
}
