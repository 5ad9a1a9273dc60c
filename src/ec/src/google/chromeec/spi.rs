//! Chrome EC host commands over SPI.
//!
//! The host clocks the request out, then keeps reading single bytes until
//! the EC sends [`EC_SPI_FRAME_START`], which is followed directly by the
//! response packet.

use alloc::sync::Arc;
use device::{spi::SpiOps, Shared};
use log::{error, info};
use util::timer::{Clock, Stopwatch};

use super::{
    proto::{EcHostResponse, Error, EC_HOST_RESPONSE_HEADER_BYTES},
    CrosEcBus,
};

/// First byte of a response frame
pub const EC_SPI_FRAME_START: u8 = 0xec;
/// How long the EC may take to start a response frame
pub const EC_SPI_TIMEOUT_US: u64 = 1_000_000;
const EC_SPI_POLL_US: u64 = 10;

pub struct CrosEcSpiBus {
    spi: Shared<dyn SpiOps>,
    clock: Arc<dyn Clock>,
}

impl CrosEcSpiBus {
    pub fn new(spi: Shared<dyn SpiOps>, clock: Arc<dyn Clock>) -> Self {
        info!("Chrome EC SPI bus");
        Self { spi, clock }
    }

    fn transaction(
        &self,
        spi: &mut dyn SpiOps,
        req: &[u8],
        resp: &mut [u8],
    ) -> Result<(), Error> {
        spi.transfer(req, &mut [])?;

        let mut sw = Stopwatch::new(self.clock.as_ref());
        sw.init_usecs_expire(EC_SPI_TIMEOUT_US);
        loop {
            let mut byte = [0u8];
            spi.transfer(&[], &mut byte)?;
            if byte[0] == EC_SPI_FRAME_START {
                break;
            }
            if sw.expired() {
                error!("cros_ec: timeout waiting for EC");
                return Err(Error::NotResponding);
            }
            self.clock.udelay(EC_SPI_POLL_US);
        }

        let (header, data) = resp.split_at_mut(EC_HOST_RESPONSE_HEADER_BYTES);
        spi.transfer(&[], header)?;
        let mut raw = [0u8; EC_HOST_RESPONSE_HEADER_BYTES];
        raw.copy_from_slice(header);
        let len = (EcHostResponse::from_bytes(&raw).data_len as usize).min(data.len());
        if len > 0 {
            spi.transfer(&[], &mut data[..len])?;
        }
        Ok(())
    }
}

impl CrosEcBus for CrosEcSpiBus {
    fn send_packet(&mut self, req: &[u8], resp: &mut [u8]) -> Result<(), Error> {
        if resp.len() < EC_HOST_RESPONSE_HEADER_BYTES {
            return Err(Error::ResponseTooSmall);
        }
        let mut spi = self.spi.lock();
        spi.claim_bus()?;
        let res = self.transaction(&mut *spi, req, resp);
        let released = spi.release_bus();
        res?;
        released.map_err(Error::from)
    }
}
