//! Block device controllers.
//!
//! A controller owns the host side of a storage interface (AHCI, NVMe,
//! SDHCI, ...). Boot-flow code walks the registered controllers and calls
//! [`BlockCtrlr::update`] before looking for disks behind them.

use downcast_rs::{impl_downcast, Downcast};

use crate::Result;

/// Which registry collection a controller lives in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockClass {
    Fixed,
    Removable,
}

pub trait BlockCtrlr: Downcast {
    /// Short name for diagnostics, e.g. `"ahci 00:17.0"`
    fn name(&self) -> &str;

    /// Probe the controller and refresh the devices behind it
    fn update(&mut self) -> Result<()>;

    /// Whether [`update`](Self::update) has to run before the devices are usable
    fn need_update(&self) -> bool;
}
impl_downcast!(BlockCtrlr);
