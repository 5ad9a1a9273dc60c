use crate::Result;

/// Platform reset and power control.
///
/// On real hardware neither call returns on success; simulated platforms
/// return `Ok` once the request has been issued.
pub trait PowerOps {
    fn cold_reboot(&mut self) -> Result<()>;
    fn power_off(&mut self) -> Result<()>;
}
