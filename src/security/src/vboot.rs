//! Verified boot callback interface for embedded controllers.
//!
//! The verified boot engine drives EC software sync and boot-mode
//! notifications through [`VbootEcOps`]. Its error channel is two-valued:
//! a callback either succeeds or fails with [`VbError::Unknown`]. Transport
//! detail never crosses this boundary.

use alloc::vec::Vec;
use bitflags::bitflags;

/// `VBERROR_SUCCESS`
pub const VBERROR_SUCCESS: u32 = 0;
/// `VBERROR_UNKNOWN`
pub const VBERROR_UNKNOWN: u32 = 0x10000;

/// Index of the main EC in the vboot EC table
pub const PRIMARY_VBOOT_EC: usize = 0;
/// Index of a PD chip behind the main EC
pub const PD_VBOOT_EC: usize = 1;
/// Number of vboot EC slots
pub const MAX_VBOOT_EC: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VbError {
    Unknown,
}

impl VbError {
    pub const fn code(self) -> u32 {
        match self {
            Self::Unknown => VBERROR_UNKNOWN,
        }
    }
}

impl core::fmt::Display for VbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "vboot error 0x{:x}", self.code())
    }
}

pub type VbResult<T = ()> = Result<T, VbError>;

/// Raw status as handed to the verified boot engine
pub fn status_code<T>(result: &VbResult<T>) -> u32 {
    match result {
        Ok(_) => VBERROR_SUCCESS,
        Err(e) => e.code(),
    }
}

/// Which EC firmware copy an operation targets
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectFirmware {
    ReadOnly,
    ReadWrite,
}

/// Boot mode reported to the EC before the kernel is chosen
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum EcBootMode {
    Normal = 0,
    Developer = 1,
    Recovery = 2,
}

bitflags! {
    /// One bit per [`VbootEcOps`] callback
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct VbootCallbacks: u32 {
        const RUNNING_RW = 1 << 0;
        const JUMP_TO_RW = 1 << 1;
        const REBOOT_SWITCH_RW = 1 << 2;
        const DISABLE_JUMP = 1 << 3;
        const HASH_IMAGE = 1 << 4;
        const UPDATE_IMAGE = 1 << 5;
        const PROTECT = 1 << 6;
        const ENTERING_MODE = 1 << 7;
        const REBOOT_TO_RO = 1 << 8;
        const BATTERY_CUTOFF = 1 << 9;
        const CHECK_LIMIT_POWER = 1 << 10;
        const ENABLE_POWER_BUTTON = 1 << 11;
    }
}

/// EC callbacks consumed by the verified boot engine.
///
/// Every method is required: the engine expects each slot to be usable, so an
/// EC without a matching capability must answer with an explicit stub result.
pub trait VbootEcOps {
    /// Whether the EC is currently executing its RW image
    fn running_rw(&mut self) -> VbResult<bool>;
    fn jump_to_rw(&mut self) -> VbResult;
    fn reboot_switch_rw(&mut self) -> VbResult;
    /// Prevent further RO/RW jumps until the next EC reset
    fn disable_jump(&mut self) -> VbResult;
    /// Hash of the selected image as computed by the EC
    fn hash_image(&mut self, select: SelectFirmware) -> VbResult<Vec<u8>>;
    fn update_image(&mut self, select: SelectFirmware, image: &[u8]) -> VbResult;
    fn protect(&mut self, select: SelectFirmware) -> VbResult;
    fn entering_mode(&mut self, mode: EcBootMode) -> VbResult;
    fn reboot_to_ro(&mut self) -> VbResult;
    fn battery_cutoff(&mut self) -> VbResult;
    /// Whether the AP must run with reduced power draw
    fn check_limit_power(&mut self) -> VbResult<bool>;
    fn enable_power_button(&mut self, enable: bool) -> VbResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_two_valued() {
        assert_eq!(status_code(&VbResult::Ok(())), VBERROR_SUCCESS);
        assert_eq!(status_code::<bool>(&Err(VbError::Unknown)), VBERROR_UNKNOWN);
    }

    #[test]
    fn callbacks_cover_every_slot() {
        assert_eq!(VbootCallbacks::all().bits().count_ones(), 12);
    }
}
