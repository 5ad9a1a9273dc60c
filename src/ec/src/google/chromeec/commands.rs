use log::info;
use security::vboot::{EcBootMode, VbootCallbacks};

use super::{CrosEc, Error};
use crate::vboot::VbootBackend;

pub const EC_CMD_HELLO: u16 = 0x01;
pub const EC_CMD_GET_VERSION: u16 = 0x02;
pub const EC_CMD_BATTERY_CUT_OFF: u16 = 0x99;
pub const EC_CMD_ENTERING_MODE: u16 = 0xb6;
pub const EC_CMD_REBOOT_EC: u16 = 0xd2;

/* Image currently executing, as reported by EC_CMD_GET_VERSION */
pub const EC_IMAGE_UNKNOWN: u32 = 0;
pub const EC_IMAGE_RO: u32 = 1;
pub const EC_IMAGE_RW: u32 = 2;

/// Offset of `current_image` in the GET_VERSION response, after the RO and
/// RW version strings and a reserved block
const GET_VERSION_CURRENT_IMAGE: usize = 96;
const GET_VERSION_RESPONSE_SIZE: usize = GET_VERSION_CURRENT_IMAGE + 4;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RebootCmd {
    Cancel = 0,
    JumpRo = 1,
    JumpRw = 2,
    DisableJump = 3,
    Cold = 4,
}

pub const EC_REBOOT_FLAG_ON_AP_SHUTDOWN: u8 = 1 << 1;
pub const EC_REBOOT_FLAG_SWITCH_RW_SLOT: u8 = 1 << 2;

pub const EC_BATTERY_CUTOFF_FLAG_AT_SHUTDOWN: u8 = 1 << 0;

impl CrosEc {
    /// Ping the EC: it answers with the argument plus 0x01020304
    pub fn hello(&mut self) -> Result<(), Error> {
        let mut out = [0u8; 4];
        self.command(EC_CMD_HELLO, 0, &0xa0b0c0d0u32.to_le_bytes(), &mut out)?;
        if u32::from_le_bytes(out) != 0xa1b2c3d4 {
            return Err(Error::InvalidResponse);
        }
        Ok(())
    }

    /// Image the EC is executing, one of the `EC_IMAGE_*` values
    pub fn current_image(&mut self) -> Result<u32, Error> {
        let mut out = [0u8; GET_VERSION_RESPONSE_SIZE];
        let len = self.command(EC_CMD_GET_VERSION, 0, &[], &mut out)?;
        if len < GET_VERSION_RESPONSE_SIZE {
            return Err(Error::InvalidResponse);
        }
        let mut image = [0u8; 4];
        image.copy_from_slice(&out[GET_VERSION_CURRENT_IMAGE..]);
        Ok(u32::from_le_bytes(image))
    }

    pub fn reboot(&mut self, cmd: RebootCmd, flags: u8) -> Result<(), Error> {
        info!("cros_ec: reboot {:?} flags 0x{:02x}", cmd, flags);
        self.command(EC_CMD_REBOOT_EC, 0, &[cmd as u8, flags], &mut []).map(|_| ())
    }

    pub fn entering_mode(&mut self, mode: EcBootMode) -> Result<(), Error> {
        self.command(EC_CMD_ENTERING_MODE, 0, &(mode as u32).to_le_bytes(), &mut []).map(|_| ())
    }

    pub fn battery_cutoff(&mut self, flags: u8) -> Result<(), Error> {
        self.command(EC_CMD_BATTERY_CUT_OFF, 1, &[flags], &mut []).map(|_| ())
    }
}

fn kind(e: Error) -> device::ErrorKind {
    device::Error::kind(&e)
}

impl VbootBackend for CrosEc {
    const SUPPORTED: VbootCallbacks = Self::DEFAULT.union(VbootCallbacks::REBOOT_SWITCH_RW);
    const DEFAULT: VbootCallbacks = VbootCallbacks::RUNNING_RW
        .union(VbootCallbacks::JUMP_TO_RW)
        .union(VbootCallbacks::DISABLE_JUMP)
        .union(VbootCallbacks::REBOOT_TO_RO)
        .union(VbootCallbacks::ENTERING_MODE)
        .union(VbootCallbacks::BATTERY_CUTOFF);

    fn running_rw(&mut self) -> device::Result<bool> {
        Ok(self.current_image().map_err(kind)? == EC_IMAGE_RW)
    }

    fn jump_to_rw(&mut self) -> device::Result<()> {
        self.reboot(RebootCmd::JumpRw, 0).map_err(kind)
    }

    fn reboot_switch_rw(&mut self) -> device::Result<()> {
        self.reboot(RebootCmd::Cold, EC_REBOOT_FLAG_SWITCH_RW_SLOT).map_err(kind)
    }

    fn disable_jump(&mut self) -> device::Result<()> {
        self.reboot(RebootCmd::DisableJump, 0).map_err(kind)
    }

    fn entering_mode(&mut self, mode: EcBootMode) -> device::Result<()> {
        CrosEc::entering_mode(self, mode).map_err(kind)
    }

    fn reboot_to_ro(&mut self) -> device::Result<()> {
        self.reboot(RebootCmd::Cold, EC_REBOOT_FLAG_ON_AP_SHUTDOWN).map_err(kind)
    }

    fn battery_cutoff(&mut self) -> device::Result<()> {
        CrosEc::battery_cutoff(self, EC_BATTERY_CUTOFF_FLAG_AT_SHUTDOWN).map_err(kind)
    }
}
