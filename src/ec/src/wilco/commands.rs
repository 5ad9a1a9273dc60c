use bitfield::bitfield;
use log::info;
use security::vboot::VbootCallbacks;

use super::{Error, Message, WilcoEc, MAILBOX_DATA_SIZE};
use crate::vboot::VbootBackend;

/// Power button events go to the host
const KB_POWER_BUTTON_TO_HOST: u8 = 0x3e;
const KB_POWER_STATUS: u8 = 0x05;
const KB_BIOS_PROGRESS: u8 = 0xc2;
const KB_REBOOT: u8 = 0xf2;

/// BIOS progress code telling the EC firmware has finished
pub const BIOS_PROGRESS_EXIT_FIRMWARE: u8 = 0x80;

bitfield! {
    /// First byte of the power status response
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct PowerStatus(u8);
    impl Debug;
    pub ac_present, _: 0;
    pub battery_present, _: 1;
    pub lid_open, _: 2;
}

impl WilcoEc {
    /// Reset the EC and the AP with it. The EC does not answer.
    pub fn reboot(&mut self) -> Result<(), Error> {
        info!("wilco: reboot");
        self.mailbox(&Message::no_response(KB_REBOOT, &[]), &mut []).map(|_| ())
    }

    /// Route power button presses to the host (`true`) or let the EC
    /// handle them itself
    pub fn power_button(&mut self, enable: bool) -> Result<(), Error> {
        self.mailbox_retry(&Message::new(KB_POWER_BUTTON_TO_HOST, &[enable as u8]), &mut [])
            .map(|_| ())
    }

    pub fn power_status(&mut self) -> Result<PowerStatus, Error> {
        let mut data = [0u8; MAILBOX_DATA_SIZE];
        self.mailbox_retry(&Message::new(KB_POWER_STATUS, &[]), &mut data)?;
        Ok(PowerStatus(data[0]))
    }

    pub fn lid_open(&mut self) -> Result<bool, Error> {
        Ok(self.power_status()?.lid_open())
    }

    pub fn exit_firmware(&mut self) -> Result<(), Error> {
        self.mailbox(
            &Message::new(KB_BIOS_PROGRESS, &[BIOS_PROGRESS_EXIT_FIRMWARE]),
            &mut [],
        )
        .map(|_| ())
    }
}

impl VbootBackend for WilcoEc {
    const SUPPORTED: VbootCallbacks =
        VbootCallbacks::REBOOT_TO_RO.union(VbootCallbacks::ENABLE_POWER_BUTTON);
    const DEFAULT: VbootCallbacks = Self::SUPPORTED;

    fn reboot_to_ro(&mut self) -> device::Result<()> {
        self.reboot().map_err(|e| device::Error::kind(&e))
    }

    fn enable_power_button(&mut self, enable: bool) -> device::Result<()> {
        self.power_button(enable).map_err(|e| device::Error::kind(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_status_bits() {
        let status = PowerStatus(0x05);
        assert!(status.ac_present());
        assert!(!status.battery_present());
        assert!(status.lid_open());
    }

    #[test]
    fn vboot_hardware_set() {
        assert_eq!(
            WilcoEc::SUPPORTED,
            VbootCallbacks::REBOOT_TO_RO | VbootCallbacks::ENABLE_POWER_BUTTON
        );
    }
}
