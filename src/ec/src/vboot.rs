//! Verified boot callbacks on top of an EC driver.
//!
//! [`VbootEc`] implements every [`VbootEcOps`] callback. The callbacks named
//! in its hardware set go to the backend; all others answer with a fixed stub
//! result: success, an empty hash, "running RO" and "no power limit".

use alloc::vec::Vec;
use device::{ErrorKind, Shared};
use log::error;
use security::vboot::{EcBootMode, SelectFirmware, VbError, VbResult, VbootCallbacks, VbootEcOps};

/// EC side of the verified boot callbacks.
///
/// `SUPPORTED` must name exactly the operations the backend overrides. The
/// rest keep the default `Unsupported` body and are never reached through
/// [`VbootEc`]. A bit listed without an override still compiles and fails on
/// every call, so each backend's test calls its whole `SUPPORTED` set.
pub trait VbootBackend {
    /// Callbacks the hardware can service
    const SUPPORTED: VbootCallbacks;
    /// Hardware set used by [`VbootEc::with_defaults`]
    const DEFAULT: VbootCallbacks;

    fn running_rw(&mut self) -> device::Result<bool> {
        Err(ErrorKind::Unsupported)
    }

    fn jump_to_rw(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn reboot_switch_rw(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn disable_jump(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn hash_image(&mut self, _select: SelectFirmware) -> device::Result<Vec<u8>> {
        Err(ErrorKind::Unsupported)
    }

    fn update_image(&mut self, _select: SelectFirmware, _image: &[u8]) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn protect(&mut self, _select: SelectFirmware) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn entering_mode(&mut self, _mode: EcBootMode) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn reboot_to_ro(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn battery_cutoff(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }

    fn check_limit_power(&mut self) -> device::Result<bool> {
        Err(ErrorKind::Unsupported)
    }

    fn enable_power_button(&mut self, _enable: bool) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }
}

pub struct VbootEc<B: VbootBackend> {
    backend: Shared<B>,
    hardware: VbootCallbacks,
}

impl<B: VbootBackend> VbootEc<B> {
    /// Bind `hardware` callbacks to `backend`.
    ///
    /// # Panics
    ///
    /// If `hardware` names a callback outside `B::SUPPORTED`.
    pub fn new(backend: Shared<B>, hardware: VbootCallbacks) -> Self {
        assert!(
            B::SUPPORTED.contains(hardware),
            "vboot callbacks {:?} not implemented by the EC",
            hardware.difference(B::SUPPORTED)
        );
        Self { backend, hardware }
    }

    pub fn with_defaults(backend: Shared<B>) -> Self {
        Self::new(backend, B::DEFAULT)
    }

    pub fn hardware(&self) -> VbootCallbacks {
        self.hardware
    }

    fn dispatch<T>(
        &mut self,
        callback: VbootCallbacks,
        name: &str,
        stub: impl FnOnce() -> T,
        f: impl FnOnce(&mut B) -> device::Result<T>,
    ) -> VbResult<T> {
        if !self.hardware.contains(callback) {
            return Ok(stub());
        }
        let mut backend = self.backend.lock();
        f(&mut *backend).map_err(|e| {
            error!("vboot: {} failed: {}", name, e);
            VbError::Unknown
        })
    }
}

impl<B: VbootBackend> VbootEcOps for VbootEc<B> {
    fn running_rw(&mut self) -> VbResult<bool> {
        self.dispatch(VbootCallbacks::RUNNING_RW, "running_rw", || false, B::running_rw)
    }

    fn jump_to_rw(&mut self) -> VbResult {
        self.dispatch(VbootCallbacks::JUMP_TO_RW, "jump_to_rw", || (), B::jump_to_rw)
    }

    fn reboot_switch_rw(&mut self) -> VbResult {
        self.dispatch(
            VbootCallbacks::REBOOT_SWITCH_RW,
            "reboot_switch_rw",
            || (),
            B::reboot_switch_rw,
        )
    }

    fn disable_jump(&mut self) -> VbResult {
        self.dispatch(VbootCallbacks::DISABLE_JUMP, "disable_jump", || (), B::disable_jump)
    }

    fn hash_image(&mut self, select: SelectFirmware) -> VbResult<Vec<u8>> {
        self.dispatch(VbootCallbacks::HASH_IMAGE, "hash_image", Vec::new, |b| {
            b.hash_image(select)
        })
    }

    fn update_image(&mut self, select: SelectFirmware, image: &[u8]) -> VbResult {
        self.dispatch(VbootCallbacks::UPDATE_IMAGE, "update_image", || (), |b| {
            b.update_image(select, image)
        })
    }

    fn protect(&mut self, select: SelectFirmware) -> VbResult {
        self.dispatch(VbootCallbacks::PROTECT, "protect", || (), |b| b.protect(select))
    }

    fn entering_mode(&mut self, mode: EcBootMode) -> VbResult {
        self.dispatch(VbootCallbacks::ENTERING_MODE, "entering_mode", || (), |b| {
            b.entering_mode(mode)
        })
    }

    fn reboot_to_ro(&mut self) -> VbResult {
        self.dispatch(VbootCallbacks::REBOOT_TO_RO, "reboot_to_ro", || (), B::reboot_to_ro)
    }

    fn battery_cutoff(&mut self) -> VbResult {
        self.dispatch(VbootCallbacks::BATTERY_CUTOFF, "battery_cutoff", || (), B::battery_cutoff)
    }

    fn check_limit_power(&mut self) -> VbResult<bool> {
        self.dispatch(
            VbootCallbacks::CHECK_LIMIT_POWER,
            "check_limit_power",
            || false,
            B::check_limit_power,
        )
    }

    fn enable_power_button(&mut self, enable: bool) -> VbResult {
        self.dispatch(
            VbootCallbacks::ENABLE_POWER_BUTTON,
            "enable_power_button",
            || (),
            |b| b.enable_power_button(enable),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::shared;

    #[derive(Default)]
    struct Counter {
        reboots: usize,
        fail: bool,
    }

    impl VbootBackend for Counter {
        const SUPPORTED: VbootCallbacks = VbootCallbacks::REBOOT_TO_RO;
        const DEFAULT: VbootCallbacks = VbootCallbacks::empty();

        fn reboot_to_ro(&mut self) -> device::Result<()> {
            if self.fail {
                return Err(ErrorKind::Timeout);
            }
            self.reboots += 1;
            Ok(())
        }
    }

    #[test]
    fn stubs_answer_without_touching_hardware() {
        let backend = shared(Counter::default());
        let mut ec = VbootEc::with_defaults(backend.clone());
        assert_eq!(ec.reboot_to_ro(), Ok(()));
        assert_eq!(ec.running_rw(), Ok(false));
        assert_eq!(ec.check_limit_power(), Ok(false));
        assert_eq!(ec.hash_image(SelectFirmware::ReadWrite), Ok(Vec::new()));
        assert_eq!(backend.lock().reboots, 0);
    }

    #[test]
    fn hardware_errors_collapse_to_unknown() {
        let backend = shared(Counter {
            fail: true,
            ..Default::default()
        });
        let mut ec = VbootEc::new(backend, VbootCallbacks::REBOOT_TO_RO);
        assert_eq!(ec.reboot_to_ro(), Err(VbError::Unknown));
    }

    #[test]
    fn hardware_callbacks_reach_the_backend() {
        let backend = shared(Counter::default());
        let mut ec = VbootEc::new(backend.clone(), VbootCallbacks::REBOOT_TO_RO);
        ec.reboot_to_ro().unwrap();
        assert_eq!(backend.lock().reboots, 1);
    }

    #[test]
    #[should_panic]
    fn unsupported_hardware_binding_panics() {
        VbootEc::new(shared(Counter::default()), VbootCallbacks::JUMP_TO_RW);
    }
}
