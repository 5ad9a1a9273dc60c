use std::{cell::RefCell, rc::Rc};

use bootstate::CleanupType;
use device::{
    block::{BlockClass, BlockCtrlr},
    flag::Flag,
    flash::FlashOps,
    gpio::Fixed,
    power::PowerOps,
    usb::{UsbHcType, UsbHostController},
    ClassId, ErrorKind, Registry,
};
use security::vboot::{EcBootMode, SelectFirmware, VbResult, VbootEcOps, MAX_VBOOT_EC};

struct Ctrlr(&'static str);

impl BlockCtrlr for Ctrlr {
    fn name(&self) -> &str {
        self.0
    }

    fn update(&mut self) -> device::Result<()> {
        Ok(())
    }

    fn need_update(&self) -> bool {
        true
    }
}

struct Flash(u32);

impl FlashOps for Flash {
    fn size(&self) -> u32 {
        self.0
    }

    fn read(&mut self, _offset: u32, buf: &mut [u8]) -> device::Result<()> {
        buf.fill(0xff);
        Ok(())
    }
}

struct Power;

impl PowerOps for Power {
    fn cold_reboot(&mut self) -> device::Result<()> {
        Ok(())
    }

    fn power_off(&mut self) -> device::Result<()> {
        Err(ErrorKind::Unsupported)
    }
}

struct NullEc;

impl VbootEcOps for NullEc {
    fn running_rw(&mut self) -> VbResult<bool> {
        Ok(false)
    }
    fn jump_to_rw(&mut self) -> VbResult {
        Ok(())
    }
    fn reboot_switch_rw(&mut self) -> VbResult {
        Ok(())
    }
    fn disable_jump(&mut self) -> VbResult {
        Ok(())
    }
    fn hash_image(&mut self, _select: SelectFirmware) -> VbResult<Vec<u8>> {
        Ok(Vec::new())
    }
    fn update_image(&mut self, _select: SelectFirmware, _image: &[u8]) -> VbResult {
        Ok(())
    }
    fn protect(&mut self, _select: SelectFirmware) -> VbResult {
        Ok(())
    }
    fn entering_mode(&mut self, _mode: EcBootMode) -> VbResult {
        Ok(())
    }
    fn reboot_to_ro(&mut self) -> VbResult {
        Ok(())
    }
    fn battery_cutoff(&mut self) -> VbResult {
        Ok(())
    }
    fn check_limit_power(&mut self) -> VbResult<bool> {
        Ok(false)
    }
    fn enable_power_button(&mut self, _enable: bool) -> VbResult {
        Ok(())
    }
}

#[test]
fn test_block_enumeration_order() -> Result<(), ErrorKind> {
    let mut reg = Registry::new();
    reg.register_block(BlockClass::Fixed, Box::new(Ctrlr("ahci")));
    reg.register_block(BlockClass::Removable, Box::new(Ctrlr("sd")));
    reg.register_block(BlockClass::Fixed, Box::new(Ctrlr("nvme0")));
    reg.register_block(BlockClass::Fixed, Box::new(Ctrlr("nvme1")));

    assert_eq!(reg.len(ClassId::FixedBlk), 3);
    assert_eq!(reg.len(ClassId::RemovableBlk), 1);

    let names: Vec<_> = reg.block_ctrlrs(BlockClass::Fixed).map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["ahci", "nvme0", "nvme1"]);

    // Enumeration restarts from the first entry.
    let again: Vec<_> = reg.block_ctrlrs(BlockClass::Fixed).map(|c| c.name().to_string()).collect();
    assert_eq!(names, again);

    for c in reg.block_ctrlrs_mut(BlockClass::Fixed) {
        c.update()?;
    }
    let first = reg.block_ctrlrs(BlockClass::Fixed).next().ok_or(ErrorKind::NoDevice)?;
    assert!(first.downcast_ref::<Ctrlr>().is_some());
    Ok(())
}

#[test]
fn test_usb_hosts_keep_order() -> Result<(), ErrorKind> {
    let mut reg = Registry::new();
    reg.register_usb_host(UsbHostController::new(UsbHcType::Ehci, 0xf000_0000));
    reg.register_usb_host(UsbHostController::new(UsbHcType::Xhci, 0xf100_0000));

    let kinds: Vec<_> = reg.usb_hosts().map(|hc| hc.kind).collect();
    assert_eq!(kinds, [UsbHcType::Ehci, UsbHcType::Xhci]);
    assert_eq!(reg.len(ClassId::UsbHost), 2);
    Ok(())
}

#[test]
fn test_singleton_last_write_wins() -> Result<(), ErrorKind> {
    let mut reg = Registry::new();
    assert!(reg.flash().is_none());
    assert_eq!(reg.len(ClassId::Flash), 0);

    reg.set_flash(Box::new(Flash(0x100_0000)));
    reg.set_flash(Box::new(Flash(0x200_0000)));

    assert_eq!(reg.len(ClassId::Flash), 1);
    assert_eq!(reg.flash().ok_or(ErrorKind::NoDevice)?.size(), 0x200_0000);

    reg.set_power(Box::new(Power));
    let power = reg.power().ok_or(ErrorKind::NoDevice)?;
    assert_eq!(power.power_off(), Err(ErrorKind::Unsupported));
    power.cold_reboot()
}

#[test]
fn test_flags() -> Result<(), ErrorKind> {
    let mut reg = Registry::new();
    reg.flag_install(Flag::LidOpen, Box::new(Fixed(true)))?;
    assert_eq!(
        reg.flag_install(Flag::LidOpen, Box::new(Fixed(false))),
        Err(ErrorKind::AlreadyInstalled)
    );
    assert!(reg.flag_fetch(Flag::LidOpen)?);

    reg.flag_replace(Flag::LidOpen, Box::new(Fixed(false)));
    assert!(!reg.flag_fetch(Flag::LidOpen)?);

    assert_eq!(reg.flag_fetch(Flag::Recovery), Err(ErrorKind::NotInstalled));
    assert_eq!(reg.len(ClassId::Flag), 1);
    Ok(())
}

#[test]
fn test_vboot_ec_slots() -> Result<(), ErrorKind> {
    let mut reg = Registry::new();
    assert!(reg.vboot_ec(0).is_none());
    reg.register_vboot_ec(Box::new(NullEc), 0);
    reg.register_vboot_ec(Box::new(NullEc), 0);
    assert_eq!(reg.len(ClassId::VbootEc), 1);
    assert!(reg.vboot_ec(MAX_VBOOT_EC).is_none());

    let ec = reg.vboot_ec(0).ok_or(ErrorKind::NoDevice)?;
    assert_eq!(ec.running_rw(), Ok(false));
    Ok(())
}

#[test]
#[should_panic]
fn test_vboot_ec_index_out_of_range() {
    let mut reg = Registry::new();
    reg.register_vboot_ec(Box::new(NullEc), MAX_VBOOT_EC);
}

#[test]
fn test_teardown_runs_handoff_cleanups_in_order() -> Result<(), ErrorKind> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut reg = Registry::new();
    for (name, types) in [
        ("ec", CleanupType::ON_HANDOFF),
        ("reboot-only", CleanupType::ON_REBOOT),
        ("tpm", CleanupType::ON_HANDOFF | CleanupType::ON_LEGACY),
    ] {
        let log = log.clone();
        reg.add_cleanup(
            name,
            types,
            Box::new(move |_| {
                log.borrow_mut().push(name);
                Ok(())
            }),
        );
    }
    assert_eq!(reg.len(ClassId::Cleanup), 3);

    reg.run_cleanups(CleanupType::ON_HANDOFF).map_err(|_| ErrorKind::Device)?;
    // Already-run entries are not invoked again.
    reg.teardown(CleanupType::ON_HANDOFF).map_err(|_| ErrorKind::Device)?;

    assert_eq!(*log.borrow(), ["ec", "tpm"]);
    Ok(())
}
