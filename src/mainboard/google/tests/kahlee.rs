use device::{
    block::BlockClass,
    flag::Flag,
    platform::{CbGpio, SysInfo},
    usb::UsbHcType,
    ClassId, ErrorKind, Registry,
};
use drivers::tpm::LPC_TPM_BASE;
use mainboard_google::{kahlee, BoardError};
use sim::SimPlatform;
use util::cb_err::CbErr;

fn sysinfo() -> SysInfo {
    SysInfo {
        gpios: vec![
            CbGpio::new(None, true, true, "write protect"),
            CbGpio::new(None, false, false, "developer"),
        ],
    }
}

#[test]
fn test_full_setup() -> Result<(), BoardError> {
    let sim = SimPlatform::new();
    sim.mmio.set32(LPC_TPM_BASE + 0xf00, 0x0000_15d1);
    sim.pci.add_device(kahlee::USB_EHCI, 0x1022, 0x7908, 0xfe10_0000);

    let mut registry = Registry::new();
    kahlee::board_setup(&mut registry, &sim.platform(sysinfo()))?;

    let names: Vec<String> = registry
        .block_ctrlrs(BlockClass::Fixed)
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, ["sdhci 00:14.7", "ahci 00:11.0"]);
    let hosts: Vec<_> = registry.usb_hosts().map(|hc| hc.kind).collect();
    assert_eq!(hosts, [UsbHcType::Ehci]);

    assert_eq!(registry.len(ClassId::Sound), 1);
    assert_eq!(registry.len(ClassId::Tpm), 1);
    assert_eq!(registry.flag_fetch(Flag::WriteProtect), Ok(true));
    assert_eq!(registry.flag_fetch(Flag::Developer), Ok(false));
    assert_eq!(registry.flag_fetch(Flag::Recovery), Err(ErrorKind::NotInstalled));
    Ok(())
}

#[test]
fn test_missing_tpm_keeps_earlier_components() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let mut registry = Registry::new();
    let err = kahlee::board_setup(&mut registry, &sim.platform(sysinfo()))
        .err()
        .ok_or(ErrorKind::Device)?;

    assert_eq!(
        err,
        BoardError::Component {
            name: "TPM",
            kind: ErrorKind::NoDevice
        }
    );
    assert_eq!(err.status(), CbErr::BoardMandatoryComponent.code());
    assert_eq!(registry.len(ClassId::Power), 1);
    assert_eq!(registry.len(ClassId::Tpm), 0);
    Ok(())
}
