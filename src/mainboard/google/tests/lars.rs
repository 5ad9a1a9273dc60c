use device::{
    flag::Flag,
    platform::{CbGpio, SysInfo},
    ClassId, Error as _, ErrorKind, Registry,
};
use drivers::tpm::LPC_TPM_BASE;
use mainboard_google::lars::{self, GPP_B2, GPP_F0, GPP_F23};
use security::vboot::{PD_VBOOT_EC, PRIMARY_VBOOT_EC};
use sim::SimPlatform;

fn sim_with_tpm() -> SimPlatform {
    let sim = SimPlatform::new();
    sim.mmio.set32(LPC_TPM_BASE + 0xf00, 0x001a_15d1);
    sim
}

#[test]
fn test_ec_and_pd() -> Result<(), ErrorKind> {
    let sim = sim_with_tpm();
    let mut registry = Registry::new();
    lars::board_setup(&mut registry, &sim.platform(SysInfo::default())).map_err(|e| e.kind())?;

    assert_eq!(registry.len(ClassId::VbootEc), 2);
    assert!(registry.vboot_ec(PRIMARY_VBOOT_EC).is_some());
    assert!(registry.vboot_ec(PD_VBOOT_EC).is_some());
    assert_eq!(registry.len(ClassId::Tpm), 1);
    assert_eq!(registry.len(ClassId::FixedBlk), 1);
    Ok(())
}

#[test]
fn test_beep_route() -> Result<(), ErrorKind> {
    let sim = sim_with_tpm();
    let mut registry = Registry::new();
    lars::board_setup(&mut registry, &sim.platform(SysInfo::default())).map_err(|e| e.kind())?;

    // Isolation buffer on, amplifier off until the first beep
    assert_eq!(sim.soc.output(GPP_F23), Some(true));
    assert_eq!(sim.soc.output(GPP_B2), Some(false));

    registry.sound().ok_or(ErrorKind::NotInstalled)?.play(2, 500)?;
    assert_eq!(sim.soc.output(GPP_B2), Some(true));
    assert_eq!(sim.soc.output(GPP_F0), Some(false));
    Ok(())
}

#[test]
fn test_lid_is_resampled() -> Result<(), ErrorKind> {
    let sim = sim_with_tpm();
    sim.soc.set_input(40, true);
    let sysinfo = SysInfo {
        gpios: vec![CbGpio::new(Some(40), true, false, "lid")],
    };
    let mut registry = Registry::new();
    lars::board_setup(&mut registry, &sim.platform(sysinfo)).map_err(|e| e.kind())?;

    assert_eq!(registry.flag_fetch(Flag::LidOpen), Ok(true));
    sim.soc.set_input(40, false);
    assert_eq!(registry.flag_fetch(Flag::LidOpen), Ok(false));
    Ok(())
}

#[test]
fn test_absent_tpm_is_fatal() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let mut registry = Registry::new();
    let err = lars::board_setup(&mut registry, &sim.platform(SysInfo::default()))
        .err()
        .ok_or(ErrorKind::Device)?;
    assert_eq!(err.kind(), ErrorKind::NoDevice);
    assert_eq!(registry.len(ClassId::Power), 0);
    Ok(())
}
