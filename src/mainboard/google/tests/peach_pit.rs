use device::{
    block::BlockClass,
    flag::Flag,
    platform::SysInfo,
    shared,
    ClassId, Error as _, ErrorKind, Registry,
};
use drivers::storage::DwmciHost;
use ec::google::chromeec::{EC_CMD_GET_VERSION, EC_IMAGE_RW};
use mainboard_google::peach_pit::{self, EC_IN_RW, I2S0_BASE, I2S0_CONFIG, SPI1_BASE, SPI2_BASE};
use sim::{CrosEcSpiSim, FakeSpi, SimPlatform};

fn version_response(image: u32) -> Vec<u8> {
    let mut data = vec![0u8; 100];
    data[..4].copy_from_slice(b"ro_v");
    data[96..].copy_from_slice(&image.to_le_bytes());
    data
}

#[test]
fn test_storage_and_flags() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let mut registry = Registry::new();
    peach_pit::board_setup(&mut registry, &sim.platform(SysInfo::default())).map_err(|e| e.kind())?;

    assert_eq!(registry.len(ClassId::FixedBlk), 1);
    assert_eq!(registry.len(ClassId::RemovableBlk), 1);
    let sd = registry
        .block_ctrlrs(BlockClass::Removable)
        .next()
        .and_then(|c| c.downcast_ref::<DwmciHost>())
        .ok_or(ErrorKind::NoDevice)?;
    assert!(sd.is_removable());
    assert_eq!(sd.src_hz(), 100_000_000);

    sim.soc.set_input(EC_IN_RW, true);
    assert_eq!(registry.flag_fetch(Flag::EcInRw), Ok(true));
    assert_eq!(registry.flag_fetch(Flag::LidOpen), Err(ErrorKind::NotInstalled));
    assert_eq!(registry.len(ClassId::Power), 1);
    Ok(())
}

#[test]
fn test_flash_and_ec_on_separate_buses() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let flash_spi = shared(FakeSpi::default());
    sim.soc.attach_spi(SPI1_BASE, flash_spi.clone());
    let mut ec = CrosEcSpiSim::new();
    ec.respond(EC_CMD_GET_VERSION, 0, &version_response(EC_IMAGE_RW));
    let ec = shared(ec);
    sim.soc.attach_spi(SPI2_BASE, ec.clone());

    let mut registry = Registry::new();
    peach_pit::board_setup(&mut registry, &sim.platform(SysInfo::default())).map_err(|e| e.kind())?;

    let mut buf = [0u8; 16];
    registry.flash().ok_or(ErrorKind::NotInstalled)?.read(0x1000, &mut buf)?;
    assert_eq!(buf, [0xff; 16]);
    assert_eq!(flash_spi.lock().sent, [0x03, 0x00, 0x10, 0x00]);

    let vboot = registry.vboot_ec(0).ok_or(ErrorKind::NotInstalled)?;
    assert_eq!(vboot.running_rw(), Ok(true));
    assert_eq!(ec.lock().commands().len(), 1);
    Ok(())
}

#[test]
fn test_beep_goes_to_i2s0() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let mut registry = Registry::new();
    peach_pit::board_setup(&mut registry, &sim.platform(SysInfo::default())).map_err(|e| e.kind())?;

    assert_eq!(sim.soc.i2s_config(I2S0_BASE), Some(I2S0_CONFIG));
    registry.sound().ok_or(ErrorKind::NotInstalled)?.play(10, 1000)?;
    // 10ms at 48kHz, two channels
    assert_eq!(sim.soc.i2s_samples(I2S0_BASE).len(), 960);
    Ok(())
}

#[test]
fn test_missing_flash_controller() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    sim.soc.remove(SPI1_BASE);
    let mut registry = Registry::new();
    let err = peach_pit::board_setup(&mut registry, &sim.platform(SysInfo::default()))
        .err()
        .ok_or(ErrorKind::Device)?;
    assert_eq!(err.kind(), ErrorKind::NoDevice);
    assert_ne!(err.status(), 0);
    assert_eq!(registry.len(ClassId::Tpm), 1);
    assert_eq!(registry.len(ClassId::Flash), 0);
    Ok(())
}
