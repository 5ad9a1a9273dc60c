use bootstate::BootState;
use device::{
    flag::Flag,
    platform::{CbGpio, SysInfo},
    ClassId, Error as _, ErrorKind,
};
use ec::wilco;
use mainboard_google::{
    sarien::{self, Config, EC_HOST_BASE, EC_PACKET_BASE},
    BoardError,
};
use payload::{Error, Payload};
use sim::{SimPlatform, WilcoSim};
use util::cb_err::CbErr;

fn sysinfo() -> SysInfo {
    SysInfo {
        gpios: vec![
            CbGpio::new(None, true, true, "write protect"),
            CbGpio::new(Some(12), true, false, "recovery"),
            CbGpio::new(None, true, false, "lid"),
        ],
    }
}

#[test]
fn test_full_setup() -> Result<(), Error<BoardError>> {
    let sim = SimPlatform::new();
    let ec = WilcoSim::new(EC_HOST_BASE, EC_PACKET_BASE).attach(&sim.ports);
    ec.lock().unwrap().respond(0x05, &[0x04]);
    sim.soc.set_input(12, true);

    let mut payload = Payload::new(sim.platform(sysinfo()));
    payload.setup_board(sarien::board_setup)?;
    assert_eq!(payload.state(), BootState::DevicesReady);

    let registry = payload.devices().expect("devices are ready");
    assert_eq!(registry.len(ClassId::Flash), 1);
    assert_eq!(registry.len(ClassId::VbootEc), 1);
    assert_eq!(registry.len(ClassId::Tpm), 1);
    assert_eq!(registry.len(ClassId::Power), 1);
    assert_eq!(registry.len(ClassId::Sound), 1);
    assert_eq!(registry.len(ClassId::FixedBlk), 3);
    assert_eq!(registry.len(ClassId::Cleanup), 1);

    let names: Vec<String> = registry
        .block_ctrlrs(device::block::BlockClass::Fixed)
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, ["ahci 00:17.0", "nvme 00:1d.4", "nvme 00:1d.0"]);

    // Recovery is resampled from its pad, write protect keeps the table value
    assert_eq!(registry.flag_fetch(Flag::Recovery), Ok(true));
    assert_eq!(registry.flag_fetch(Flag::WriteProtect), Ok(true));
    // Lid comes from the EC, not from the table
    assert_eq!(registry.flag_fetch(Flag::LidOpen), Ok(true));

    payload.handoff::<BoardError>()?;
    let ec = ec.lock().unwrap();
    assert_eq!(ec.requests.last().map(|r| r.command), Some(0xc2));
    Ok(())
}

#[test]
fn test_zero_ec_base_stops_registration() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let platform = sim.platform(sysinfo());
    let config = Config {
        ec_host_base: 0,
        ..sarien::CONFIG
    };

    let mut registry = device::Registry::new();
    let err = sarien::setup(&mut registry, &platform, &config)
        .err()
        .ok_or(ErrorKind::Device)?;
    assert_eq!(err, BoardError::Wilco(wilco::Error::InvalidBase));
    assert_eq!(err.status(), CbErr::from(wilco::Error::InvalidBase).code());
    assert_ne!(err.status(), 0);

    assert_eq!(registry.len(ClassId::Flash), 1);
    assert_eq!(registry.len(ClassId::VbootEc), 0);
    assert_eq!(registry.len(ClassId::Tpm), 0);
    assert_eq!(registry.len(ClassId::Power), 0);
    assert_eq!(registry.len(ClassId::FixedBlk), 0);
    Ok(())
}

#[test]
fn test_failed_setup_blocks_boot() -> Result<(), ErrorKind> {
    let sim = SimPlatform::new();
    let mut payload = Payload::new(sim.platform(SysInfo::default()));
    let bad = Config {
        ec_packet_base: 0,
        ..sarien::CONFIG
    };

    let err = payload
        .setup_board(|registry, platform| sarien::setup(registry, platform, &bad))
        .err()
        .ok_or(ErrorKind::Device)?;
    assert!(matches!(err, Error::Board(BoardError::Wilco(_))));
    assert_eq!(err.kind(), wilco::Error::InvalidBase.kind());
    assert_eq!(payload.state(), BootState::BoardSetup);
    assert!(payload.devices().is_none());
    Ok(())
}

#[test]
fn test_cr50_ready_follows_gpe() -> Result<(), ErrorKind> {
    use device::tpm::TpmOps;

    let sim = SimPlatform::new();
    let platform = sim.platform(SysInfo::default());
    let mut registry = device::Registry::new();
    sarien::board_setup(&mut registry, &platform).map_err(|e| e.kind())?;

    // cr50 never raises its interrupt, so the first register write times out
    let i2c = sim.soc.i2c(device::platform::I2cBus::Pci(sarien::CR50_I2C));
    i2c.lock().add_chip(0x50);
    let mut resp = [0u8; 16];
    let tpm = registry.tpm().ok_or(ErrorKind::NoDevice)?;
    assert_eq!(tpm.xmit(&[0x80, 0x01, 0, 0, 0, 10, 0, 0, 1, 0x44], &mut resp), Err(ErrorKind::Timeout));
    Ok(())
}
