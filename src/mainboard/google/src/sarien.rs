//! Dell Latitude 5400/5500 Chromebook Enterprise (Whiskey Lake, Wilco EC)

use alloc::boxed::Box;
use device::{
    block::BlockClass,
    flag::Flag,
    i2c::I2cSpeed,
    pci::PciDev,
    platform::{I2cBus, Platform},
    shared, Registry,
};
use drivers::{
    flash::MemMappedFlash,
    gpio::{install_flags, lookup_gpio, GpioCtor},
    power::PchPower,
    sound::HdaCodec,
    storage::{AhciCtrlr, NvmeCtrlr},
    tpm::{Cr50I2c, CR50_I2C_ADDR},
};
use ec::{vboot::VbootEc, wilco, wilco::WilcoEc};
use log::{info, warn};
use security::vboot::PRIMARY_VBOOT_EC;

use crate::{error::Mandatory, BoardError};

pub const EC_HOST_BASE:   u16 = 0x940;
pub const EC_PACKET_BASE: u16 = 0x950;

/* 32MB SPI flash */
pub const FLASH_BASE: usize = 0xfe00_0000;
pub const FLASH_SIZE: u32   = 0x200_0000;

/* H1 on I2C4, controller core at 133MHz */
pub const CR50_I2C:     PciDev = PciDev::new(0, 0x19, 0);
pub const GPE0_DW2_18:  u32    = 82;

pub const PMBASE: u16 = 0x1800;

pub const AHCI:   PciDev = PciDev::new(0, 0x17, 0);
/* M.2 2280 SSD x4, and the same slot when root ports are coalesced */
pub const NVME:   PciDev = PciDev::new(0, 0x1d, 4);
pub const NVME_B: PciDev = PciDev::new(0, 0x1d, 0);

pub const HDA:           PciDev = PciDev::new(0, 0x1f, 3);
pub const HDA_BEEP_NID:  u8     = 1;

/// I/O windows of the Wilco EC
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub ec_host_base: u16,
    pub ec_packet_base: u16,
}

pub const CONFIG: Config = Config {
    ec_host_base: EC_HOST_BASE,
    ec_packet_base: EC_PACKET_BASE,
};

pub fn board_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    setup(registry, platform, &CONFIG)
}

pub fn setup(registry: &mut Registry, platform: &Platform, config: &Config) -> Result<(), BoardError> {
    let soc = platform.soc.clone();
    let ctor: GpioCtor<'_> = &move |pad| soc.gpio_input(pad);
    install_flags(registry, &platform.sysinfo, Some(ctor)).mandatory("sysinfo flags")?;
    match lookup_gpio(&platform.sysinfo, "recovery", true, Some(ctor)) {
        Some(gpio) => registry.flag_replace(Flag::Recovery, gpio.mandatory("recovery GPIO")?),
        None => warn!("sarien: no recovery GPIO, keeping the sysinfo value"),
    }

    let flash = MemMappedFlash::new(platform.mmio.clone(), FLASH_BASE, FLASH_SIZE).mandatory("flash")?;
    registry.set_flash(Box::new(flash));

    let ec = shared(WilcoEc::new(
        platform.ports.clone(),
        platform.clock.clone(),
        config.ec_host_base,
        config.ec_packet_base,
    )?);
    registry.register_vboot_ec(Box::new(VbootEc::with_defaults(ec.clone())), PRIMARY_VBOOT_EC);
    registry.flag_replace(Flag::LidOpen, wilco::lid_switch_flag(&ec));
    wilco::register_cleanup(&ec, registry);

    let i2c4 = platform
        .soc
        .i2c_bus(I2cBus::Pci(CR50_I2C), I2cSpeed::Fast)
        .mandatory("I2C4")?;
    let soc = platform.soc.clone();
    let cr50 = Cr50I2c::new(
        i2c4,
        CR50_I2C_ADDR,
        Box::new(move || soc.gpe_status(GPE0_DW2_18)),
        platform.clock.clone(),
    )
    .mandatory("cr50")?;
    registry.set_tpm(Box::new(cr50));

    registry.set_power(Box::new(PchPower::new(platform.ports.clone(), PMBASE)));

    let pci = &platform.pci;
    registry.register_block(BlockClass::Fixed, Box::new(AhciCtrlr::new(pci.clone(), AHCI)));
    registry.register_block(BlockClass::Fixed, Box::new(NvmeCtrlr::new(pci.clone(), NVME)));
    registry.register_block(BlockClass::Fixed, Box::new(NvmeCtrlr::new(pci.clone(), NVME_B)));

    let mut codec = HdaCodec::new(platform.mmio.clone(), pci.clone(), platform.clock.clone(), HDA);
    codec.set_beep_nid_override(HDA_BEEP_NID);
    registry.set_sound(Box::new(codec));

    info!("sarien: board setup done");
    Ok(())
}
