//! Skylake Chromebook with a MEC1322 Chrome EC and a PD behind it

use alloc::boxed::Box;
use device::{
    block::BlockClass,
    pci::PciDev,
    platform::Platform,
    shared, Registry, Shared,
};
use drivers::{
    flash::MemMappedFlash,
    gpio::{install_flags, GpioCtor},
    power::PchPower,
    sound::{GpioI2s, Max98357a, SoundRoute},
    storage::{SdhciHost, SdhciPlatform},
    tpm::{LpcTpm, LPC_TPM_BASE},
};
use ec::google::chromeec::{CrosEcBus, CrosEcLpcBus, LpcVariant};
use log::info;
use security::vboot::{PD_VBOOT_EC, PRIMARY_VBOOT_EC};

use crate::{error::Mandatory, register_cros_ec, BoardError};

/*
 * The firmware does not run either port faster than 52 MHz, but the eMMC
 * maximum is 200 MHz for proper divider settings.
 */
pub const EMMC_SD_CLOCK_MIN: u32 = 400000;
pub const EMMC_CLOCK_MAX:    u32 = 200000000;

/* 16MB SPI flash */
pub const FLASH_BASE: usize = 0xff00_0000;
pub const FLASH_SIZE: u32   = 0x100_0000;

pub const PMBASE: u16 = 0x1800;

pub const EMMC: PciDev = PciDev::new(0, 0x1e, 4);

/* Skylake-LP community pads */
pub const GPP_B2:  u32 = 26;
pub const GPP_F0:  u32 = 120;
pub const GPP_F1:  u32 = 121;
pub const GPP_F2:  u32 = 122;
pub const GPP_F23: u32 = 143;

pub fn board_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    let soc = platform.soc.clone();
    let ctor: GpioCtor<'_> = &move |pad| soc.gpio_input(pad);
    install_flags(registry, &platform.sysinfo, Some(ctor)).mandatory("sysinfo flags")?;

    let bus: Shared<dyn CrosEcBus> = shared(CrosEcLpcBus::new(
        platform.ports.clone(),
        platform.clock.clone(),
        LpcVariant::Mec,
    ));
    register_cros_ec(registry, &bus, 0, PRIMARY_VBOOT_EC);
    register_cros_ec(registry, &bus, 1, PD_VBOOT_EC);

    let flash = MemMappedFlash::new(platform.mmio.clone(), FLASH_BASE, FLASH_SIZE).mandatory("flash")?;
    registry.set_flash(Box::new(flash));

    /* SPI TPM memory mapped to act like LPC TPM */
    let tpm = LpcTpm::new(platform.mmio.clone(), platform.clock.clone(), LPC_TPM_BASE).mandatory("TPM")?;
    registry.set_tpm(Box::new(tpm));

    registry.set_power(Box::new(PchPower::new(platform.ports.clone(), PMBASE)));

    let emmc = SdhciHost::new_pci(
        platform.pci.clone(),
        platform.mmio.clone(),
        EMMC,
        SdhciPlatform::NO_EMMC_HS200,
        EMMC_SD_CLOCK_MIN,
        EMMC_CLOCK_MAX,
    )
    .mandatory("eMMC")?;
    registry.register_block(BlockClass::Fixed, Box::new(emmc));

    let soc = &platform.soc;
    let amp = Max98357a::new(soc.gpio_output(GPP_B2, false).mandatory("speaker amp")?);

    // Buffer isolating I2S from the PCH so the pads can be bit-banged
    soc.gpio_output(GPP_F23, true).mandatory("boot beep buffer")?;

    let i2s = GpioI2s::new(
        soc.gpio_output(GPP_F0, false).mandatory("I2S BCLK")?,
        soc.gpio_output(GPP_F1, false).mandatory("I2S SFRM")?,
        soc.gpio_output(GPP_F2, false).mandatory("I2S TXD")?,
        16000,
        2,
        0x1fff,
    )
    .mandatory("GPIO I2S")?;
    let mut route = SoundRoute::new(Box::new(i2s));
    route.add_component(Box::new(amp));
    registry.set_sound(Box::new(route));

    info!("lars: board setup done");
    Ok(())
}
