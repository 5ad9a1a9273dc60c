//! Samsung Chromebook 2 (Exynos 5420)

use alloc::boxed::Box;
use device::{
    block::BlockClass,
    flag::Flag,
    i2c::I2cSpeed,
    i2s::I2sConfig,
    platform::{I2cBus, Platform},
    shared, Registry, Shared,
};
use drivers::{
    flash::SpiFlash,
    power::ExynosPower,
    sound::{I2sSource, SoundRoute},
    storage::{dwmci_clksel, DwmciHost},
    tpm::{TisI2c, SLB9645_I2C_ADDR},
};
use ec::google::chromeec::{CrosEcBus, CrosEcSpiBus};
use log::info;
use security::vboot::PRIMARY_VBOOT_EC;

use crate::{error::Mandatory, register_cros_ec, BoardError};

/// Pad number of pin `pin` in GPX bank `port`
pub const fn gpx(port: u32, pin: u32) -> u32 {
    port * 8 + pin
}

pub const EC_IN_RW: u32 = gpx(2, 3);

pub const I2C9_BASE: usize = 0x12e1_0000;
pub const SPI1_BASE: usize = 0x12d3_0000;
pub const SPI2_BASE: usize = 0x12d4_0000;
pub const I2S0_BASE: usize = 0x0383_0000;

/* 4MB SPI flash on spi1 */
pub const FLASH_SIZE: u32 = 0x40_0000;

pub const I2S0_CONFIG: I2sConfig = I2sConfig {
    bits_per_sample: 16,
    channels: 2,
    lr_frame_size: 256,
};

pub const EMMC_BASE:    usize = 0x1220_0000;
pub const SD_BASE:      usize = 0x1222_0000;
pub const MMC_SRC_HZ:   u32   = 100000000;
pub const EMMC_CLKSEL:  u32   = dwmci_clksel(1, 3, 3);
pub const SD_CLKSEL:    u32   = dwmci_clksel(1, 2, 3);

pub fn board_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    let soc = &platform.soc;

    let ec_in_rw = soc.gpio_input(EC_IN_RW).mandatory("EC in RW")?;
    registry.flag_install(Flag::EcInRw, ec_in_rw).mandatory("EC in RW flag")?;

    let i2c9 = soc.i2c_bus(I2cBus::Mmio(I2C9_BASE), I2cSpeed::Fast).mandatory("i2c9")?;
    let tpm = TisI2c::new(i2c9, SLB9645_I2C_ADDR, platform.clock.clone()).mandatory("TPM")?;
    registry.set_tpm(Box::new(tpm));

    let spi1 = soc.spi_bus(SPI1_BASE).mandatory("spi1")?;
    let spi2 = soc.spi_bus(SPI2_BASE).mandatory("spi2")?;

    let bus: Shared<dyn CrosEcBus> = shared(CrosEcSpiBus::new(spi2, platform.clock.clone()));
    register_cros_ec(registry, &bus, 0, PRIMARY_VBOOT_EC);

    let flash = SpiFlash::new(spi1, FLASH_SIZE).mandatory("flash")?;
    registry.set_flash(Box::new(flash));

    let i2s0 = soc.i2s(I2S0_BASE, I2S0_CONFIG).mandatory("i2s0")?;
    let source = I2sSource::new(i2s0, 48000, 2, 16000).mandatory("I2S source")?;
    registry.set_sound(Box::new(SoundRoute::new(Box::new(source))));

    let emmc = DwmciHost::new(platform.mmio.clone(), EMMC_BASE, MMC_SRC_HZ, 8, false, EMMC_CLKSEL)
        .mandatory("eMMC")?;
    let sd_card = DwmciHost::new(platform.mmio.clone(), SD_BASE, MMC_SRC_HZ, 4, true, SD_CLKSEL)
        .mandatory("SD card")?;
    registry.register_block(BlockClass::Fixed, Box::new(emmc));
    registry.register_block(BlockClass::Removable, Box::new(sd_card));

    registry.set_power(Box::new(ExynosPower::new(platform.mmio.clone())));

    info!("peach_pit: board setup done");
    Ok(())
}
