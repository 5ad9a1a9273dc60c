//! AMD Stoney Ridge reference Chromebooks (Chrome EC over LPC)

use alloc::boxed::Box;
use device::{
    block::BlockClass,
    i2c::{i2c_clear_bits, I2cSpeed},
    pci::PciDev,
    platform::{I2cBus, Platform},
    shared,
    usb::UsbHcType,
    Registry, Shared,
};
use drivers::{
    flash::MemMappedFlash,
    gpio::install_flags,
    power::FchPower,
    sound::{GpioI2s, Max98357a, SoundRoute},
    storage::{SdhciHost, SdhciPlatform},
    tpm::{Cr50I2c, CR50_I2C_ADDR},
};
use ec::google::chromeec::{CrosEcBus, CrosEcLpcBus, LpcVariant};
use log::{info, warn};
use security::vboot::PRIMARY_VBOOT_EC;

use crate::{error::Mandatory, optional_usb, register_cros_ec, BoardError};

pub const EMMC_SD_CLOCK_MIN: u32 = 400000;
pub const EMMC_CLOCK_MAX:    u32 = 200000000;

pub const FLASH_SIZE:  u32   = 0x1000000;
pub const FLASH_START: usize = 0xffff_ffff - FLASH_SIZE as usize + 1;

pub const AP_I2C0_ADDR: usize = 0xfedc_2000;
pub const AP_I2C1_ADDR: usize = 0xfedc_3000;

pub const DA7219_I2C_ADDR:     u16 = 0x1a;
pub const DA7219_DAI_CLK_MODE: u8  = 0x2b;
pub const DAI_CLK_EN:          u8  = 0x80;

/* FCH GPIOs */
pub const I2S_BCLK:   u32 = 140;
pub const I2S_LRCLK:  u32 = 144;
pub const I2S2_DATA:  u32 = 143;
pub const SPK_PA_EN:  u32 = 119;

pub const CR50_GPE: u32 = 22;

#[cfg(not(feature = "force-bh720-sdhci"))]
pub const EMMC:          PciDev        = PciDev::new(0, 0x14, 7);
#[cfg(not(feature = "force-bh720-sdhci"))]
pub const EMMC_PLATFORM: SdhciPlatform =
    SdhciPlatform::NO_EMMC_HS200.union(SdhciPlatform::CLEAR_TRANSFER_BEFORE_CMD);

#[cfg(feature = "force-bh720-sdhci")]
pub const EMMC:          PciDev        = PciDev::new(1, 0, 0);
#[cfg(feature = "force-bh720-sdhci")]
pub const EMMC_PLATFORM: SdhciPlatform = SdhciPlatform::CLEAR_TRANSFER_BEFORE_CMD;

pub const USB_EHCI: PciDev = PciDev::new(0, 18, 0);
pub const USB_XHCI: PciDev = PciDev::new(0, 16, 0);

/// Bit-banged I2S into a MAX98357A.
///
/// Audio is optional: it is skipped when the DA7219 does not release
/// BCLK/WCLK.
fn audio_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    let i2c0 = platform
        .soc
        .i2c_bus(I2cBus::Mmio(AP_I2C0_ADDR), I2cSpeed::Fast)
        .mandatory("I2C0")?;
    if let Err(e) = i2c_clear_bits(&mut *i2c0.lock(), DA7219_I2C_ADDR, DA7219_DAI_CLK_MODE, DAI_CLK_EN) {
        warn!("grunt: failed to clear dai_clk_en ({}), skipping bit-bang i2s config", e);
        return Ok(());
    }

    let soc = &platform.soc;
    let i2s = GpioI2s::new(
        soc.gpio_output(I2S_BCLK, false).mandatory("I2S BCLK")?,
        soc.gpio_output(I2S_LRCLK, false).mandatory("I2S LRCLK")?,
        soc.gpio_output(I2S2_DATA, false).mandatory("I2S data")?,
        24000, /* Sample rate, measured */
        2,
        0x1fff,
    )
    .mandatory("GPIO I2S")?;
    let mut route = SoundRoute::new(Box::new(i2s));
    let amp = Max98357a::new(soc.gpio_output(SPK_PA_EN, false).mandatory("speaker amp")?);
    route.add_component(Box::new(amp));
    registry.set_sound(Box::new(route));
    Ok(())
}

pub fn board_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    install_flags(registry, &platform.sysinfo, None).mandatory("sysinfo flags")?;

    let bus: Shared<dyn CrosEcBus> = shared(CrosEcLpcBus::new(
        platform.ports.clone(),
        platform.clock.clone(),
        LpcVariant::Generic,
    ));
    register_cros_ec(registry, &bus, 0, PRIMARY_VBOOT_EC);

    let flash = MemMappedFlash::new(platform.mmio.clone(), FLASH_START, FLASH_SIZE).mandatory("flash")?;
    registry.set_flash(Box::new(flash));

    audio_setup(registry, platform)?;

    let emmc = SdhciHost::new_pci(
        platform.pci.clone(),
        platform.mmio.clone(),
        EMMC,
        EMMC_PLATFORM,
        EMMC_SD_CLOCK_MIN,
        EMMC_CLOCK_MAX,
    )
    .mandatory("eMMC")?;
    registry.register_block(BlockClass::Fixed, Box::new(emmc));

    let i2c1 = platform
        .soc
        .i2c_bus(I2cBus::Mmio(AP_I2C1_ADDR), I2cSpeed::Fast)
        .mandatory("I2C1")?;
    let soc = platform.soc.clone();
    let cr50 = Cr50I2c::new(
        i2c1,
        CR50_I2C_ADDR,
        Box::new(move || soc.gpe_status(CR50_GPE)),
        platform.clock.clone(),
    )
    .mandatory("cr50")?;
    registry.set_tpm(Box::new(cr50));

    optional_usb(registry, platform, UsbHcType::Ehci, USB_EHCI);
    optional_usb(registry, platform, UsbHcType::Xhci, USB_XHCI);

    registry.set_power(Box::new(FchPower::new(platform.ports.clone())));

    info!("grunt: board setup done");
    Ok(())
}
