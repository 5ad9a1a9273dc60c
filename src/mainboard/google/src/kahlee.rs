//! AMD Stoney Ridge reference board

use alloc::boxed::Box;
use device::{
    block::BlockClass,
    pci::PciDev,
    platform::Platform,
    shared,
    usb::UsbHcType,
    Registry, Shared,
};
use drivers::{
    flash::MemMappedFlash,
    gpio::install_flags,
    power::FchPower,
    sound::HdaCodec,
    storage::{AhciCtrlr, SdhciHost, SdhciPlatform},
    tpm::{LpcTpm, LPC_TPM_BASE},
};
use ec::google::chromeec::{CrosEcBus, CrosEcLpcBus, LpcVariant};
use log::info;
use security::vboot::PRIMARY_VBOOT_EC;

use crate::{error::Mandatory, optional_usb, register_cros_ec, BoardError};

pub const EMMC_SD_CLOCK_MIN: u32 = 400000;
pub const EMMC_CLOCK_MAX:    u32 = 200000000;
pub const SD_CLOCK_MAX:      u32 = 52000000;

pub const FLASH_BASE: usize = 0xff80_0000;
pub const FLASH_SIZE: u32   = 0x80_0000;

pub const HDA:      PciDev = PciDev::new(0, 0x09, 2);
pub const EMMC:     PciDev = PciDev::new(0, 0x14, 7);
pub const SATA:     PciDev = PciDev::new(0, 17, 0);
pub const USB_EHCI: PciDev = PciDev::new(0, 18, 0);
pub const USB_XHCI: PciDev = PciDev::new(0, 16, 0);

pub fn board_setup(registry: &mut Registry, platform: &Platform) -> Result<(), BoardError> {
    install_flags(registry, &platform.sysinfo, None).mandatory("sysinfo flags")?;

    let bus: Shared<dyn CrosEcBus> = shared(CrosEcLpcBus::new(
        platform.ports.clone(),
        platform.clock.clone(),
        LpcVariant::Generic,
    ));
    register_cros_ec(registry, &bus, 0, PRIMARY_VBOOT_EC);

    let flash = MemMappedFlash::new(platform.mmio.clone(), FLASH_BASE, FLASH_SIZE).mandatory("flash")?;
    registry.set_flash(Box::new(flash));

    let codec = HdaCodec::new(platform.mmio.clone(), platform.pci.clone(), platform.clock.clone(), HDA);
    registry.set_sound(Box::new(codec));

    let emmc = SdhciHost::new_pci(
        platform.pci.clone(),
        platform.mmio.clone(),
        EMMC,
        SdhciPlatform::NO_EMMC_HS200 | SdhciPlatform::CLEAR_TRANSFER_BEFORE_CMD,
        EMMC_SD_CLOCK_MIN,
        EMMC_CLOCK_MAX,
    )
    .mandatory("eMMC")?;
    registry.register_block(BlockClass::Fixed, Box::new(emmc));
    registry.register_block(BlockClass::Fixed, Box::new(AhciCtrlr::new(platform.pci.clone(), SATA)));

    optional_usb(registry, platform, UsbHcType::Ehci, USB_EHCI);
    optional_usb(registry, platform, UsbHcType::Xhci, USB_XHCI);

    registry.set_power(Box::new(FchPower::new(platform.ports.clone())));

    let tpm = LpcTpm::new(platform.mmio.clone(), platform.clock.clone(), LPC_TPM_BASE).mandatory("TPM")?;
    registry.set_tpm(Box::new(tpm));

    info!("kahlee: board setup done");
    Ok(())
}
