use alloc::{boxed::Box, vec::Vec};
use bootstate::{CleanupFn, CleanupList, CleanupType};
use log::{debug, info, warn};
use security::vboot::{VbootEcOps, MAX_VBOOT_EC};
use util::cb_err::CbErr;

use crate::{
    block::{BlockClass, BlockCtrlr},
    flag::{Flag, Flags},
    flash::FlashOps,
    gpio::GpioInput,
    power::PowerOps,
    sound::SoundOps,
    tpm::TpmOps,
    usb::UsbHostController,
    ClassId, Result,
};

/// Every component a board registered for the boot flow.
///
/// Multi-instance classes enumerate in registration order. Singletons keep
/// the last value set. Drivers are owned by the registry until
/// [`teardown`](Self::teardown), which runs the handoff cleanups and then
/// drops them all.
#[derive(Default)]
pub struct Registry {
    fixed_blk: Vec<Box<dyn BlockCtrlr>>,
    removable_blk: Vec<Box<dyn BlockCtrlr>>,
    usb_hosts: Vec<UsbHostController>,
    flash: Option<Box<dyn FlashOps>>,
    sound: Option<Box<dyn SoundOps>>,
    power: Option<Box<dyn PowerOps>>,
    tpm: Option<Box<dyn TpmOps>>,
    vboot_ec: [Option<Box<dyn VbootEcOps>>; MAX_VBOOT_EC],
    flags: Flags,
    cleanups: CleanupList,
}

fn replace_singleton<T: ?Sized>(slot: &mut Option<Box<T>>, value: Box<T>, class: ClassId) {
    if slot.replace(value).is_some() {
        warn!("registry: {:?} replaced", class);
    } else {
        debug!("registry: {:?} set", class);
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn blk(&self, class: BlockClass) -> &Vec<Box<dyn BlockCtrlr>> {
        match class {
            BlockClass::Fixed => &self.fixed_blk,
            BlockClass::Removable => &self.removable_blk,
        }
    }

    fn blk_mut(&mut self, class: BlockClass) -> &mut Vec<Box<dyn BlockCtrlr>> {
        match class {
            BlockClass::Fixed => &mut self.fixed_blk,
            BlockClass::Removable => &mut self.removable_blk,
        }
    }

    pub fn register_block(&mut self, class: BlockClass, ctrlr: Box<dyn BlockCtrlr>) {
        debug!("registry: {:?} block controller {}", class, ctrlr.name());
        self.blk_mut(class).push(ctrlr);
    }

    pub fn block_ctrlrs(
        &self,
        class: BlockClass,
    ) -> impl Iterator<Item = &(dyn BlockCtrlr + 'static)> + '_ {
        self.blk(class).iter().map(|c| c.as_ref())
    }

    pub fn block_ctrlrs_mut(
        &mut self,
        class: BlockClass,
    ) -> impl Iterator<Item = &mut (dyn BlockCtrlr + 'static)> + '_ {
        self.blk_mut(class).iter_mut().map(|c| c.as_mut())
    }

    pub fn register_usb_host(&mut self, hc: UsbHostController) {
        debug!("registry: USB {:?} at 0x{:x}", hc.kind, hc.base);
        self.usb_hosts.push(hc);
    }

    pub fn usb_hosts(&self) -> impl Iterator<Item = &UsbHostController> + '_ {
        self.usb_hosts.iter()
    }

    pub fn set_flash(&mut self, flash: Box<dyn FlashOps>) {
        replace_singleton(&mut self.flash, flash, ClassId::Flash);
    }

    pub fn set_sound(&mut self, sound: Box<dyn SoundOps>) {
        replace_singleton(&mut self.sound, sound, ClassId::Sound);
    }

    pub fn set_power(&mut self, power: Box<dyn PowerOps>) {
        replace_singleton(&mut self.power, power, ClassId::Power);
    }

    pub fn set_tpm(&mut self, tpm: Box<dyn TpmOps>) {
        replace_singleton(&mut self.tpm, tpm, ClassId::Tpm);
    }

    pub fn flash(&mut self) -> Option<&mut (dyn FlashOps + 'static)> {
        self.flash.as_deref_mut()
    }

    pub fn sound(&mut self) -> Option<&mut (dyn SoundOps + 'static)> {
        self.sound.as_deref_mut()
    }

    pub fn power(&mut self) -> Option<&mut (dyn PowerOps + 'static)> {
        self.power.as_deref_mut()
    }

    pub fn tpm(&mut self) -> Option<&mut (dyn TpmOps + 'static)> {
        self.tpm.as_deref_mut()
    }

    /// Bind the vboot callbacks of EC `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not below `MAX_VBOOT_EC`.
    pub fn register_vboot_ec(&mut self, ec: Box<dyn VbootEcOps>, index: usize) {
        assert!(index < MAX_VBOOT_EC, "vboot EC index {} out of range", index);
        if self.vboot_ec[index].replace(ec).is_some() {
            warn!("registry: vboot EC {} replaced", index);
        }
        info!("registry: vboot EC {} registered", index);
    }

    pub fn vboot_ec(&mut self, index: usize) -> Option<&mut (dyn VbootEcOps + 'static)> {
        self.vboot_ec.get_mut(index)?.as_deref_mut()
    }

    pub fn flag_install(&mut self, flag: Flag, gpio: Box<dyn GpioInput>) -> Result<()> {
        self.flags.install(flag, gpio)
    }

    pub fn flag_replace(&mut self, flag: Flag, gpio: Box<dyn GpioInput>) {
        self.flags.replace(flag, gpio)
    }

    pub fn flag_fetch(&mut self, flag: Flag) -> Result<bool> {
        self.flags.fetch(flag)
    }

    pub fn add_cleanup(&mut self, name: &'static str, types: CleanupType, func: CleanupFn) {
        self.cleanups.add(name, types, func)
    }

    pub fn cleanups(&self) -> &CleanupList {
        &self.cleanups
    }

    /// Number of entries currently held for `class`
    pub fn len(&self, class: ClassId) -> usize {
        match class {
            ClassId::FixedBlk => self.fixed_blk.len(),
            ClassId::RemovableBlk => self.removable_blk.len(),
            ClassId::UsbHost => self.usb_hosts.len(),
            ClassId::Flash => self.flash.is_some() as usize,
            ClassId::Sound => self.sound.is_some() as usize,
            ClassId::Power => self.power.is_some() as usize,
            ClassId::Tpm => self.tpm.is_some() as usize,
            ClassId::VbootEc => self.vboot_ec.iter().filter(|e| e.is_some()).count(),
            ClassId::Flag => self.flags.installed(),
            ClassId::Cleanup => self.cleanups.len(),
        }
    }

    /// Run the cleanups registered for `event` without releasing anything
    pub fn run_cleanups(&mut self, event: CleanupType) -> core::result::Result<(), CbErr> {
        self.cleanups.run(event)
    }

    /// Run the cleanups for `event`, then release every driver
    pub fn teardown(mut self, event: CleanupType) -> core::result::Result<(), CbErr> {
        info!("registry: teardown for {:?}", event);
        self.run_cleanups(event)
    }
}
