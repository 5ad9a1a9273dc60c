/* SPDX-License-Identifier: GPL-2.0-only */
#![no_std]

//! Board setup for Google Chromebooks.
//!
//! Each board module exposes `board_setup`, which builds the board's drivers
//! from a [`Platform`](device::Platform) and hands them to the
//! [`Registry`](device::Registry). It runs once, from
//! `payload::Payload::setup_board`.

extern crate alloc;

mod error;

pub mod grunt;
pub mod kahlee;
pub mod lars;
pub mod peach_pit;
pub mod sarien;

pub use error::BoardError;

use alloc::boxed::Box;
use device::{
    pci::PciDev,
    platform::Platform,
    shared,
    usb::{UsbHcType, UsbHostController},
    Registry, Shared,
};
use ec::{
    google::chromeec::{CrosEc, CrosEcBus},
    vboot::VbootEc,
};

/// Register the USB controller at `dev` unless firmware left its BAR empty
pub(crate) fn optional_usb(registry: &mut Registry, platform: &Platform, kind: UsbHcType, dev: PciDev) {
    if let Some(hc) = UsbHostController::from_pci(kind, platform.pci.as_ref(), dev) {
        registry.register_usb_host(hc);
    }
}

/// Chrome EC (or PD behind it) as the vboot EC in `slot`
pub(crate) fn register_cros_ec(
    registry: &mut Registry,
    bus: &Shared<dyn CrosEcBus>,
    dev_index: u8,
    slot: usize,
) -> Shared<CrosEc> {
    let ec = shared(CrosEc::new(bus.clone(), dev_index));
    registry.register_vboot_ec(Box::new(VbootEc::with_defaults(ec.clone())), slot);
    ec
}
