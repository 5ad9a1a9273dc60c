#![no_std]

extern crate alloc;

pub mod block;
mod class_id;
mod error;
pub mod flag;
pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod i2s;
pub mod pci;
pub mod platform;
pub mod power;
mod registry;
pub mod sound;
pub mod spi;
pub mod tpm;
pub mod usb;

use alloc::sync::Arc;
use spin::Mutex;

pub use self::{
    class_id::ClassId,
    error::{Error, ErrorKind, Result},
    platform::{Platform, Soc},
    registry::Registry,
};

/// A driver instance reachable from more than one owner, e.g. an EC used by
/// the vboot adapter, a flag and a cleanup callback at the same time.
pub type Shared<T> = Arc<Mutex<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
