#![no_std]

extern crate alloc;

pub mod flash;
pub mod gpio;
pub mod power;
pub mod sound;
pub mod storage;
pub mod tpm;
