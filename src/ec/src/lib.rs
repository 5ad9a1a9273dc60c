#![no_std]

extern crate alloc;

pub mod google;
pub mod mec;
pub mod vboot;
pub mod wilco;
