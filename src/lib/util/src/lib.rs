#![no_std]

pub mod cb_err;
pub mod timer;
