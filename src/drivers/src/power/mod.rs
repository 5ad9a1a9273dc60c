mod exynos;
mod fch;
mod pch;

pub use self::{exynos::ExynosPower, fch::FchPower, pch::PchPower};

/// Reset control register shared by Intel and AMD chipsets
pub const RST_CNT: u16 = 0xcf9;
pub const SYS_RST: u8 = 1 << 1;
pub const RST_CPU: u8 = 1 << 2;
pub const FULL_RST: u8 = 1 << 3;

/// PM1 control bits
pub const SLP_EN: u32 = 1 << 13;
pub const SLP_TYP_SHIFT: u32 = 10;
pub const SLP_TYP: u32 = 7 << SLP_TYP_SHIFT;
pub const SLP_TYP_S5: u32 = 7;
