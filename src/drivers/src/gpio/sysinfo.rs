//! Boot flags backed by the GPIO table coreboot leaves in sysinfo.
//!
//! Each table entry either names a pad that can be sampled again at runtime or
//! carries the value coreboot observed. Runtime sampling needs a constructor
//! from the board mapping a pad number to a SoC GPIO.

use alloc::boxed::Box;
use device::{
    flag::Flag,
    gpio::{ActiveLow, Fixed, GpioInput},
    platform::{CbGpio, SysInfo},
    Registry, Result,
};
use log::{debug, warn};

/// Builds a GPIO input for a coreboot port number
pub type GpioCtor<'a> = &'a dyn Fn(u32) -> Result<Box<dyn GpioInput>>;

const FLAG_NAMES: [(&str, Flag); 7] = [
    ("write protect", Flag::WriteProtect),
    ("recovery", Flag::Recovery),
    ("developer", Flag::Developer),
    ("lid", Flag::LidOpen),
    ("power", Flag::Power),
    ("EC in RW", Flag::EcInRw),
    ("oprom", Flag::OptionRom),
];

/// Flag bound to a coreboot GPIO name
pub fn flag_for_name(name: &str) -> Option<Flag> {
    FLAG_NAMES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Whether a flag's source can change while the payload runs
fn resample(flag: Flag) -> bool {
    matches!(flag, Flag::LidOpen | Flag::Power | Flag::EcInRw)
}

fn gpio_for(gpio: &CbGpio, resample: bool, ctor: Option<GpioCtor<'_>>) -> Result<Box<dyn GpioInput>> {
    match (gpio.port, ctor) {
        (Some(port), Some(ctor)) if resample => {
            let pad = ctor(port)?;
            if gpio.active_high {
                Ok(pad)
            } else {
                Ok(Box::new(ActiveLow(pad)))
            }
        }
        _ => Ok(Box::new(Fixed(gpio.value))),
    }
}

/// Look up the sysinfo GPIO called `name`.
///
/// With `resample_at_runtime` and a constructor, the returned input samples
/// the pad on every read, honouring polarity. Otherwise it reports the value
/// coreboot recorded.
pub fn lookup_gpio(
    sysinfo: &SysInfo,
    name: &str,
    resample_at_runtime: bool,
    ctor: Option<GpioCtor<'_>>,
) -> Option<Result<Box<dyn GpioInput>>> {
    let gpio = sysinfo.gpios.iter().find(|g| g.name.as_str() == name);
    if gpio.is_none() {
        warn!("sysinfo: no GPIO named \"{}\"", name);
    }
    gpio.map(|g| gpio_for(g, resample_at_runtime, ctor))
}

/// Install a flag for every recognised GPIO in the sysinfo table.
///
/// Unrecognised names are skipped. A flag that already has a source is an
/// error.
pub fn install_flags(registry: &mut Registry, sysinfo: &SysInfo, ctor: Option<GpioCtor<'_>>) -> Result<()> {
    for gpio in sysinfo.gpios.iter() {
        let Some(flag) = flag_for_name(gpio.name.as_str()) else {
            debug!("sysinfo: ignoring GPIO \"{}\"", gpio.name);
            continue;
        };
        let source = gpio_for(gpio, resample(flag), ctor)?;
        registry.flag_install(flag, source)?;
    }
    Ok(())
}
