mod sysinfo;

pub use self::sysinfo::{flag_for_name, install_flags, lookup_gpio, GpioCtor};
