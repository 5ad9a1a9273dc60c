/**
 * coreboot error codes
 *
 * Common error definitions that can be used for any function. All error values
 * should be negative -- when useful, positive values can also be used to denote
 * success. Allocate a new group or errors every 100 values.
 */
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CbErr {
    /// Call completed successfully
    Success = 0,
    /// Generic error code
    Err = -1,
    /// Invalid argument
    ErrArg = -2,
    /// Function not implemented
    ErrNotImplemented = -3,

    /* I2C controller failures */
    /// Device is not responding
    I2CNoDevice = -300,
    /// Device tells it's busy
    I2CBusy = -301,
    /// Data lost or spurious slave device response, try again?
    I2CProtocolError = -302,
    /// Transmission timed out
    I2CTimeout = -303,

    /* Embedded controller failures */
    /// EC never cleared its busy status
    ECNotResponding = -500,
    /// EC completed the command with an error status
    ECDeviceError = -501,
    /// EC response failed framing or checksum validation
    ECInvalidResponse = -502,

    /* Board setup failures */
    /// A mandatory component could not be constructed
    BoardMandatoryComponent = -600,
    /// Board setup was requested more than once
    BoardAlreadySetup = -601,
}

impl CbErr {
    /// Numeric coreboot-style status code
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl core::fmt::Display for CbErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Success => "success",
            Self::Err => "generic error",
            Self::ErrArg => "invalid argument",
            Self::ErrNotImplemented => "not implemented",
            Self::I2CNoDevice => "I2C device not responding",
            Self::I2CBusy => "I2C device busy",
            Self::I2CProtocolError => "I2C protocol error",
            Self::I2CTimeout => "I2C transfer timed out",
            Self::ECNotResponding => "EC not responding",
            Self::ECDeviceError => "EC returned error status",
            Self::ECInvalidResponse => "EC response invalid",
            Self::BoardMandatoryComponent => "mandatory board component missing",
            Self::BoardAlreadySetup => "board already set up",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}
