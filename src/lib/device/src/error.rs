use core::fmt::Debug;
use util::cb_err::CbErr;

/// Implemented by every driver-specific error so callers above the driver
/// only need to reason about an [`ErrorKind`].
pub trait Error: Debug {
    fn kind(&self) -> ErrorKind;
}

/// Device error kind that can be used across board implementations
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The device has no such capability
    Unsupported,
    /// Nothing answered at the configured address
    NoDevice,
    /// Bad or missing configuration value
    InvalidArgument,
    /// Offset or length outside of the device
    OutOfRange,
    /// The device did not finish within its time budget
    Timeout,
    /// The device completed the request with a failure status
    Device,
    /// A flag already has a source bound to it
    AlreadyInstalled,
    /// A flag has no source bound to it
    NotInstalled,
}

impl ErrorKind {
    /// Closest coreboot status code, used at the cleanup/handoff boundary
    pub const fn cb_err(self) -> CbErr {
        match self {
            Self::Unsupported => CbErr::ErrNotImplemented,
            Self::InvalidArgument | Self::OutOfRange => CbErr::ErrArg,
            Self::Timeout => CbErr::ECNotResponding,
            Self::Device => CbErr::ECDeviceError,
            _ => CbErr::Err,
        }
    }
}

impl Error for core::convert::Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

impl Error for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "The operation is not supported by the device"),
            Self::NoDevice => write!(f, "No device present"),
            Self::InvalidArgument => write!(f, "Invalid argument"),
            Self::OutOfRange => write!(f, "Access out of range"),
            Self::Timeout => write!(f, "Device timed out"),
            Self::Device => write!(f, "Device reported an error"),
            Self::AlreadyInstalled => write!(f, "Already installed"),
            Self::NotInstalled => write!(f, "Not installed"),
        }
    }
}

/// Result type of every capability operation
pub type Result<T, E = ErrorKind> = core::result::Result<T, E>;
