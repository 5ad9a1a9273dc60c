use core::fmt;

use device::{Error as _, ErrorKind};
use ec::wilco;
use util::cb_err::CbErr;

/// Why a board could not be brought up
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoardError {
    /// A mandatory component failed to construct
    Component { name: &'static str, kind: ErrorKind },
    Wilco(wilco::Error),
}

impl BoardError {
    /// Nonzero exit status for the init function table
    pub fn status(&self) -> i32 {
        CbErr::from(*self).code()
    }
}

impl From<wilco::Error> for BoardError {
    fn from(e: wilco::Error) -> Self {
        Self::Wilco(e)
    }
}

impl From<BoardError> for CbErr {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::Component { .. } => CbErr::BoardMandatoryComponent,
            BoardError::Wilco(e) => e.into(),
        }
    }
}

impl device::Error for BoardError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Component { kind, .. } => *kind,
            Self::Wilco(e) => e.kind(),
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component { name, kind } => write!(f, "{}: {}", name, kind),
            Self::Wilco(e) => write!(f, "Wilco EC: {}", e),
        }
    }
}

/// Attach the failing component's name to a driver error
pub(crate) trait Mandatory<T> {
    fn mandatory(self, name: &'static str) -> Result<T, BoardError>;
}

impl<T, E: device::Error> Mandatory<T> for Result<T, E> {
    fn mandatory(self, name: &'static str) -> Result<T, BoardError> {
        self.map_err(|e| {
            log::error!("{}: {:?}", name, e);
            BoardError::Component { name, kind: e.kind() }
        })
    }
}
