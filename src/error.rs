//! Error type for uid owner map operations

use nix::errno::Errno;
use serde::{Deserialize, Serialize};

use crate::bpf::BpfCommand;

/// Failure the host should surface.
///
/// Expected absences (no map on this device, no entry for the UID, no
/// matching bits) are never errors; they come back as an
/// [`Outcome`](crate::rules::Outcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `bpf(2)` command failed with an unexpected errno
    Kernel { command: BpfCommand, errno: Errno },
    /// The map path could not be passed to the kernel as a C string
    InvalidPath(String),
}

impl Error {
    pub fn kernel(command: BpfCommand, errno: Errno) -> Self {
        Error::Kernel { command, errno }
    }

    /// Name of the failing kernel operation, e.g. `BPF_MAP_LOOKUP_ELEM`.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Error::Kernel { command, .. } => command.name(),
            Error::InvalidPath(_) => BpfCommand::ObjGet.name(),
        }
    }

    /// The OS error code (errno) behind the failure.
    pub fn os_error_code(&self) -> i32 {
        match self {
            Error::Kernel { errno, .. } => *errno as i32,
            Error::InvalidPath(_) => Errno::EINVAL as i32,
        }
    }

    pub fn errno(&self) -> Errno {
        Errno::from_i32(self.os_error_code())
    }

    /// Flatten into the shape hosts map onto their own exception type.
    pub fn report(&self) -> ErrnoReport {
        ErrnoReport {
            operation_name: self.operation_name().to_string(),
            os_error_code: self.os_error_code(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Kernel { command, errno } => {
                write!(f, "{} failed: {} ({})", command, errno.desc(), *errno as i32)
            }
            Error::InvalidPath(path) => write!(f, "invalid map path {:?}", path),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        std::io::Error::from_raw_os_error(err.os_error_code())
    }
}

/// `{ operationName, osErrorCode }` as handed to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrnoReport {
    pub operation_name: String,
    pub os_error_code: i32,
}

impl From<&Error> for ErrnoReport {
    fn from(err: &Error) -> Self {
        err.report()
    }
}
