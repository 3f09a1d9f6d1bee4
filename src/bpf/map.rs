//! Lazily opened, process-lifetime handle to the pinned uid owner map

use std::os::fd::RawFd;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use nix::errno::Errno;
use nix::NixPath;
use tracing::{debug, info, warn};

use super::syscall::{BpfCommand, BpfSyscall, BPF_F_RDWR};
use crate::error::Error;
use crate::{metrics, privileges};

/// Result of asking the cache for a map descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapHandle {
    /// The map is open on this descriptor.
    Open(RawFd),
    /// The kernel does not provide the map or `bpf(2)` on this device.
    Unsupported,
}

/// Holds at most one descriptor for the pinned map.
///
/// The first successful open wins. Later calls get the cached descriptor
/// back without looking at their path argument, and the descriptor is never
/// closed; the kernel reclaims it when the process exits.
#[derive(Debug, Default)]
pub struct MapHandleCache {
    fd: Mutex<Option<RawFd>>,
}

impl MapHandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor currently cached, if any.
    pub fn cached(&self) -> Option<RawFd> {
        *self.fd.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached descriptor or open `path` with `BPF_OBJ_GET`.
    ///
    /// The lock is held across the open so concurrent first callers cannot
    /// both open the map. `ENOSYS` leaves the cache empty and yields
    /// [`MapHandle::Unsupported`]; every other errno is an error.
    pub fn get_or_open<S: BpfSyscall + ?Sized>(
        &self,
        sys: &S,
        path: &Path,
    ) -> Result<MapHandle, Error> {
        let mut slot = self.fd.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fd) = *slot {
            return Ok(MapHandle::Open(fd));
        }

        let opened = path
            .with_nix_path(|pathname| sys.obj_get(pathname, BPF_F_RDWR))
            .map_err(|_| Error::InvalidPath(path.display().to_string()))?;

        match opened {
            Ok(fd) => {
                debug!(path = %path.display(), fd, "Opened uid owner map");
                metrics::record_map_open();
                *slot = Some(fd);
                Ok(MapHandle::Open(fd))
            }
            Err(Errno::ENOSYS) => {
                info!(path = %path.display(), "uid owner map not supported on this kernel");
                Ok(MapHandle::Unsupported)
            }
            Err(errno) => {
                warn!(
                    path = %path.display(),
                    errno = %errno,
                    privileges = %privileges::describe_if_denied(errno),
                    "BPF_OBJ_GET failed"
                );
                metrics::record_kernel_error(BpfCommand::ObjGet);
                Err(Error::kernel(BpfCommand::ObjGet, errno))
            }
        }
    }
}
