//! UidRuleBridge - lookup, mask and write-back against the uid owner map

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use nix::errno::Errno;
use tracing::{debug, warn};

use super::{Outcome, Removal};
use crate::bpf::{describe_rules, BpfCommand, BpfSyscall, MapHandle, MapHandleCache, BPF_ANY};
use crate::error::Error;
use crate::{metrics, privileges};

/// Edits owner rules in the pinned uid owner map.
///
/// Holds the syscall gateway and the map descriptor cache. With
/// `serialize_mutations` on, the lookup-then-write sequence of concurrent
/// callers is serialized so two bit-clears on the same UID cannot clobber
/// each other.
///
/// # Example
///
/// ```ignore
/// let bridge = UidRuleBridge::new(KernelBpf::new());
/// let removal = bridge.remove_rules(
///     Path::new(DEFAULT_UID_OWNER_MAP_PATH),
///     10123,
///     UidOwnerMatch::IIF_MATCH as u64,
/// )?;
/// ```
#[derive(Debug)]
pub struct UidRuleBridge<S> {
    sys: S,
    handle: MapHandleCache,
    mutation_lock: Option<Mutex<()>>,
}

impl<S: BpfSyscall> UidRuleBridge<S> {
    /// Create a bridge that serializes mutations.
    pub fn new(sys: S) -> Self {
        Self::with_serialization(sys, true)
    }

    /// Create a bridge, choosing whether lookup/write sequences are
    /// serialized within this process.
    pub fn with_serialization(sys: S, serialize_mutations: bool) -> Self {
        Self {
            sys,
            handle: MapHandleCache::new(),
            mutation_lock: serialize_mutations.then(|| Mutex::new(())),
        }
    }

    pub fn syscalls(&self) -> &S {
        &self.sys
    }

    pub fn handle_cache(&self) -> &MapHandleCache {
        &self.handle
    }

    pub fn serializes_mutations(&self) -> bool {
        self.mutation_lock.is_some()
    }

    /// Clear `rules` from the entry for `uid`, deleting the entry if no
    /// bits remain.
    ///
    /// Only the low 32 bits of `rules` can match, since the stored rule
    /// is 32-bit. `path` is only used on the call that opens the map.
    ///
    /// Returns `Err` when opening the map or the lookup fails unexpectedly;
    /// nothing has been changed in that case.
    pub fn remove_rules(&self, path: &Path, uid: u32, rules: u64) -> Result<Removal, Error> {
        let fd = match self.handle.get_or_open(&self.sys, path)? {
            MapHandle::Open(fd) => fd,
            MapHandle::Unsupported => return Ok(finish(uid, Removal::new(Outcome::Unsupported))),
        };

        let _guard = self
            .mutation_lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));

        let mut value = match self.sys.lookup_elem(fd, uid) {
            Ok(value) => value,
            Err(Errno::ENOENT) => return Ok(finish(uid, Removal::new(Outcome::NotFound))),
            Err(errno) => return Err(kernel_failure(BpfCommand::MapLookupElem, uid, errno)),
        };

        let mask = rules as u32;
        if value.rule & mask == 0 {
            debug!(
                uid,
                stored = %describe_rules(value.rule),
                requested = %describe_rules(mask),
                "No requested rule bits set"
            );
            return Ok(finish(uid, Removal::new(Outcome::NoMatch)));
        }

        value.rule &= !mask;
        let deferred_error = if value.rule != 0 {
            match self.sys.update_elem(fd, uid, &value, BPF_ANY) {
                Ok(()) => {
                    debug!(uid, remaining = %describe_rules(value.rule), "Updated uid owner entry");
                    None
                }
                Err(errno) => Some(kernel_failure(BpfCommand::MapUpdateElem, uid, errno)),
            }
        } else {
            match self.sys.delete_elem(fd, uid) {
                Ok(()) => {
                    debug!(uid, "Deleted uid owner entry");
                    None
                }
                Err(Errno::ENOENT) => {
                    debug!(uid, "uid owner entry already deleted");
                    None
                }
                Err(errno) => Some(kernel_failure(BpfCommand::MapDeleteElem, uid, errno)),
            }
        };

        Ok(finish(uid, Removal::applied_with(deferred_error)))
    }
}

fn finish(uid: u32, removal: Removal) -> Removal {
    debug!(uid, outcome = %removal.outcome, "uid owner rule removal finished");
    metrics::record_outcome(removal.outcome);
    removal
}

fn kernel_failure(command: BpfCommand, uid: u32, errno: Errno) -> Error {
    warn!(
        uid,
        operation = command.name(),
        errno = %errno,
        privileges = %privileges::describe_if_denied(errno),
        "bpf command failed"
    );
    metrics::record_kernel_error(command);
    Error::kernel(command, errno)
}
