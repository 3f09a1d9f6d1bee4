//! In-memory stand-in for the kernel's uid owner map

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::CStr;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use nix::errno::Errno;
use uid_owner_bridge::{BpfCommand, BpfSyscall, UidOwnerValue};

pub const FAKE_MAP_FD: RawFd = 77;
pub const MAP_PATH: &str = "/sys/fs/bpf/netd_shared/map_netd_uid_owner_map";

/// One call the bridge made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ObjGet(String),
    Lookup(u32),
    Update(u32, UidOwnerValue, u64),
    Delete(u32),
}

#[derive(Default)]
pub struct FakeKernel {
    entries: Mutex<HashMap<u32, UidOwnerValue>>,
    failures: Mutex<HashMap<BpfCommand, Errno>>,
    calls: Mutex<Vec<Call>>,
    opens: AtomicUsize,
    lookup_delay: Option<Duration>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every lookup to widen lookup/update races.
    pub fn with_lookup_delay(delay: Duration) -> Self {
        Self {
            lookup_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_entry(self, uid: u32, rule: u32) -> Self {
        self.insert(uid, UidOwnerValue::new(0, rule));
        self
    }

    pub fn insert(&self, uid: u32, value: UidOwnerValue) {
        self.entries.lock().unwrap().insert(uid, value);
    }

    /// Make every future `command` fail with `errno`.
    pub fn fail(&self, command: BpfCommand, errno: Errno) {
        self.failures.lock().unwrap().insert(command, errno);
    }

    pub fn clear_failure(&self, command: BpfCommand) {
        self.failures.lock().unwrap().remove(&command);
    }

    pub fn entry(&self, uid: u32) -> Option<UidOwnerValue> {
        self.entries.lock().unwrap().get(&uid).copied()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, command: BpfCommand) -> Result<(), Errno> {
        match self.failures.lock().unwrap().get(&command) {
            Some(errno) => Err(*errno),
            None => Ok(()),
        }
    }

    fn check_fd(map_fd: RawFd) -> Result<(), Errno> {
        if map_fd == FAKE_MAP_FD {
            Ok(())
        } else {
            Err(Errno::EBADF)
        }
    }
}

impl BpfSyscall for FakeKernel {
    fn obj_get(&self, pathname: &CStr, _file_flags: u32) -> Result<RawFd, Errno> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.record(Call::ObjGet(pathname.to_string_lossy().into_owned()));
        self.injected(BpfCommand::ObjGet)?;
        Ok(FAKE_MAP_FD)
    }

    fn lookup_elem(&self, map_fd: RawFd, key: u32) -> Result<UidOwnerValue, Errno> {
        self.record(Call::Lookup(key));
        Self::check_fd(map_fd)?;
        self.injected(BpfCommand::MapLookupElem)?;
        let value = self.entry(key).ok_or(Errno::ENOENT)?;
        if let Some(delay) = self.lookup_delay {
            std::thread::sleep(delay);
        }
        Ok(value)
    }

    fn update_elem(
        &self,
        map_fd: RawFd,
        key: u32,
        value: &UidOwnerValue,
        flags: u64,
    ) -> Result<(), Errno> {
        self.record(Call::Update(key, *value, flags));
        Self::check_fd(map_fd)?;
        self.injected(BpfCommand::MapUpdateElem)?;
        self.insert(key, *value);
        Ok(())
    }

    fn delete_elem(&self, map_fd: RawFd, key: u32) -> Result<(), Errno> {
        self.record(Call::Delete(key));
        Self::check_fd(map_fd)?;
        self.injected(BpfCommand::MapDeleteElem)?;
        self.entries
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(Errno::ENOENT)
    }
}
