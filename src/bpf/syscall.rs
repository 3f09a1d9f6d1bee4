//! Thin gateway over the `bpf(2)` syscall
//!
//! Every kernel operation this crate performs funnels through [`KernelBpf`].
//! The attribute records below mirror the anonymous structs inside the
//! kernel's `union bpf_attr`, one per command family, so their field order,
//! widths and offsets are part of the kernel ABI and must not change.
//!
//! ```text
//! union bpf_attr (subset)
//! ┌──────────────────────── BPF_MAP_*_ELEM ─────────────────────────┐
//! │ 0: map_fd u32 │ 4: pad │ 8: key u64 │ 16: value u64 │ 24: flags  │
//! └──────────────────────────────────────────────────────────────────┘
//! ┌──────────────────────── BPF_OBJ_GET ─────────────────────────────┐
//! │ 0: pathname u64 │ 8: bpf_fd u32 │ 12: file_flags │ 16: path_fd  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::ffi::CStr;
use std::mem;
use std::os::fd::RawFd;

use nix::errno::Errno;

use super::owner::UidOwnerValue;

/// Create a new element or update an existing one.
pub const BPF_ANY: u64 = 0;
/// Create a new element only if it did not exist.
pub const BPF_NOEXIST: u64 = 1;
/// Update an existing element only.
pub const BPF_EXIST: u64 = 2;

/// `file_flags` for `BPF_OBJ_GET`: read-write access without `BPF_F_RDONLY`
/// or `BPF_F_WRONLY`. The pinned path is not `flock`ed by this crate.
pub const BPF_F_RDWR: u32 = 0;

/// The subset of `enum bpf_cmd` used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum BpfCommand {
    MapLookupElem = 1,
    MapUpdateElem = 2,
    MapDeleteElem = 3,
    ObjGet = 7,
}

impl BpfCommand {
    /// Kernel name of the command, as reported in errors and metrics.
    pub fn name(self) -> &'static str {
        match self {
            BpfCommand::MapLookupElem => "BPF_MAP_LOOKUP_ELEM",
            BpfCommand::MapUpdateElem => "BPF_MAP_UPDATE_ELEM",
            BpfCommand::MapDeleteElem => "BPF_MAP_DELETE_ELEM",
            BpfCommand::ObjGet => "BPF_OBJ_GET",
        }
    }
}

impl std::fmt::Display for BpfCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes for `BPF_OBJ_GET`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ObjGetAttr {
    pub pathname: u64,
    pub bpf_fd: u32,
    pub file_flags: u32,
    pub path_fd: i32,
    pub _pad: u32,
}

/// Attributes for `BPF_MAP_LOOKUP_ELEM`, `BPF_MAP_UPDATE_ELEM` and
/// `BPF_MAP_DELETE_ELEM`. `value` shares its slot with `next_key` in the
/// kernel union.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MapElemAttr {
    pub map_fd: u32,
    pub _pad: u32,
    pub key: u64,
    pub value: u64,
    pub flags: u64,
}

/// The kernel operations the uid-owner protocol needs.
///
/// [`KernelBpf`] is the real implementation. Each method returns the errno
/// captured right after its own syscall, so no later call can clobber it.
pub trait BpfSyscall: Send + Sync {
    /// Open a pinned BPF object by path, returning a new descriptor.
    fn obj_get(&self, pathname: &CStr, file_flags: u32) -> Result<RawFd, Errno>;

    /// Read the value stored under `key`.
    fn lookup_elem(&self, map_fd: RawFd, key: u32) -> Result<UidOwnerValue, Errno>;

    /// Store `value` under `key` according to `flags` (`BPF_ANY` etc).
    fn update_elem(
        &self,
        map_fd: RawFd,
        key: u32,
        value: &UidOwnerValue,
        flags: u64,
    ) -> Result<(), Errno>;

    /// Remove the entry under `key`.
    fn delete_elem(&self, map_fd: RawFd, key: u32) -> Result<(), Errno>;
}

/// Issues real `bpf(2)` syscalls.
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelBpf;

impl KernelBpf {
    pub fn new() -> Self {
        Self
    }
}

/// Invoke `bpf(cmd, attr, sizeof(attr))`.
///
/// Errno is read before anything else can run on this thread.
fn sys_bpf<T>(cmd: BpfCommand, attr: &T) -> Result<libc::c_long, Errno> {
    // SAFETY: `attr` is a #[repr(C)] record matching the kernel layout for
    // `cmd`, and any pointers it carries outlive the call.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_bpf,
            cmd as libc::c_long,
            attr as *const T as *const libc::c_void,
            mem::size_of::<T>() as libc::c_uint,
        )
    };
    if ret < 0 {
        return Err(Errno::last());
    }
    Ok(ret)
}

impl BpfSyscall for KernelBpf {
    fn obj_get(&self, pathname: &CStr, file_flags: u32) -> Result<RawFd, Errno> {
        let attr = ObjGetAttr {
            pathname: pathname.as_ptr() as u64,
            file_flags,
            ..Default::default()
        };
        let fd = sys_bpf(BpfCommand::ObjGet, &attr)?;
        RawFd::try_from(fd).map_err(|_| Errno::EBADF)
    }

    fn lookup_elem(&self, map_fd: RawFd, key: u32) -> Result<UidOwnerValue, Errno> {
        let mut value = UidOwnerValue::default();
        let attr = MapElemAttr {
            map_fd: map_fd as u32,
            key: &key as *const u32 as u64,
            value: &mut value as *mut UidOwnerValue as u64,
            ..Default::default()
        };
        sys_bpf(BpfCommand::MapLookupElem, &attr)?;
        Ok(value)
    }

    fn update_elem(
        &self,
        map_fd: RawFd,
        key: u32,
        value: &UidOwnerValue,
        flags: u64,
    ) -> Result<(), Errno> {
        let attr = MapElemAttr {
            map_fd: map_fd as u32,
            key: &key as *const u32 as u64,
            value: value as *const UidOwnerValue as u64,
            flags,
            ..Default::default()
        };
        sys_bpf(BpfCommand::MapUpdateElem, &attr).map(|_| ())
    }

    fn delete_elem(&self, map_fd: RawFd, key: u32) -> Result<(), Errno> {
        let attr = MapElemAttr {
            map_fd: map_fd as u32,
            key: &key as *const u32 as u64,
            ..Default::default()
        };
        sys_bpf(BpfCommand::MapDeleteElem, &attr).map(|_| ())
    }
}
