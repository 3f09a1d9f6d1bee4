//! Kernel-side access to the pinned uid owner map
//!
//! Three layers, leaf first:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  rules::UidRuleBridge                                       │
//! │    lookup → mask test → update (rule != 0) / delete         │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  MapHandleCache                                             │
//! │    first call: BPF_OBJ_GET(path) → fd, kept for the process │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  BpfSyscall / KernelBpf                                     │
//! │    bpf(cmd, &attr, sizeof attr) → Result<_, Errno>          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `syscall` knows the byte layout of `union bpf_attr`.
//!
//! ## Requirements
//!
//! - Kernel with CONFIG_BPF_SYSCALL=y and bpffs mounted at /sys/fs/bpf
//! - CAP_BPF or CAP_NET_ADMIN (or root) to open and edit the map

mod map;
mod owner;
mod syscall;

pub use map::{MapHandle, MapHandleCache};
pub use owner::{describe_rules, UidOwnerMatch, UidOwnerValue, DEFAULT_UID_OWNER_MAP_PATH};
pub use syscall::{BpfCommand, BpfSyscall, KernelBpf, BPF_ANY, BPF_EXIST, BPF_F_RDWR, BPF_NOEXIST};
