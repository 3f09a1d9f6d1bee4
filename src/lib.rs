//! uid-owner-bridge - clears per-UID owner rules in the kernel's uid owner map
//!
//! A privileged helper uses this crate to lift firewall owner rules (such as
//! `IIF_MATCH`) for one UID by editing the pinned BPF hash map directly.
//! When the last rule bit of an entry is cleared, the entry is deleted.
//!
//! # Modules
//!
//! - `bpf` - `bpf(2)` gateway, map value layout and the cached map handle
//! - `rules` - the lookup / mask / update-or-delete protocol
//! - `command` - JSON request a host hands to its root process
//! - `config` - map path and locking configuration
//! - `error` - kernel failures with operation name and errno
//! - `logging` - `tracing-subscriber` setup for hosts without one
//! - `metrics` - Prometheus counters for outcomes and kernel errors
//! - `privileges` - capability diagnostics for permission errors
//!
//! # Quick Start
//!
//! ```ignore
//! use uid_owner_bridge::{remove_uid_interface_rules, UidOwnerMatch, DEFAULT_UID_OWNER_MAP_PATH};
//!
//! // true if IIF_MATCH was set for the UID and has been cleared
//! let applied = remove_uid_interface_rules(
//!     DEFAULT_UID_OWNER_MAP_PATH,
//!     10123,
//!     UidOwnerMatch::IIF_MATCH as i64,
//! )?;
//! ```

use std::path::Path;

use lazy_static::lazy_static;

pub mod bpf;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod privileges;
pub mod rules;

// Re-export commonly used types at crate root for convenience
pub use bpf::{
    describe_rules, BpfCommand, BpfSyscall, KernelBpf, UidOwnerMatch, UidOwnerValue,
    DEFAULT_UID_OWNER_MAP_PATH,
};
pub use command::RemoveUidInterfaceRuleCommand;
pub use config::{BridgeConfig, LogFormat};
pub use error::{ErrnoReport, Error};
pub use rules::{Outcome, Removal, UidRuleBridge};

lazy_static! {
    static ref CONFIG: BridgeConfig = BridgeConfig::from_env();
    static ref BRIDGE: UidRuleBridge<KernelBpf> =
        UidRuleBridge::with_serialization(KernelBpf::new(), CONFIG.serialize_mutations);
}

/// Configuration the process-wide bridge was built from.
pub fn config() -> &'static BridgeConfig {
    &CONFIG
}

/// The process-wide bridge over the real kernel.
pub fn bridge() -> &'static UidRuleBridge<KernelBpf> {
    &BRIDGE
}

/// Remove `rules` from the uid owner entry of `uid`.
///
/// Returns `Ok(true)` if any requested bit was set and a write-back or
/// delete was issued, `Ok(false)` when the map is unsupported, the UID has
/// no entry, or none of the bits matched. Unexpected kernel failures,
/// including a failed write-back after the bits matched, return `Err`.
///
/// The map is opened on the first call; later calls reuse it and ignore
/// `map_path`.
pub fn remove_uid_interface_rules(
    map_path: impl AsRef<Path>,
    uid: i32,
    rules: i64,
) -> Result<bool, Error> {
    remove_uid_interface_rules_detailed(map_path, uid, rules)?.into_result()
}

/// Like [`remove_uid_interface_rules`] but keeps the outcome and any
/// write-back error side by side.
pub fn remove_uid_interface_rules_detailed(
    map_path: impl AsRef<Path>,
    uid: i32,
    rules: i64,
) -> Result<Removal, Error> {
    BRIDGE.remove_rules(map_path.as_ref(), uid as u32, rules as u64)
}
