//! Capability diagnostics for permission failures
//!
//! Nothing here grants or drops privileges. When the kernel answers a bpf
//! command with `EPERM`/`EACCES`, the log line carries which of the relevant
//! capabilities the process actually holds.

use caps::{CapSet, Capability};
use nix::errno::Errno;

/// Capabilities that gate access to the uid owner map.
pub const BPF_MAP_CAPS: &[Capability] = &[
    Capability::CAP_BPF,
    Capability::CAP_NET_ADMIN,
    Capability::CAP_SYS_ADMIN,
];

/// Convert capability enum to readable name
fn cap_name(cap: Capability) -> &'static str {
    match cap {
        Capability::CAP_BPF => "CAP_BPF",
        Capability::CAP_NET_ADMIN => "CAP_NET_ADMIN",
        Capability::CAP_SYS_ADMIN => "CAP_SYS_ADMIN",
        _ => "UNKNOWN_CAP",
    }
}

/// Names of the map-related capabilities in the effective set.
///
/// Returns `None` if the set cannot be read.
pub fn effective_bpf_caps() -> Option<Vec<&'static str>> {
    let effective = caps::read(None, CapSet::Effective).ok()?;
    Some(
        BPF_MAP_CAPS
            .iter()
            .filter(|cap| effective.contains(*cap))
            .map(|cap| cap_name(*cap))
            .collect(),
    )
}

/// Short capability summary for permission errnos, empty otherwise.
pub fn describe_if_denied(errno: Errno) -> String {
    if !matches!(errno, Errno::EPERM | Errno::EACCES) {
        return String::new();
    }
    match effective_bpf_caps() {
        Some(held) if held.is_empty() => "effective caps: (none)".to_string(),
        Some(held) => format!("effective caps: {}", held.join(",")),
        None => "effective caps: (unable to read)".to_string(),
    }
}
