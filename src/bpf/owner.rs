//! Value layout and rule bits of the kernel's uid owner map
//!
//! The map is keyed by UID (`u32`) and stores a [`UidOwnerValue`]. Each bit of
//! `rule` is one owner match type; netd and the connectivity module set and
//! clear them as firewall chains change.

/// Where the connectivity module pins the uid owner map.
pub const DEFAULT_UID_OWNER_MAP_PATH: &str = "/sys/fs/bpf/netd_shared/map_netd_uid_owner_map";

/// One entry of the uid owner map.
///
/// `iif` is the interface index used by `IIF_MATCH`. It is carried through
/// untouched on write-back.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UidOwnerValue {
    pub iif: i32,
    pub rule: u32,
}

impl UidOwnerValue {
    pub fn new(iif: i32, rule: u32) -> Self {
        Self { iif, rule }
    }
}

/// Owner match bits stored in [`UidOwnerValue::rule`].
pub struct UidOwnerMatch;

impl UidOwnerMatch {
    pub const NO_MATCH: u32 = 0;
    pub const HAPPY_BOX: u32 = 1 << 0;
    pub const PENALTY_BOX: u32 = 1 << 1;
    pub const DOZABLE: u32 = 1 << 2;
    pub const STANDBY: u32 = 1 << 3;
    pub const POWERSAVE: u32 = 1 << 4;
    pub const RESTRICTED: u32 = 1 << 5;
    pub const LOW_POWER_STANDBY: u32 = 1 << 6;
    /// Restricts the UID to the interface in `iif`. This is the rule
    /// lockdown VPNs install and the one tethering needs lifted.
    pub const IIF_MATCH: u32 = 1 << 7;
    pub const LOCKDOWN_VPN: u32 = 1 << 8;

    const NAMES: &'static [(u32, &'static str)] = &[
        (Self::HAPPY_BOX, "HAPPY_BOX"),
        (Self::PENALTY_BOX, "PENALTY_BOX"),
        (Self::DOZABLE, "DOZABLE"),
        (Self::STANDBY, "STANDBY"),
        (Self::POWERSAVE, "POWERSAVE"),
        (Self::RESTRICTED, "RESTRICTED"),
        (Self::LOW_POWER_STANDBY, "LOW_POWER_STANDBY"),
        (Self::IIF_MATCH, "IIF_MATCH"),
        (Self::LOCKDOWN_VPN, "LOCKDOWN_VPN"),
    ];
}

/// Render a rule mask as `NAME|NAME|0x...` for logs.
///
/// Unknown bits are kept as a hex remainder so nothing is hidden.
pub fn describe_rules(rules: u32) -> String {
    if rules == UidOwnerMatch::NO_MATCH {
        return "NO_MATCH".to_string();
    }

    let mut parts = Vec::new();
    let mut rest = rules;
    for &(bit, name) in UidOwnerMatch::NAMES {
        if rules & bit != 0 {
            parts.push(name.to_string());
            rest &= !bit;
        }
    }
    if rest != 0 {
        parts.push(format!("{:#x}", rest));
    }
    parts.join("|")
}
