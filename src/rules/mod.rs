//! Removing owner rule bits for a UID
//!
//! ## Protocol
//!
//! ```text
//! remove_rules(path, uid, rules)
//!    │
//!    ├─► MapHandleCache::get_or_open(path)
//!    │      ├─ Unsupported ──────────────────────────► Outcome::Unsupported
//!    │      └─ error ────────────────────────────────► Err
//!    │
//!    ├─► BPF_MAP_LOOKUP_ELEM(uid)
//!    │      ├─ ENOENT ───────────────────────────────► Outcome::NotFound
//!    │      └─ other errno ──────────────────────────► Err
//!    │
//!    ├─► value.rule & rules == 0 ────────────────────► Outcome::NoMatch
//!    │
//!    └─► value.rule &= !rules
//!           ├─ != 0 → BPF_MAP_UPDATE_ELEM(BPF_ANY) ─┐
//!           └─ == 0 → BPF_MAP_DELETE_ELEM (ENOENT ok)┴► Outcome::Applied
//!                                                       (+ deferred error)
//! ```
//!
//! An entry is never written back with `rule == 0`.
//!
//! `Applied` means the requested bits were present and a write was attempted.
//! If that write fails the error rides along in [`Removal::deferred_error`]
//! instead of replacing the outcome.

mod bridge;

pub use bridge::UidRuleBridge;

use crate::error::Error;

/// Why a removal did or did not change the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The requested bits were set; the entry was updated or deleted.
    Applied,
    /// No entry exists for the UID.
    NotFound,
    /// The entry exists but none of the requested bits are set.
    NoMatch,
    /// The map or `bpf(2)` is not available on this device.
    Unsupported,
}

impl Outcome {
    /// The host-facing boolean. Only `Applied` is `true`.
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::NotFound => "not_found",
            Outcome::NoMatch => "no_match",
            Outcome::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one removal that got as far as deciding an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub outcome: Outcome,
    /// Update/delete failure after the outcome was already `Applied`.
    pub deferred_error: Option<Error>,
}

impl Removal {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            deferred_error: None,
        }
    }

    pub fn applied_with(deferred_error: Option<Error>) -> Self {
        Self {
            outcome: Outcome::Applied,
            deferred_error,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }

    /// Collapse into the raise-on-error convention: a deferred error wins
    /// over the boolean, as a thrown exception would.
    pub fn into_result(self) -> Result<bool, Error> {
        match self.deferred_error {
            Some(err) => Err(err),
            None => Ok(self.outcome.is_applied()),
        }
    }
}
