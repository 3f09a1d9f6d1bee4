//! Prometheus metrics for uid owner rule removal
//!
//! The public result of a removal is a single boolean. These counters keep
//! the reason behind a `false` (no entry, no matching bits, no map support)
//! visible to whoever scrapes the default registry.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

use crate::bpf::BpfCommand;
use crate::rules::Outcome;

lazy_static! {
    /// Removal outcomes by reason.
    ///
    /// Labels:
    /// - outcome: "applied", "not_found", "no_match" or "unsupported"
    pub static ref RULE_REMOVAL_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "uid_owner_bridge_outcomes_total",
        "uid owner rule removals by outcome",
        &["outcome"]
    ).expect("failed to register RULE_REMOVAL_OUTCOMES metric");

    /// Unexpected kernel failures by bpf command.
    ///
    /// Labels:
    /// - operation: e.g. "BPF_MAP_LOOKUP_ELEM"
    pub static ref KERNEL_ERRORS: IntCounterVec = register_int_counter_vec!(
        "uid_owner_bridge_kernel_errors_total",
        "Unexpected bpf(2) failures by operation",
        &["operation"]
    ).expect("failed to register KERNEL_ERRORS metric");

    /// Successful BPF_OBJ_GET calls. Stays at 1 for a healthy process.
    pub static ref MAP_OPENS: IntCounter = register_int_counter!(
        "uid_owner_bridge_map_opens_total",
        "Times the uid owner map was opened"
    ).expect("failed to register MAP_OPENS metric");

    /// Whether the uid owner map descriptor is cached (1) or not (0).
    pub static ref MAP_OPEN: IntGauge = register_int_gauge!(
        "uid_owner_bridge_map_open",
        "Whether the uid owner map is open (1) or not (0)"
    ).expect("failed to register MAP_OPEN metric");
}

/// Count one finished removal.
pub fn record_outcome(outcome: Outcome) {
    RULE_REMOVAL_OUTCOMES
        .with_label_values(&[outcome.as_str()])
        .inc();
}

/// Count one unexpected kernel failure.
pub fn record_kernel_error(command: BpfCommand) {
    KERNEL_ERRORS.with_label_values(&[command.name()]).inc();
}

pub fn record_map_open() {
    MAP_OPENS.inc();
    MAP_OPEN.set(1);
}
