//! Serializable request a host sends to its privileged helper
//!
//! The unprivileged side of the host builds a [`RemoveUidInterfaceRuleCommand`],
//! ships it as JSON to the process running as root, and that process calls
//! [`execute`](RemoveUidInterfaceRuleCommand::execute).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bpf::{BpfSyscall, UidOwnerMatch};
use crate::error::Error;
use crate::rules::{Removal, UidRuleBridge};

fn default_rules() -> u64 {
    UidOwnerMatch::IIF_MATCH as u64
}

/// Lift interface rules (by default `IIF_MATCH`) for one UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveUidInterfaceRuleCommand {
    pub uid: i32,
    #[serde(default = "default_rules")]
    pub rules: u64,
    /// Overrides the configured map path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_path: Option<PathBuf>,
}

impl RemoveUidInterfaceRuleCommand {
    pub fn new(uid: i32) -> Self {
        Self {
            uid,
            rules: default_rules(),
            map_path: None,
        }
    }

    pub fn with_rules(mut self, rules: u64) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.map_path = Some(path.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Run against the process-wide bridge and configured map path.
    pub fn execute(&self) -> Result<bool, Error> {
        self.execute_on(crate::bridge(), &crate::config().map_path)?
            .into_result()
    }

    /// Run against `bridge`, using `default_path` unless the command carries
    /// its own.
    pub fn execute_on<S: BpfSyscall>(
        &self,
        bridge: &UidRuleBridge<S>,
        default_path: &Path,
    ) -> Result<Removal, Error> {
        let path = self.map_path.as_deref().unwrap_or(default_path);
        bridge.remove_rules(path, self.uid as u32, self.rules)
    }
}
