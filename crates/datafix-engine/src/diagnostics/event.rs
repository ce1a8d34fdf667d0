//! Structured migration events.

use std::time::Duration;

use datafix_schema::DataVersion;
use serde::{Deserialize, Serialize};

/// Controls diagnostic granularity for one engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticOptions {
    /// Emit a `RuleApplied` event for every rule invocation.
    pub capture_rule_details: bool,
    /// Attach before/after value snapshots to `FixCompleted` events.
    pub capture_snapshots: bool,
}

impl DiagnosticOptions {
    /// Everything on. The verbose setting used by inspection tooling.
    pub fn verbose() -> Self {
        Self {
            capture_rule_details: true,
            capture_snapshots: true,
        }
    }
}

/// One event in a migration's diagnostic stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationEvent {
    MigrationStarted {
        type_ref: String,
        from: DataVersion,
        to: DataVersion,
    },
    FixStarted {
        fix_name: String,
    },
    RuleApplied {
        rule_name: String,
        matched: bool,
        duration: Duration,
    },
    FixCompleted {
        fix_name: String,
        duration: Duration,
        #[serde(skip_serializing_if = "Option::is_none")]
        before: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        after: Option<String>,
    },
    Warning {
        message: String,
    },
    MigrationFailed {
        message: String,
    },
    MigrationCompleted {
        duration: Duration,
    },
}
