//! Aggregated migration report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use datafix_schema::DataVersion;
use serde::{Deserialize, Serialize};

use super::event::MigrationEvent;

/// Everything one migration produced, ready for external rendering.
///
/// Contains the full event stream plus convenience views for the common
/// questions: did it fail, what warned, how many fixes ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// The migrated type.
    pub type_ref: String,

    /// The version the payload claimed on input.
    pub from: DataVersion,

    /// The version the migration targeted.
    pub to: DataVersion,

    /// Wall-clock start of the migration.
    pub started_at: DateTime<Utc>,

    /// Total time spent in the engine.
    pub duration: Duration,

    /// All events in emission order.
    pub events: Vec<MigrationEvent>,
}

impl MigrationReport {
    pub fn total_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All warning messages, in order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            MigrationEvent::Warning { message } => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// The number of fixes that ran to completion.
    pub fn fixes_applied(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, MigrationEvent::FixCompleted { .. }))
            .count()
    }

    /// The number of rule invocations that matched (only populated when
    /// rule details were captured).
    pub fn rules_matched(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, MigrationEvent::RuleApplied { matched: true, .. }))
            .count()
    }

    /// True if the migration aborted.
    pub fn is_failed(&self) -> bool {
        self.failure().is_some()
    }

    /// The abort message, if the migration aborted.
    pub fn failure(&self) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            MigrationEvent::MigrationFailed { message } => Some(message.as_str()),
            _ => None,
        })
    }

    /// True when nothing failed and nothing warned.
    pub fn is_clean(&self) -> bool {
        !self.is_failed() && self.warning_count() == 0
    }
}
