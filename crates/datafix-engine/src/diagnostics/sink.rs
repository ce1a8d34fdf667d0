//! Per-migration event sink.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use datafix_schema::DataVersion;

use super::event::{DiagnosticOptions, MigrationEvent};
use super::report::MigrationReport;

/// Collects the events of one `update` call.
///
/// One sink per migration; the engine never shares a sink across calls, so
/// no synchronization is needed.
#[derive(Debug)]
pub struct DiagnosticSink {
    options: DiagnosticOptions,
    type_ref: String,
    from: DataVersion,
    to: DataVersion,
    started: Instant,
    started_at: DateTime<Utc>,
    events: Vec<MigrationEvent>,
}

impl DiagnosticSink {
    pub fn new(
        options: DiagnosticOptions,
        type_ref: String,
        from: DataVersion,
        to: DataVersion,
    ) -> Self {
        Self {
            options,
            type_ref,
            from,
            to,
            started: Instant::now(),
            started_at: Utc::now(),
            events: Vec::new(),
        }
    }

    pub fn options(&self) -> DiagnosticOptions {
        self.options
    }

    pub fn migration_started(&mut self) {
        self.events.push(MigrationEvent::MigrationStarted {
            type_ref: self.type_ref.clone(),
            from: self.from,
            to: self.to,
        });
    }

    pub fn fix_started(&mut self, fix_name: &str) {
        self.events.push(MigrationEvent::FixStarted {
            fix_name: fix_name.to_string(),
        });
    }

    /// Recorded only when `capture_rule_details` is on.
    pub fn rule_applied(&mut self, rule_name: &str, matched: bool, duration: Duration) {
        if !self.options.capture_rule_details {
            return;
        }
        self.events.push(MigrationEvent::RuleApplied {
            rule_name: rule_name.to_string(),
            matched,
            duration,
        });
    }

    /// Snapshots are dropped unless `capture_snapshots` is on.
    pub fn fix_completed(
        &mut self,
        fix_name: &str,
        duration: Duration,
        before: Option<String>,
        after: Option<String>,
    ) {
        let (before, after) = if self.options.capture_snapshots {
            (before, after)
        } else {
            (None, None)
        };
        self.events.push(MigrationEvent::FixCompleted {
            fix_name: fix_name.to_string(),
            duration,
            before,
            after,
        });
    }

    pub fn warning(&mut self, message: &str) {
        self.events.push(MigrationEvent::Warning {
            message: message.to_string(),
        });
    }

    pub fn failed(&mut self, message: &str) {
        self.events.push(MigrationEvent::MigrationFailed {
            message: message.to_string(),
        });
    }

    pub fn completed(&mut self) {
        self.events.push(MigrationEvent::MigrationCompleted {
            duration: self.started.elapsed(),
        });
    }

    pub fn into_report(self) -> MigrationReport {
        MigrationReport {
            type_ref: self.type_ref,
            from: self.from,
            to: self.to,
            started_at: self.started_at,
            duration: self.started.elapsed(),
            events: self.events,
        }
    }
}
