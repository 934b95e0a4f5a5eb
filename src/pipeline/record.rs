use super::PhaseKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum TargetStatus {
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    #[serde(flatten)]
    pub status: TargetStatus,
    pub elapsed: Duration,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TargetStatus::Succeeded)
    }
}

/// What one backend worker did during one phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseRunRecord {
    pub backend: String,
    pub phase: PhaseKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcomes: Vec<TargetOutcome>,
}

impl PhaseRunRecord {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// All backend records of one completed phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: PhaseKind,
    pub records: Vec<PhaseRunRecord>,
    pub elapsed: Duration,
    /// Workers that ended without producing a record
    pub lost_workers: usize,
}

impl PhaseReport {
    pub fn record(&self, backend: &str) -> Option<&PhaseRunRecord> {
        self.records.iter().find(|r| r.backend == backend)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Skipped { phase: PhaseKind },
    Completed(PhaseReport),
}

impl PhaseOutcome {
    pub fn phase(&self) -> PhaseKind {
        match self {
            PhaseOutcome::Skipped { phase } => *phase,
            PhaseOutcome::Completed(report) => report.phase,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PhaseOutcome::Skipped { .. })
    }

    pub fn report(&self) -> Option<&PhaseReport> {
        match self {
            PhaseOutcome::Completed(report) => Some(report),
            PhaseOutcome::Skipped { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(target: &str, status: TargetStatus) -> TargetOutcome {
        TargetOutcome {
            target: target.to_string(),
            status,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_record_counts() {
        let now = Utc::now();
        let record = PhaseRunRecord {
            backend: "github".to_string(),
            phase: PhaseKind::Collection,
            started_at: now,
            finished_at: now,
            elapsed: Duration::ZERO,
            outcomes: vec![
                outcome("o/a", TargetStatus::Succeeded),
                outcome("badtarget", TargetStatus::Failed("malformed".to_string())),
                outcome("o/b", TargetStatus::Succeeded),
            ],
        };

        assert_eq!(record.succeeded(), 2);
        assert_eq!(record.failed(), 1);
        assert_eq!(record.failures().next().unwrap().target, "badtarget");
    }

    #[test]
    fn test_outcome_serializes_status_inline() {
        let json = serde_json::to_value(outcome("x", TargetStatus::Failed("boom".to_string())))
            .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["target"], "x");
    }

    #[test]
    fn test_skipped_outcome_has_no_report() {
        let outcome = PhaseOutcome::Skipped {
            phase: PhaseKind::Enrichment,
        };
        assert!(outcome.is_skipped());
        assert!(outcome.report().is_none());
        assert_eq!(outcome.phase(), PhaseKind::Enrichment);
    }
}
