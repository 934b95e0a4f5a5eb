//! Output formatting for command results

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::pipeline::{BackendGroups, CycleReport, PhaseOutcome};
use crate::util::format_elapsed;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_groups(&self, groups: &BackendGroups) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(groups),
            OutputFormat::Yaml => to_yaml(groups),
            OutputFormat::Human => Ok(groups_human(groups)),
        }
    }

    pub fn format_cycle(&self, report: &CycleReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Yaml => to_yaml(report),
            OutputFormat::Human => Ok(cycle_human(report)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize output as YAML")
}

fn groups_human(groups: &BackendGroups) -> String {
    if groups.is_empty() {
        return "No targets declared for any configured backend".to_string();
    }

    let mut out = String::new();
    for group in groups.iter() {
        let _ = writeln!(out, "{} ({} targets)", group.backend, group.targets.len());
        for target in &group.targets {
            let _ = writeln!(out, "  {}", target);
        }
    }
    let _ = write!(
        out,
        "Total: {} targets across {} backends",
        groups.total_targets(),
        groups.len()
    );
    out
}

fn cycle_human(report: &CycleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cycle {}", report.cycle);

    if let Some(error) = &report.config_error {
        let _ = write!(out, "  Configuration error: {}", error);
        return out;
    }

    for outcome in &report.phases {
        match outcome {
            PhaseOutcome::Skipped { phase } => {
                let _ = writeln!(out, "  {}: skipped", phase);
            }
            PhaseOutcome::Completed(phase_report) => {
                let _ = writeln!(
                    out,
                    "  {}: {} backends in {}",
                    phase_report.phase,
                    phase_report.records.len(),
                    format_elapsed(phase_report.elapsed)
                );
                for record in &phase_report.records {
                    let _ = writeln!(
                        out,
                        "    {}: {} ok, {} failed",
                        record.backend,
                        record.succeeded(),
                        record.failed()
                    );
                    for failure in record.failures() {
                        if let crate::pipeline::TargetStatus::Failed(error) = &failure.status {
                            let _ = writeln!(out, "      {}: {}", failure.target, error);
                        }
                    }
                }
            }
        }
    }

    if report.cancelled {
        let _ = writeln!(out, "  Interrupted before completion");
    }
    let _ = write!(out, "  Total: {}", format_elapsed(report.elapsed));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PhaseKind, PhaseReport, PhaseRunRecord, TargetOutcome, TargetStatus};
    use chrono::Utc;
    use std::time::Duration;

    fn groups() -> BackendGroups {
        let mut groups = BackendGroups::new();
        groups.extend("git", vec!["a.git".to_string(), "b.git".to_string()]);
        groups.extend("github", vec!["o/r".to_string()]);
        groups
    }

    fn report() -> CycleReport {
        let now = Utc::now();
        CycleReport {
            cycle: 3,
            phases: vec![
                PhaseOutcome::Completed(PhaseReport {
                    phase: PhaseKind::Collection,
                    records: vec![PhaseRunRecord {
                        backend: "github".to_string(),
                        phase: PhaseKind::Collection,
                        started_at: now,
                        finished_at: now,
                        elapsed: Duration::from_secs(2),
                        outcomes: vec![TargetOutcome {
                            target: "badtarget".to_string(),
                            status: TargetStatus::Failed("malformed".to_string()),
                            elapsed: Duration::ZERO,
                        }],
                    }],
                    elapsed: Duration::from_secs(2),
                    lost_workers: 0,
                }),
                PhaseOutcome::Skipped {
                    phase: PhaseKind::Identities,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_groups(&groups())
            .unwrap();
        assert!(output.contains("git (2 targets)"));
        assert!(output.contains("  o/r"));
        assert!(output.ends_with("Total: 3 targets across 2 backends"));
    }

    #[test]
    fn test_groups_json_keeps_order() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_groups(&groups())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["backend"], "git");
        assert_eq!(parsed[1]["targets"][0], "o/r");
    }

    #[test]
    fn test_groups_yaml() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_groups(&groups())
            .unwrap();
        assert!(output.contains("backend: github"));
    }

    #[test]
    fn test_empty_groups_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_groups(&BackendGroups::new())
            .unwrap();
        assert!(output.starts_with("No targets"));
    }

    #[test]
    fn test_cycle_human_lists_failures() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_cycle(&report())
            .unwrap();
        assert!(output.starts_with("Cycle 3"));
        assert!(output.contains("github: 0 ok, 1 failed"));
        assert!(output.contains("badtarget: malformed"));
        assert!(output.contains("Identities collection: skipped"));
    }

    #[test]
    fn test_cycle_json() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_cycle(&report())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["cycle"], 3);
        assert_eq!(parsed["phases"][0]["outcome"], "completed");
        assert_eq!(parsed["phases"][1]["phase"], "identities");
    }

    #[test]
    fn test_cycle_with_config_error() {
        let report = CycleReport {
            cycle: 1,
            config_error: Some("missing file".to_string()),
            ..Default::default()
        };
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_cycle(&report)
            .unwrap();
        assert!(output.contains("Configuration error: missing file"));
    }
}
