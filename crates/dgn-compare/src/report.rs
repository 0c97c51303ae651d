//! Parity reporting: aggregates per-level diffs and trace divergences into
//! human-readable and machine-readable reports.

use crate::diff::{RngDivergence, Severity, SummaryDiff};
use serde::{Deserialize, Serialize};

/// Outcome of comparing many levels against a reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParityReport {
    /// Descriptive label for this report (e.g. "depth 1-5 seeds 0..100").
    pub label: String,
    /// Levels compared.
    pub levels: u64,
    /// Levels with at least one summary diff or a trace divergence.
    pub levels_with_diffs: u64,
    /// Aggregate diff counts by severity.
    pub critical_count: u64,
    pub major_count: u64,
    pub minor_count: u64,
    /// Levels whose RNG trace diverged.
    pub divergent_traces: u64,
    pub entries: Vec<LevelEntry>,
}

/// Findings for one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelEntry {
    pub seed: u64,
    pub depth: i32,
    pub diffs: Vec<SummaryDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence: Option<RngDivergence>,
}

impl ParityReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            levels: 0,
            levels_with_diffs: 0,
            critical_count: 0,
            major_count: 0,
            minor_count: 0,
            divergent_traces: 0,
            entries: Vec::new(),
        }
    }

    /// Record the comparison of one level. Clean levels only bump the count.
    pub fn add_level(
        &mut self,
        seed: u64,
        depth: i32,
        diffs: Vec<SummaryDiff>,
        divergence: Option<RngDivergence>,
    ) {
        self.levels += 1;

        if diffs.is_empty() && divergence.is_none() {
            return;
        }
        self.levels_with_diffs += 1;
        if divergence.is_some() {
            self.divergent_traces += 1;
        }

        for d in &diffs {
            match d.severity {
                Severity::Critical => self.critical_count += 1,
                Severity::Major => self.major_count += 1,
                Severity::Minor => self.minor_count += 1,
            }
        }

        self.entries.push(LevelEntry {
            seed,
            depth,
            diffs,
            divergence,
        });
    }

    /// True if no level had a critical diff or a diverging trace.
    pub fn passed(&self) -> bool {
        self.critical_count == 0 && self.divergent_traces == 0
    }

    /// First level with a trace divergence, if any.
    pub fn first_divergence(&self) -> Option<&LevelEntry> {
        self.entries.iter().find(|e| e.divergence.is_some())
    }

    /// Human-readable summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("============================================================\n");
        out.push_str(&format!("Parity Report: {}\n", self.label));
        out.push_str(&format!(
            "Result: {}\n",
            if self.passed() { "PASS" } else { "FAIL" }
        ));
        out.push_str(&format!(
            "Levels with diffs: {}/{}, divergent traces: {}\n",
            self.levels_with_diffs, self.levels, self.divergent_traces
        ));
        out.push_str(&format!(
            "Diffs: {} critical, {} major, {} minor\n",
            self.critical_count, self.major_count, self.minor_count
        ));

        let show = self.entries.len().min(10);
        for entry in &self.entries[..show] {
            out.push_str(&format!("  seed {} depth {}:\n", entry.seed, entry.depth));
            if let Some(div) = &entry.divergence {
                out.push_str(&format!("    {}\n", div.description));
            }
            for d in &entry.diffs {
                out.push_str(&format!("    {}\n", d));
            }
        }
        if self.entries.len() > show {
            out.push_str(&format!(
                "  ... and {} more levels with diffs\n",
                self.entries.len() - show
            ));
        }
        out.push_str("============================================================\n");
        out
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(severity: Severity) -> SummaryDiff {
        SummaryDiff {
            severity,
            field: "doors".into(),
            ours: "3".into(),
            reference: "4".into(),
        }
    }

    #[test]
    fn test_clean_levels_pass() {
        let mut report = ParityReport::new("clean");
        report.add_level(1, 1, vec![], None);
        report.add_level(2, 1, vec![], None);
        assert!(report.passed());
        assert_eq!(report.levels, 2);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_counts_by_severity() {
        let mut report = ParityReport::new("mixed");
        report.add_level(1, 1, vec![diff(Severity::Minor), diff(Severity::Major)], None);
        assert!(report.passed());
        report.add_level(2, 3, vec![diff(Severity::Critical)], None);
        assert!(!report.passed());
        assert_eq!(
            (report.critical_count, report.major_count, report.minor_count),
            (1, 1, 1)
        );
        assert_eq!(report.levels_with_diffs, 2);
        assert!(report.render().contains("FAIL"));
    }

    #[test]
    fn test_divergence_fails_and_serializes() {
        let mut report = ParityReport::new("trace");
        let div = RngDivergence {
            call_index: 4,
            our_context: vec![],
            reference_context: vec![],
            description: "Result mismatch at call 4".into(),
        };
        report.add_level(9, 2, vec![], Some(div));
        assert!(!report.passed());
        assert_eq!(report.first_divergence().map(|e| e.seed), Some(9));

        let json = report.to_json().unwrap();
        let back: ParityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.divergent_traces, 1);
        assert_eq!(back.entries[0].divergence.as_ref().unwrap().call_index, 4);
    }
}
