//! Level-summary diffing and RNG trace comparison.
//!
//! Compares two `LevelSummary`s field-by-field, producing a list of
//! `SummaryDiff` entries with severity classification.

use std::collections::BTreeSet;

use crate::snapshot::{LevelSummary, RoomSummary, TraceEntry};
use serde::{Deserialize, Serialize};

/// How much a difference matters for parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Severity::Minor => write!(f, "MINOR"),
            Severity::Major => write!(f, "MAJOR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single difference between two level summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDiff {
    pub severity: Severity,
    pub field: String,
    pub ours: String,
    pub reference: String,
}

impl core::fmt::Display for SummaryDiff {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] {}: ours={}, reference={}",
            self.severity, self.field, self.ours, self.reference
        )
    }
}

/// Compare two level summaries and return all differences, most severe first.
///
/// Room geometry and stairways are critical: once they differ, every later
/// draw is made against a different map. Door and corridor counts are major;
/// fills, traps, spawns and the terrain histogram are minor.
pub fn diff_summaries(ours: &LevelSummary, reference: &LevelSummary) -> Vec<SummaryDiff> {
    let mut diffs = Vec::new();

    diff_field(&mut diffs, Severity::Critical, "rooms.len", ours.rooms.len(), reference.rooms.len());
    for (i, (a, b)) in ours.rooms.iter().zip(&reference.rooms).enumerate() {
        let bounds = |r: &RoomSummary| format!("({},{})-({},{})", r.lx, r.ly, r.hx, r.hy);
        diff_field(&mut diffs, Severity::Critical, &format!("rooms[{}].bounds", i), bounds(a), bounds(b));
        diff_field(&mut diffs, Severity::Major, &format!("rooms[{}].lit", i), a.lit, b.lit);
        diff_field(
            &mut diffs,
            Severity::Major,
            &format!("rooms[{}].template", i),
            a.template.as_deref().unwrap_or("-"),
            b.template.as_deref().unwrap_or("-"),
        );
        diff_field(
            &mut diffs,
            Severity::Minor,
            &format!("rooms[{}].fill", i),
            a.fill.as_deref().unwrap_or("-"),
            b.fill.as_deref().unwrap_or("-"),
        );
    }
    diff_field(&mut diffs, Severity::Critical, "up_stairs", pos(ours.up_stairs), pos(reference.up_stairs));
    diff_field(&mut diffs, Severity::Critical, "down_stairs", pos(ours.down_stairs), pos(reference.down_stairs));

    diff_field(&mut diffs, Severity::Major, "subrooms", ours.subrooms, reference.subrooms);
    diff_field(&mut diffs, Severity::Major, "doors", ours.doors, reference.doors);
    diff_field(&mut diffs, Severity::Major, "secret_doors", ours.secret_doors, reference.secret_doors);
    diff_field(&mut diffs, Severity::Major, "corridor_cells", ours.corridor_cells, reference.corridor_cells);
    diff_field(
        &mut diffs,
        Severity::Major,
        "secret_corridors",
        ours.secret_corridors,
        reference.secret_corridors,
    );
    let cells = differing_cells(&ours.map, &reference.map);
    if cells > 0 {
        diffs.push(SummaryDiff {
            severity: Severity::Major,
            field: "map".into(),
            ours: format!("{} cells differ", cells),
            reference: String::new(),
        });
    }

    diff_field(&mut diffs, Severity::Minor, "traps", ours.traps, reference.traps);
    diff_field(&mut diffs, Severity::Minor, "spawns", ours.spawns, reference.spawns);
    let names: BTreeSet<&String> = ours.terrain.keys().chain(reference.terrain.keys()).collect();
    for name in names {
        diff_field(
            &mut diffs,
            Severity::Minor,
            &format!("terrain.{}", name),
            ours.terrain.get(name).copied().unwrap_or(0),
            reference.terrain.get(name).copied().unwrap_or(0),
        );
    }

    diffs.sort_by(|a, b| b.severity.cmp(&a.severity));
    diffs
}

fn pos(p: Option<(i32, i32)>) -> String {
    p.map_or_else(|| "none".to_string(), |(x, y)| format!("({},{})", x, y))
}

fn diff_field<T: PartialEq + core::fmt::Display>(
    diffs: &mut Vec<SummaryDiff>,
    severity: Severity,
    field: &str,
    ours: T,
    reference: T,
) {
    if ours != reference {
        diffs.push(SummaryDiff {
            severity,
            field: field.to_string(),
            ours: ours.to_string(),
            reference: reference.to_string(),
        });
    }
}

fn differing_cells(ours: &[String], reference: &[String]) -> usize {
    let rows = ours.len().max(reference.len());
    let mut count = 0;
    for y in 0..rows {
        let a: Vec<char> = ours.get(y).map(|r| r.chars().collect()).unwrap_or_default();
        let b: Vec<char> = reference.get(y).map(|r| r.chars().collect()).unwrap_or_default();
        for x in 0..a.len().max(b.len()) {
            // rows are stored right-trimmed, so a missing cell is blank
            if a.get(x).copied().unwrap_or(' ') != b.get(x).copied().unwrap_or(' ') {
                count += 1;
            }
        }
    }
    count
}

/// First point where two RNG traces disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngDivergence {
    /// Index of the first differing call
    pub call_index: usize,
    /// Our calls around the divergence point
    pub our_context: Vec<TraceEntry>,
    /// Reference calls around the divergence point
    pub reference_context: Vec<TraceEntry>,
    pub description: String,
}

impl core::fmt::Display for RngDivergence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.description)?;
        writeln!(f, "  ours:")?;
        for e in &self.our_context {
            writeln!(f, "    {}", e)?;
        }
        writeln!(f, "  reference:")?;
        for e in &self.reference_context {
            writeln!(f, "    {}", e)?;
        }
        Ok(())
    }
}

/// Compare two traces call by call. Sites and sequence numbers are ignored;
/// only function, arguments and result must agree.
pub fn compare_rng_traces(ours: &[TraceEntry], reference: &[TraceEntry]) -> Option<RngDivergence> {
    let len = ours.len().min(reference.len());

    for i in 0..len {
        let o = &ours[i];
        let r = &reference[i];

        if o.func != r.func || o.args != r.args || o.result != r.result {
            let context_start = i.saturating_sub(5);
            let context_end = (i + 6).min(len);

            let description = if o.func != r.func {
                format!(
                    "Function mismatch at call {}: ours={}, reference={}",
                    i,
                    o.call(),
                    r.call()
                )
            } else if o.args != r.args {
                format!(
                    "Argument mismatch at call {}: ours={}, reference={}",
                    i,
                    o.call(),
                    r.call()
                )
            } else {
                format!(
                    "Result mismatch at call {}: {} -> ours={}, reference={}",
                    i,
                    o.call(),
                    o.result,
                    r.result
                )
            };

            return Some(RngDivergence {
                call_index: i,
                our_context: ours[context_start..context_end].to_vec(),
                reference_context: reference[context_start..context_end].to_vec(),
                description,
            });
        }
    }

    if ours.len() != reference.len() {
        return Some(RngDivergence {
            call_index: len,
            our_context: ours[len.saturating_sub(3)..ours.len().min(len + 3)].to_vec(),
            reference_context: reference[len.saturating_sub(3)..reference.len().min(len + 3)].to_vec(),
            description: format!(
                "Trace length mismatch: ours={} calls, reference={} calls",
                ours.len(),
                reference.len()
            ),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgn_core::{GenOptions, generate_level_with};

    fn entry(seq: u64, func: &str, args: &[i64], result: u64) -> TraceEntry {
        TraceEntry {
            seq,
            func: func.into(),
            args: args.to_vec(),
            result,
            site: None,
        }
    }

    #[test]
    fn test_identical_summaries_no_diffs() {
        let level = generate_level_with(3, 2, &GenOptions::default());
        let summary = LevelSummary::from_level(&level);
        assert!(diff_summaries(&summary, &summary).is_empty());
    }

    #[test]
    fn test_moved_stairs_are_critical() {
        let level = generate_level_with(3, 2, &GenOptions::plain());
        let ours = LevelSummary::from_level(&level);
        let mut reference = ours.clone();
        reference.down_stairs = Some((1, 1));
        reference.traps += 1;

        let diffs = diff_summaries(&ours, &reference);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].severity, Severity::Critical);
        assert_eq!(diffs[0].field, "down_stairs");
        assert_eq!(diffs[1].severity, Severity::Minor);
    }

    #[test]
    fn test_map_diff_counts_cells() {
        let level = generate_level_with(8, 1, &GenOptions::plain());
        let ours = LevelSummary::from_level(&level);
        let mut reference = ours.clone();
        reference.map[0] = "##".into();
        let diffs = diff_summaries(&ours, &reference);
        let map = diffs.iter().find(|d| d.field == "map").unwrap();
        assert_eq!(map.ours, "2 cells differ");
    }

    #[test]
    fn test_rng_trace_match() {
        let trace = vec![entry(0, "rn2", &[6], 3), entry(1, "rn1", &[6, 3], 7)];
        assert!(compare_rng_traces(&trace, &trace).is_none());
    }

    #[test]
    fn test_rng_trace_ignores_sites_and_numbering() {
        let ours = vec![entry(0, "rn2", &[6], 3)];
        let mut reference = ours.clone();
        reference[0].seq = 291;
        reference[0].site = Some("makerooms".into());
        assert!(compare_rng_traces(&ours, &reference).is_none());
    }

    #[test]
    fn test_rng_trace_divergence() {
        let ours = vec![entry(0, "rn2", &[6], 3), entry(1, "rn2", &[10], 7)];
        let reference = vec![entry(0, "rn2", &[6], 3), entry(1, "rnd", &[10], 7)];
        let div = compare_rng_traces(&ours, &reference).unwrap();
        assert_eq!(div.call_index, 1);
        assert!(div.description.contains("Function mismatch"));

        let reference = vec![entry(0, "rn2", &[6], 3), entry(1, "rn2", &[10], 2)];
        let div = compare_rng_traces(&ours, &reference).unwrap();
        assert!(div.description.contains("Result mismatch"));
    }

    #[test]
    fn test_rng_trace_length_mismatch() {
        let ours = vec![entry(0, "rn2", &[6], 3)];
        let reference = vec![entry(0, "rn2", &[6], 3), entry(1, "rn2", &[2], 1)];
        let div = compare_rng_traces(&ours, &reference).unwrap();
        assert_eq!(div.call_index, 1);
        assert!(div.description.contains("length mismatch"));
        assert_eq!(div.reference_context.len(), 2);
    }
}
