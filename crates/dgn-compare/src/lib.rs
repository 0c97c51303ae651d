//! Parity tooling for the dgn level generator.
//!
//! Parses reference RNG traces, summarizes generated levels, diffs both with
//! severity classification, and aggregates the results into reports.

pub mod diff;
pub mod report;
pub mod snapshot;

pub use diff::{RngDivergence, Severity, SummaryDiff, compare_rng_traces, diff_summaries};
pub use report::ParityReport;
pub use snapshot::{LevelSummary, TraceEntry, TraceParseError, parse_json_trace, parse_text_trace};
