//! Comparable views of RNG traces and generated levels.
//!
//! A `TraceEntry` is the tool-neutral form of one RNG draw: it can come from
//! our own call log or from a reference implementation's trace file. A
//! `LevelSummary` condenses a `Level` into the handful of numbers and the map
//! text that parity checks care about.

use std::collections::BTreeMap;

use dgn_core::dungeon::{Cell, Terrain};
use dgn_core::{COLNO, Level, ROWNO};
use dgn_rng::RngCall;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One RNG draw in a comparable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub seq: u64,
    pub func: String,
    pub args: Vec<i64>,
    pub result: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl TraceEntry {
    /// Rendered call without the site, e.g. `rn1(6,3)`.
    pub fn call(&self) -> String {
        let args: Vec<String> = self.args.iter().map(i64::to_string).collect();
        format!("{}({})", self.func, args.join(","))
    }
}

impl core::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}={}", self.seq, self.call(), self.result)?;
        if let Some(site) = &self.site {
            write!(f, " @ {}", site)?;
        }
        Ok(())
    }
}

impl From<&RngCall> for TraceEntry {
    fn from(call: &RngCall) -> Self {
        Self {
            seq: call.seq,
            func: call.func.name().to_string(),
            args: call.args.iter().map(|&a| i64::from(a)).collect(),
            result: call.result,
            site: call.site.as_ref().map(|s| s.to_string()),
        }
    }
}

/// Convert a whole call log.
pub fn trace_from_log(log: &[RngCall]) -> Vec<TraceEntry> {
    log.iter().map(TraceEntry::from).collect()
}

#[derive(Error, Debug)]
pub enum TraceParseError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("malformed JSON trace: {0}")]
    Json(#[from] serde_json::Error),
}

fn malformed(line: usize, reason: impl Into<String>) -> TraceParseError {
    TraceParseError::Malformed {
        line,
        reason: reason.into(),
    }
}

fn parse_args(text: &str, line: usize) -> Result<Vec<i64>, TraceParseError> {
    text.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| a.parse().map_err(|_| malformed(line, format!("bad argument '{}'", a))))
        .collect()
}

/// Parse the text trace form, one draw per line:
///
/// ```text
/// [seq] func(arg,arg)=result [@ site]
/// ```
///
/// Both `@site` and `@ site` are accepted. Blank lines and lines starting
/// with `#` are skipped. Entries without a sequence number are numbered by
/// position.
pub fn parse_text_trace(text: &str) -> Result<Vec<TraceEntry>, TraceParseError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let mut rest = raw.trim();
        if rest.is_empty() || rest.starts_with('#') {
            continue;
        }

        let mut seq = entries.len() as u64;
        if let Some((head, tail)) = rest.split_once(char::is_whitespace)
            && !head.is_empty()
            && head.bytes().all(|b| b.is_ascii_digit())
        {
            seq = head.parse().map_err(|_| malformed(line, "bad sequence number"))?;
            rest = tail.trim_start();
        }

        let (call, site) = match rest.split_once('@') {
            Some((call, site)) => (call.trim_end(), Some(site.trim().to_string())),
            None => (rest, None),
        };
        let (func, after) = call
            .split_once('(')
            .ok_or_else(|| malformed(line, "missing '('"))?;
        let (args, after) = after
            .split_once(')')
            .ok_or_else(|| malformed(line, "missing ')'"))?;
        let result = after
            .trim()
            .strip_prefix('=')
            .ok_or_else(|| malformed(line, "missing '='"))?
            .trim()
            .parse()
            .map_err(|_| malformed(line, "bad result"))?;

        entries.push(TraceEntry {
            seq,
            func: func.trim().to_string(),
            args: parse_args(args, line)?,
            result,
            site: site.filter(|s| !s.is_empty()),
        });
    }
    Ok(entries)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonArgs {
    Text(String),
    List(Vec<i64>),
}

#[derive(Deserialize)]
struct JsonCall {
    #[serde(default)]
    seq: Option<u64>,
    func: String,
    #[serde(default)]
    args: Option<JsonArgs>,
    result: u64,
    #[serde(default, alias = "caller")]
    site: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTrace {
    Bare(Vec<JsonCall>),
    Wrapped {
        #[serde(rename = "rngLog")]
        rng_log: Vec<JsonCall>,
    },
}

/// Parse a JSON trace: either an array of calls or an object carrying them
/// under `rngLog`. Arguments may be a list or a comma-separated string, and
/// the call site may be named `site` or `caller`.
pub fn parse_json_trace(json: &str) -> Result<Vec<TraceEntry>, TraceParseError> {
    let calls = match serde_json::from_str::<JsonTrace>(json)? {
        JsonTrace::Bare(calls) | JsonTrace::Wrapped { rng_log: calls } => calls,
    };
    calls
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let args = match c.args {
                None => Vec::new(),
                Some(JsonArgs::List(args)) => args,
                Some(JsonArgs::Text(text)) => parse_args(&text, i + 1)?,
            };
            Ok(TraceEntry {
                seq: c.seq.unwrap_or(i as u64),
                func: c.func,
                args,
                result: c.result,
                site: c.site,
            })
        })
        .collect()
}

/// Per-room line of a level summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub lx: i32,
    pub ly: i32,
    pub hx: i32,
    pub hy: i32,
    pub lit: bool,
    pub room_type: String,
    #[serde(default)]
    pub irregular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Condensed, comparable view of a generated level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub seed: u64,
    pub depth: i32,
    pub rooms: Vec<RoomSummary>,
    pub subrooms: usize,
    pub corridor_cells: usize,
    pub secret_corridors: usize,
    pub doors: usize,
    pub secret_doors: usize,
    pub up_stairs: Option<(i32, i32)>,
    pub down_stairs: Option<(i32, i32)>,
    pub traps: usize,
    pub spawns: usize,
    /// Cell count per terrain name
    pub terrain: BTreeMap<String, usize>,
    /// ASCII map, one string per row
    pub map: Vec<String>,
}

impl LevelSummary {
    pub fn from_level(level: &Level) -> Self {
        let count = |pred: fn(&Cell) -> bool| level.count_cells(pred);

        let mut terrain = BTreeMap::new();
        for x in 0..COLNO {
            for y in 0..ROWNO {
                *terrain
                    .entry(level.cell(x, y).terrain.name().to_string())
                    .or_insert(0) += 1;
            }
        }

        let rooms = level
            .rooms
            .iter()
            .map(|r| RoomSummary {
                lx: r.lx,
                ly: r.ly,
                hx: r.hx,
                hy: r.hy,
                lit: r.lit,
                room_type: r.room_type.to_string(),
                irregular: r.irregular,
                template: r.template.map(|t| t.to_string()),
                fill: r.applied_fill.map(|f| f.to_string()),
            })
            .collect();

        Self {
            seed: level.seed,
            depth: level.depth,
            rooms,
            subrooms: level.subrooms.len(),
            corridor_cells: count(|c| c.terrain == Terrain::Corridor),
            secret_corridors: count(|c| c.terrain == Terrain::SecretCorridor),
            doors: count(|c| matches!(c.terrain, Terrain::Door(_))),
            secret_doors: count(|c| matches!(c.terrain, Terrain::SecretDoor(_))),
            up_stairs: level.up_stairs.map(|s| (s.x, s.y)),
            down_stairs: level.down_stairs.map(|s| (s.x, s.y)),
            traps: level.traps.len(),
            spawns: level.spawns.len(),
            terrain,
            map: level.to_ascii().lines().map(str::to_string).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dgn_core::{GenOptions, generate_level_with};

    #[test]
    fn test_parse_plain_text_log() {
        let trace = parse_text_trace("rn1(6,3)=7 @makerooms\nrn2(1)=0\n").unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].func, "rn1");
        assert_eq!(trace[0].args, vec![6, 3]);
        assert_eq!(trace[0].result, 7);
        assert_eq!(trace[0].site.as_deref(), Some("makerooms"));
        assert_eq!(trace[1].seq, 1);
        assert_eq!(trace[1].site, None);
    }

    #[test]
    fn test_parse_numbered_lines_with_spaced_site() {
        let text = "# reference trace\n\n292 rn2(1000)=648 @ themerooms\n293 rnd(2)=1\n";
        let trace = parse_text_trace(text).unwrap();
        assert_eq!(trace[0].seq, 292);
        assert_eq!(trace[0].site.as_deref(), Some("themerooms"));
        assert_eq!(trace[1].seq, 293);
        assert_eq!(trace[1].call(), "rnd(2)");
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_text_trace("rn2(5)=1\nrn2(5\n").unwrap_err();
        assert!(matches!(err, TraceParseError::Malformed { line: 2, .. }));
        assert!(parse_text_trace("rn2(x)=1").is_err());
        assert!(parse_text_trace("rn2(5)").is_err());
    }

    #[test]
    fn test_parse_json_trace_both_shapes() {
        let wrapped = r#"{"rngLog":[{"func":"rn2","args":"12","result":7,"caller":"makerooms"}]}"#;
        let bare = r#"[{"func":"rn1","args":[6,3],"result":5,"seq":9}]"#;
        let a = parse_json_trace(wrapped).unwrap();
        assert_eq!(a[0].args, vec![12]);
        assert_eq!(a[0].site.as_deref(), Some("makerooms"));
        let b = parse_json_trace(bare).unwrap();
        assert_eq!(b[0].seq, 9);
        assert_eq!(b[0].args, vec![6, 3]);
    }

    #[test]
    fn test_text_log_converts_like_call_log() {
        let level = generate_level_with(42, 1, &GenOptions::default().with_rng_log());
        let from_log = trace_from_log(&level.rng_log);
        let from_text = parse_text_trace(&dgn_rng::format_text_log(&level.rng_log)).unwrap();
        assert_eq!(from_log, from_text);
    }

    #[test]
    fn test_summary_counts_match_level() {
        let level = generate_level_with(7, 3, &GenOptions::plain());
        let summary = LevelSummary::from_level(&level);
        assert_eq!(summary.rooms.len(), level.rooms.len());
        assert_eq!(summary.doors + summary.secret_doors, level.doors().len());
        assert_eq!(summary.terrain.values().sum::<usize>(), (COLNO * ROWNO) as usize);
        assert_eq!(summary.map.len(), ROWNO as usize);
        assert_eq!(summary.down_stairs, level.down_stairs.map(|s| (s.x, s.y)));
    }
}
