//! RNG call log entries and their export formats.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

/// Which helper produced a primitive draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RngFunc {
    Rn2,
    Rnd,
    Rn1,
    #[serde(rename = "d")]
    Dice,
    Rnl,
    /// Unreduced value handed out through `rand::RngCore`
    Raw,
}

impl RngFunc {
    pub const fn name(self) -> &'static str {
        match self {
            RngFunc::Rn2 => "rn2",
            RngFunc::Rnd => "rnd",
            RngFunc::Rn1 => "rn1",
            RngFunc::Dice => "d",
            RngFunc::Rnl => "rnl",
            RngFunc::Raw => "raw",
        }
    }
}

impl core::fmt::Display for RngFunc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One primitive draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCall {
    /// Index of the raw value consumed (0-based)
    pub seq: u64,
    pub func: RngFunc,
    pub args: Vec<i32>,
    pub result: u64,
    /// Raw u64 consumed from ISAAC64
    pub raw: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Cow<'static, str>>,
}

impl core::fmt::Display for RngCall {
    /// Compact form, e.g. `rn2(12)=7` or `rn1(6,3)=5 @makerooms`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(", self.func)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, ")={}", self.result)?;
        if let Some(site) = &self.site {
            write!(f, " @{}", site)?;
        }
        Ok(())
    }
}

/// Render a log in the compact text form, one call per line.
pub fn format_text_log(log: &[RngCall]) -> String {
    let mut out = String::with_capacity(log.len() * 16);
    for call in log {
        out.push_str(&call.to_string());
        out.push('\n');
    }
    out
}

/// Write a log as JSON lines.
pub fn write_jsonl_log<W: Write>(log: &[RngCall], mut out: W) -> io::Result<()> {
    for call in log {
        serde_json::to_writer(&mut out, call)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Read a JSON-lines log back. Blank lines are ignored.
pub fn parse_jsonl_log<R: BufRead>(input: R) -> io::Result<Vec<RngCall>> {
    let mut log = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        log.push(serde_json::from_str(&line)?);
    }
    Ok(log)
}
