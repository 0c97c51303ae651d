//! Themed rooms (themerms.lua)
//!
//! Each room request picks a template by reservoir sampling over the theme
//! pool. The template then builds one or more rooms, drawing from the
//! rectangle pool the same way an ordinary room does.

mod fills;
mod maps;
mod templates;

pub use fills::{ThemeFill, apply_fills};
pub use maps::MapTemplate;

use dgn_rng::Isaac64;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::level::Level;
use super::placement::{RoomSize, create_room};
use super::rect::RectPool;
use super::room::Lighting;
use crate::error::ConfigError;

/// Themed room template
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemeTemplate {
    Default,
    FakeDelphi,
    RoomInRoom,
    HugeRoom,
    NestingRooms,
    ThemedFill,
    UnlitThemedFill,
    NormalAndThemedFill,
    Pillars,
    Mausoleum,
    RandomFeature,
    LShaped,
    LShapedRot1,
    LShapedRot2,
    LShapedRot3,
    BlockedCenter,
    CircularSmall,
    CircularMedium,
    CircularBig,
    TShaped,
    TShapedRot1,
    TShapedRot2,
    TShapedRot3,
    SShaped,
    SShapedRot1,
    ZShaped,
    ZShapedRot1,
    Cross,
    FourLeafClover,
    WaterVault,
}

impl ThemeTemplate {
    /// Frequency in the standard pool
    pub const fn standard_frequency(self) -> u32 {
        match self {
            ThemeTemplate::Default => 1000,
            ThemeTemplate::ThemedFill => 6,
            ThemeTemplate::UnlitThemedFill | ThemeTemplate::NormalAndThemedFill => 2,
            _ => 1,
        }
    }

    /// ASCII map backing this template, if it is a map template
    pub fn map(self) -> Option<&'static MapTemplate> {
        maps::map_for(self)
    }
}

/// One entry of a theme pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
    pub template: ThemeTemplate,
    pub frequency: u32,
    /// Shallowest depth the template may appear at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_depth: Option<i32>,
    /// Deepest depth the template may appear at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<i32>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ThemeEntry {
    pub fn new(template: ThemeTemplate, frequency: u32) -> Self {
        Self {
            template,
            frequency,
            min_depth: None,
            max_depth: None,
            enabled: true,
        }
    }

    /// Takes part in selection at `depth`
    pub fn eligible(&self, depth: i32) -> bool {
        self.enabled
            && self.frequency > 0
            && self.min_depth.is_none_or(|d| depth >= d)
            && self.max_depth.is_none_or(|d| depth <= d)
    }
}

/// Weighted set of templates to choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePool {
    pub entries: Vec<ThemeEntry>,
}

impl Default for ThemePool {
    fn default() -> Self {
        Self::standard()
    }
}

impl ThemePool {
    /// Every template with its standard frequency, in selection order
    pub fn standard() -> Self {
        Self {
            entries: ThemeTemplate::iter()
                .map(|t| ThemeEntry::new(t, t.standard_frequency()))
                .collect(),
        }
    }

    /// Only the given template, for tests and tooling
    pub fn only(template: ThemeTemplate) -> Self {
        Self {
            entries: vec![ThemeEntry::new(template, 1)],
        }
    }

    pub fn entry_mut(&mut self, template: ThemeTemplate) -> Option<&mut ThemeEntry> {
        self.entries.iter_mut().find(|e| e.template == template)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        for e in &self.entries {
            if let (Some(lo), Some(hi)) = (e.min_depth, e.max_depth)
                && lo > hi
            {
                return Err(ConfigError::InvalidValue {
                    field: "themes",
                    reason: format!("{} has min_depth {} above max_depth {}", e.template, lo, hi),
                });
            }
        }
        let total: u64 = self
            .entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.frequency as u64)
            .sum();
        if total == 0 {
            return Err(ConfigError::InvalidValue {
                field: "themes",
                reason: "total frequency of enabled templates is zero".into(),
            });
        }
        if total > i32::MAX as u64 {
            return Err(ConfigError::InvalidValue {
                field: "themes",
                reason: format!("total frequency {} is too large", total),
            });
        }
        Ok(())
    }

    /// Reservoir sampling over the eligible entries.
    ///
    /// Draws `rn2(total so far)` once per eligible entry and keeps the entry
    /// when the draw falls below its frequency.
    pub fn select(&self, rng: &mut Isaac64, depth: i32) -> Option<ThemeTemplate> {
        let mut total = 0i32;
        let mut pick = None;
        for e in self.entries.iter().filter(|e| e.eligible(depth)) {
            let freq = e.frequency.min(i32::MAX as u32) as i32;
            total = total.saturating_add(freq);
            if rng.rn2(total) < freq {
                pick = Some(e.template);
            }
        }
        pick
    }
}

/// Handle one room request through the theme pool.
///
/// Returns whether a room was built. A failed template is simply skipped.
pub fn generate_themed_room(
    level: &mut Level,
    pool: &mut RectPool,
    rng: &mut Isaac64,
    themes: &ThemePool,
) -> bool {
    rng.set_site("themerooms");
    let Some(template) = themes.select(rng, level.depth) else {
        rng.set_site("makerooms");
        return create_room(level, pool, rng, RoomSize::Random, Lighting::Random).is_some();
    };
    tracing::debug!(%template, "theme selected");

    rng.set_site("themeroom");
    let built = match template.map() {
        Some(map) => maps::place_map(level, pool, rng, template, map),
        None => templates::build(level, pool, rng, template),
    };
    if !built {
        tracing::debug!(%template, "themed room not placed");
    }
    rng.set_site("makerooms");
    built
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pool_layout() {
        let pool = ThemePool::standard();
        assert_eq!(pool.entries.len(), 30);
        assert_eq!(pool.entries[0].template, ThemeTemplate::Default);
        let total: u32 = pool.entries.iter().map(|e| e.frequency).sum();
        assert_eq!(total, 1036);
        assert!(pool.check().is_ok());
    }

    #[test]
    fn test_selection_draws_once_per_entry() {
        let pool = ThemePool::standard();
        let mut rng = Isaac64::new(42);
        rng.enable_logging();
        pool.select(&mut rng, 1);
        let args: Vec<i32> = rng.log().iter().map(|c| c.args[0]).collect();
        assert_eq!(args.len(), 30);
        assert_eq!(&args[..8], &[1000, 1001, 1002, 1003, 1004, 1010, 1012, 1014]);
        assert_eq!(args[29], 1036);
    }

    #[test]
    fn test_depth_window_and_disabled_entries() {
        let mut pool = ThemePool::standard();
        for e in &mut pool.entries {
            e.enabled = e.template == ThemeTemplate::Pillars || e.template == ThemeTemplate::Cross;
        }
        if let Some(e) = pool.entry_mut(ThemeTemplate::Cross) {
            e.min_depth = Some(5);
        }
        let mut rng = Isaac64::new(1);
        for _ in 0..20 {
            assert_eq!(pool.select(&mut rng, 2), Some(ThemeTemplate::Pillars));
        }
        // one draw per eligible entry
        assert_eq!(rng.call_count(), 20);
    }

    #[test]
    fn test_check_rejects_empty_pool() {
        let mut pool = ThemePool::standard();
        for e in &mut pool.entries {
            e.enabled = false;
        }
        assert!(matches!(pool.check(), Err(ConfigError::InvalidValue { field: "themes", .. })));
    }

    #[test]
    fn test_check_rejects_inverted_window() {
        let mut pool = ThemePool::only(ThemeTemplate::HugeRoom);
        pool.entries[0].min_depth = Some(9);
        pool.entries[0].max_depth = Some(3);
        assert!(pool.check().is_err());
    }

    #[test]
    fn test_pool_json_uses_snake_case() {
        let pool = ThemePool::only(ThemeTemplate::FourLeafClover);
        let json = serde_json::to_string(&pool).unwrap();
        assert!(json.contains("\"four_leaf_clover\""));
        let back: ThemePool = serde_json::from_str(r#"{"entries":[{"template":"huge_room","frequency":3}]}"#).unwrap();
        assert!(back.entries[0].enabled);
        assert_eq!(back.entries[0].template, ThemeTemplate::HugeRoom);
    }
}
