//! Traps, spawn hints and terrain timers left on a level
//!
//! The generator only decides where things go. Monsters and objects are
//! recorded as hints for the systems that own them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum TrapKind {
    Arrow,
    Dart,
    FallingRock,
    BearTrap,
    LandMine,
    RollingBoulder,
    SleepingGas,
    Rust,
    AntiMagic,
    Web,
    Statue,
    Teleport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub x: i32,
    pub y: i32,
    pub kind: TrapKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SpawnKind {
    Monster,
    Object,
    Engraving,
}

/// Something a collaborator should create at a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnHint {
    pub kind: SpawnKind,
    /// Monster name, object name, or engraving text
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub buried: bool,
}

impl SpawnHint {
    pub fn new(kind: SpawnKind, name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            kind,
            name: name.into(),
            x,
            y,
            buried: false,
        }
    }

    pub fn buried(mut self) -> Self {
        self.buried = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TimerKind {
    /// Ice turns back into floor
    MeltIce,
    /// A buried corpse rises
    Zombify,
}

/// A delayed terrain or object effect, in game turns from level creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTimer {
    pub x: i32,
    pub y: i32,
    pub kind: TimerKind,
    pub turns: i32,
}
