//! Error types for level persistence, configuration and validation

use thiserror::Error;

use crate::dungeon::RoomId;

/// Problems reconstructing a level from its persisted form
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("grid is {width}x{height}, expected {expected_width}x{expected_height}")]
    GridShape {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("cell ({x},{y}) refers to missing room {id:?}")]
    DanglingRoom { x: i32, y: i32, id: RoomId },

    #[error("{kind} {index} spans ({lx},{ly})-({hx},{hy}), which does not fit on the map")]
    RoomOutOfBounds {
        kind: &'static str,
        index: usize,
        lx: i32,
        ly: i32,
        hx: i32,
        hy: i32,
    },

    #[error("subroom {index} has parent {parent:?} which does not exist")]
    DanglingParent { index: usize, parent: RoomId },

    #[error("{dir} stairs at ({x},{y}) are not on a stairway cell")]
    MisplacedStairs { dir: &'static str, x: i32, y: i32 },

    #[error("malformed level data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems loading generation options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read options file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// A structural property a generated level failed to satisfy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("cell ({x},{y}) is owned by unknown room {id:?}")]
    UnknownRoom { x: i32, y: i32, id: RoomId },

    #[error("rooms {a} and {b} have overlapping footprints")]
    OverlappingRooms { a: usize, b: usize },

    #[error("room {room} is not reachable from room {from}")]
    Disconnected { room: usize, from: usize },

    #[error("level has no down stairs")]
    MissingDownStairs,

    #[error("level at depth {depth} has no up stairs")]
    MissingUpStairs { depth: i32 },

    #[error("level at depth 1 has up stairs")]
    UnexpectedUpStairs,

    #[error("up and down stairs share ({x},{y})")]
    StairsCoincide { x: i32, y: i32 },

    #[error("unresolved door marker at ({x},{y})")]
    ProvisionalDoor { x: i32, y: i32 },

    #[error("wall at ({x},{y}) changes from {before} to {after} on a second wallification pass")]
    WallificationUnstable {
        x: i32,
        y: i32,
        before: String,
        after: String,
    },
}
