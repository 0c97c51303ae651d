//! Dungeon level generation
//!
//! Contains the level structure, cells, rooms, and the generation pipeline.

mod cell;
mod corridor;
mod door;
mod generation;
mod level;
mod placement;
mod rect;
mod room;
mod stairs;
mod themes;
mod trap;
mod validate;
mod wallify;

pub use cell::{Cell, Door, DoorState, StairDir, Terrain, WallKind};
pub use corridor::{dig_corridor, join, makecorridors};
pub use door::{DoorSpec, DoorWalls, bydoor, create_door, okdoor, resolve_doors};
pub use generation::{generate_level, generate_level_with};
pub use level::{Level, Stairway};
pub use placement::{RoomSize, create_room, create_subroom};
pub use rect::{Rect, RectPool};
pub use room::{Lighting, Room, RoomId, RoomType};
pub use stairs::place_stairs;
pub use themes::{MapTemplate, ThemeEntry, ThemeFill, ThemePool, ThemeTemplate, apply_fills, generate_themed_room};
pub use trap::{SpawnHint, SpawnKind, TerrainTimer, TimerKind, Trap, TrapKind};
pub use validate::check_level;
pub use wallify::{WallNeighbors, wallify, wallify_region};
