//! Level dimensions and generation limits

/// Map width
pub const COLNO: i32 = 80;

/// Map height
pub const ROWNO: i32 = 21;

/// Minimum horizontal separation between rooms
pub const XLIM: i32 = 4;

/// Minimum vertical separation between rooms
pub const YLIM: i32 = 3;

/// Maximum number of free rectangles tracked by the pool
pub const MAXRECT: usize = 50;

/// Maximum number of top-level rooms
pub const MAXNROFROOMS: usize = 40;

/// Maximum number of subrooms on a level
pub const MAX_SUBROOMS: usize = 24;

/// Placement tries for a single room request
pub const ROOM_TRIES: u32 = 100;

/// Placement tries for a map template
pub const MAP_TRIES: u32 = 100;

/// Placement tries for a subroom door
pub const DOOR_TRIES: u32 = 100;

/// Placement tries for each stairway
pub const STAIR_TRIES: u32 = 100;

/// Default cap on room-placement iterations per level
pub const DEFAULT_MAX_ROOM_ATTEMPTS: u32 = 200;
