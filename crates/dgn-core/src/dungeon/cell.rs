//! Map cell types (rm.h)

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use super::room::RoomId;

/// Specific wall shape, derived by wallification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum WallKind {
    Vertical,
    Horizontal,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Cross,
    /// T-wall open to the north (┴)
    TUp,
    /// T-wall open to the south (┬)
    TDown,
    /// T-wall open to the west (┤)
    TLeft,
    /// T-wall open to the east (├)
    TRight,
}

/// What is mounted in a doorway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum DoorState {
    /// Empty doorway
    #[default]
    NoDoor,
    Broken,
    Open,
    Closed,
    Locked,
}

/// A door cell's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Door {
    pub state: DoorState,
    /// Only closed or locked doors carry traps
    pub trapped: bool,
}

impl Door {
    pub const fn new(state: DoorState) -> Self {
        Self {
            state,
            trapped: false,
        }
    }

    /// Door with a trap; the flag is dropped for states that cannot hold one.
    pub const fn trapped(state: DoorState) -> Self {
        Self {
            state,
            trapped: matches!(state, DoorState::Closed | DoorState::Locked),
        }
    }
}

/// Stairway direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum StairDir {
    Up,
    Down,
}

/// Terrain of a single cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, IntoStaticStr,
)]
pub enum Terrain {
    #[default]
    Stone,
    Wall(WallKind),
    /// Wall cell crossed by a corridor, not yet given a door state
    ProvisionalDoor,
    Door(Door),
    SecretDoor(Door),
    Corridor,
    SecretCorridor,
    Room,
    Stairs(StairDir),
    Fountain,
    Altar,
    Sink,
    Grave,
    Throne,
    Tree,
    Pool,
    Moat,
    Lava,
    Water,
    Ice,
    Cloud,
    IronBars,
}

impl Terrain {
    pub const fn is_wall(&self) -> bool {
        matches!(self, Terrain::Wall(_))
    }

    /// Solid rock for connectivity purposes
    pub const fn is_rock(&self) -> bool {
        matches!(self, Terrain::Stone | Terrain::Wall(_))
    }

    /// Pools, moat, lava and open water. Corridors are never dug across
    /// them and they block passage between rooms.
    pub const fn is_liquid(&self) -> bool {
        matches!(self, Terrain::Pool | Terrain::Moat | Terrain::Lava | Terrain::Water)
    }

    /// Cannot be walked through
    pub const fn blocks_passage(&self) -> bool {
        self.is_rock() || self.is_liquid()
    }

    /// Counts as wall when classifying neighbouring walls
    pub const fn is_wall_like(&self) -> bool {
        matches!(self, Terrain::Wall(_) | Terrain::SecretDoor(_))
    }

    pub const fn is_door(&self) -> bool {
        matches!(
            self,
            Terrain::Door(_) | Terrain::SecretDoor(_) | Terrain::ProvisionalDoor
        )
    }

    /// Room-interior terrain (`IS_ROOM` in rm.h)
    pub const fn is_room_like(&self) -> bool {
        matches!(
            self,
            Terrain::Room
                | Terrain::Stairs(_)
                | Terrain::Fountain
                | Terrain::Altar
                | Terrain::Sink
                | Terrain::Grave
                | Terrain::Throne
                | Terrain::Ice
                | Terrain::Cloud
        )
    }

    pub const fn is_corridor(&self) -> bool {
        matches!(self, Terrain::Corridor | Terrain::SecretCorridor)
    }

    /// Short name used in summaries and histograms
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Map symbol. `horizontal` picks the glyph for doors and secret doors.
    pub const fn symbol(&self, horizontal: bool) -> char {
        match self {
            Terrain::Stone | Terrain::SecretCorridor => ' ',
            Terrain::Wall(kind) => match kind {
                WallKind::Vertical | WallKind::TLeft | WallKind::TRight => '|',
                _ => '-',
            },
            Terrain::SecretDoor(_) => {
                if horizontal {
                    '-'
                } else {
                    '|'
                }
            }
            Terrain::ProvisionalDoor => '+',
            Terrain::Door(door) => match door.state {
                DoorState::NoDoor | DoorState::Broken => '.',
                DoorState::Open => {
                    if horizontal {
                        '|'
                    } else {
                        '-'
                    }
                }
                DoorState::Closed | DoorState::Locked => '+',
            },
            Terrain::Corridor => '#',
            Terrain::Room | Terrain::Ice => '.',
            Terrain::Stairs(StairDir::Up) => '<',
            Terrain::Stairs(StairDir::Down) => '>',
            Terrain::Fountain => '{',
            Terrain::Altar => '_',
            Terrain::Sink => '#',
            Terrain::Grave => '|',
            Terrain::Throne => '\\',
            Terrain::Tree => '#',
            Terrain::Pool | Terrain::Moat | Terrain::Water | Terrain::Lava => '}',
            Terrain::Cloud => '#',
            Terrain::IronBars => '#',
        }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    /// Owning room, `None` for stone and corridor space
    pub room: Option<RoomId>,
    pub lit: bool,
    /// Orientation for walls and doors
    pub horizontal: bool,
    /// Wall cell bounding a room (irregular rooms and subrooms)
    pub edge: bool,
}

impl Cell {
    pub const fn stone() -> Self {
        Self {
            terrain: Terrain::Stone,
            room: None,
            lit: false,
            horizontal: false,
            edge: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_cell_is_unlit_stone() {
        let c = Cell::default();
        assert_eq!(c, Cell::stone());
        assert!(c.terrain.is_rock());
    }

    #[test]
    fn test_rock_classes() {
        for kind in WallKind::iter() {
            assert!(Terrain::Wall(kind).is_rock());
            assert!(Terrain::Wall(kind).is_wall_like());
        }
        assert!(Terrain::SecretDoor(Door::default()).is_wall_like());
        assert!(!Terrain::SecretDoor(Door::default()).is_rock());
        assert!(!Terrain::Pool.is_rock());
        assert!(!Terrain::Tree.is_rock());
    }

    #[test]
    fn test_liquids_block_passage() {
        for t in [Terrain::Pool, Terrain::Moat, Terrain::Lava, Terrain::Water] {
            assert!(t.is_liquid());
            assert!(t.blocks_passage());
        }
        assert!(Terrain::Stone.blocks_passage());
        assert!(!Terrain::Ice.blocks_passage());
        assert!(!Terrain::Corridor.blocks_passage());
        assert!(!Terrain::SecretDoor(Door::default()).blocks_passage());
    }

    #[test]
    fn test_room_like() {
        assert!(Terrain::Room.is_room_like());
        assert!(Terrain::Stairs(StairDir::Down).is_room_like());
        assert!(!Terrain::Corridor.is_room_like());
        assert!(!Terrain::Door(Door::default()).is_room_like());
        assert!(!Terrain::Pool.is_room_like());
    }

    #[test]
    fn test_trapped_only_sticks_to_shut_doors() {
        assert!(Door::trapped(DoorState::Locked).trapped);
        assert!(!Door::trapped(DoorState::Open).trapped);
        assert!(!Door::trapped(DoorState::NoDoor).trapped);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Terrain::Wall(WallKind::Vertical).symbol(false), '|');
        assert_eq!(Terrain::Wall(WallKind::TopLeft).symbol(true), '-');
        assert_eq!(Terrain::Door(Door::new(DoorState::Closed)).symbol(true), '+');
        assert_eq!(Terrain::Door(Door::new(DoorState::Open)).symbol(false), '-');
        assert_eq!(Terrain::Stairs(StairDir::Up).symbol(false), '<');
        assert_eq!(Terrain::Corridor.name(), "Corridor");
        assert_eq!(Terrain::Wall(WallKind::Cross).name(), "Wall");
    }
}
