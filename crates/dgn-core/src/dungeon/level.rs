//! Level structure and collaborator-facing operations

use dgn_rng::{Isaac64, RngCall};
use serde::{Deserialize, Serialize};

use super::cell::{Cell, Door, DoorState, StairDir, Terrain};
use super::corridor;
use super::rect::Rect;
use super::room::{Room, RoomId};
use super::trap::{SpawnHint, TerrainTimer, Trap};
use super::wallify::{wallify, wallify_region};
use crate::consts::{COLNO, ROWNO};
use crate::error::LevelError;

/// Stairway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairway {
    pub x: i32,
    pub y: i32,
    pub dir: StairDir,
}

/// Complete generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub seed: u64,
    pub depth: i32,

    /// Map cells, indexed `[x][y]`
    pub cells: Vec<Vec<Cell>>,

    /// Top-level rooms, sorted by left edge
    pub rooms: Vec<Room>,

    pub subrooms: Vec<Room>,

    /// Creation index of each entry in `rooms`
    pub creation_order: Vec<usize>,

    pub up_stairs: Option<Stairway>,
    pub down_stairs: Option<Stairway>,

    pub traps: Vec<Trap>,

    /// Monsters, objects and engravings for collaborators to create
    pub spawns: Vec<SpawnHint>,

    pub timers: Vec<TerrainTimer>,

    /// Primitive RNG draws made while generating, when logging was requested
    #[serde(skip)]
    pub rng_log: Vec<RngCall>,
}

fn default_cells() -> Vec<Vec<Cell>> {
    vec![vec![Cell::stone(); ROWNO as usize]; COLNO as usize]
}

impl Level {
    /// Create an all-stone level
    pub fn new(seed: u64, depth: i32) -> Self {
        Self {
            seed,
            depth,
            cells: default_cells(),
            rooms: Vec::new(),
            subrooms: Vec::new(),
            creation_order: Vec::new(),
            up_stairs: None,
            down_stairs: None,
            traps: Vec::new(),
            spawns: Vec::new(),
            timers: Vec::new(),
            rng_log: Vec::new(),
        }
    }

    /// Get cell at position. Panics outside the grid.
    pub fn cell(&self, x: i32, y: i32) -> &Cell {
        &self.cells[x as usize][y as usize]
    }

    /// Get mutable cell at position. Panics outside the grid.
    pub fn cell_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        &mut self.cells[x as usize][y as usize]
    }

    /// Cell lookup that tolerates out-of-range coordinates
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells.get(x as usize)?.get(y as usize)
    }

    /// Position is on the usable map (column 0 is never used)
    pub const fn isok(x: i32, y: i32) -> bool {
        x >= 1 && x <= COLNO - 1 && y >= 0 && y <= ROWNO - 1
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        match id {
            RoomId::Room(i) => self.rooms.get(i),
            RoomId::Subroom(i) => self.subrooms.get(i),
        }
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        match id {
            RoomId::Room(i) => self.rooms.get_mut(i),
            RoomId::Subroom(i) => self.subrooms.get_mut(i),
        }
    }

    pub fn nroom(&self) -> usize {
        self.rooms.len()
    }

    /// Positions of every door and secret door, x-major
    pub fn doors(&self) -> Vec<(i32, i32)> {
        let mut doors = Vec::new();
        for x in 0..COLNO {
            for y in 0..ROWNO {
                if matches!(
                    self.cell(x, y).terrain,
                    Terrain::Door(_) | Terrain::SecretDoor(_)
                ) {
                    doors.push((x, y));
                }
            }
        }
        doors
    }

    /// Count cells matching a predicate
    pub fn count_cells(&self, pred: impl Fn(&Cell) -> bool) -> usize {
        self.cells.iter().flatten().filter(|c| pred(c)).count()
    }

    /// Render the map, one line per row
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((COLNO + 1) * ROWNO) as usize);
        for y in 0..ROWNO {
            let line: String = (0..COLNO)
                .map(|x| {
                    let cell = self.cell(x, y);
                    cell.terrain.symbol(cell.horizontal)
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a level from `to_json` output.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json)?;
        level.check_shape()?;
        Ok(level)
    }

    fn check_shape(&self) -> Result<(), LevelError> {
        let height = self.cells.first().map_or(0, Vec::len);
        if self.cells.len() != COLNO as usize
            || self.cells.iter().any(|col| col.len() != ROWNO as usize)
        {
            return Err(LevelError::GridShape {
                width: self.cells.len(),
                height,
                expected_width: COLNO as usize,
                expected_height: ROWNO as usize,
            });
        }

        let groups: [(&'static str, &[Room]); 2] = [("room", &self.rooms), ("subroom", &self.subrooms)];
        for (kind, rooms) in groups {
            for (index, room) in rooms.iter().enumerate() {
                if room.lx > room.hx || room.ly > room.hy || !Rect::full().contains(&room.footprint()) {
                    return Err(LevelError::RoomOutOfBounds {
                        kind,
                        index,
                        lx: room.lx,
                        ly: room.ly,
                        hx: room.hx,
                        hy: room.hy,
                    });
                }
            }
        }

        for x in 0..COLNO {
            for y in 0..ROWNO {
                if let Some(id) = self.cell(x, y).room
                    && self.room(id).is_none()
                {
                    return Err(LevelError::DanglingRoom { x, y, id });
                }
            }
        }

        for (index, sub) in self.subrooms.iter().enumerate() {
            if let Some(parent) = sub.parent
                && self.room(parent).is_none()
            {
                return Err(LevelError::DanglingParent { index, parent });
            }
        }

        for (name, stairs) in [("up", self.up_stairs), ("down", self.down_stairs)] {
            if let Some(s) = stairs {
                let ok = self
                    .get(s.x, s.y)
                    .is_some_and(|c| c.terrain == Terrain::Stairs(s.dir));
                if !ok {
                    return Err(LevelError::MisplacedStairs {
                        dir: name,
                        x: s.x,
                        y: s.y,
                    });
                }
            }
        }
        Ok(())
    }

    /// Dig a corridor between two points, then re-classify the walls it
    /// touched. Used by collaborators after generation.
    ///
    /// Returns `false` if the digger gave up; cells dug before that stay dug.
    pub fn dig_corridor(
        &mut self,
        rng: &mut Isaac64,
        org: (i32, i32),
        dest: (i32, i32),
        nxcor: bool,
    ) -> bool {
        let dug = corridor::dig_corridor(self, rng, org, dest, nxcor, Terrain::Corridor, Terrain::Stone);
        // the walk may wander anywhere between the two points
        wallify(self);
        dug
    }

    /// Knock out a wall cell. A room wall becomes an empty doorway, any other
    /// wall becomes corridor. Returns `false` if the cell was not a wall.
    pub fn destroy_wall(&mut self, x: i32, y: i32) -> bool {
        if !Self::isok(x, y) || !self.cell(x, y).terrain.is_wall() {
            return false;
        }
        let cell = self.cell_mut(x, y);
        cell.terrain = if cell.room.is_some() {
            Terrain::Door(Door::new(DoorState::NoDoor))
        } else {
            Terrain::Corridor
        };
        cell.edge = false;
        let owner = cell.room;
        if let Some(id) = owner
            && let Some(room) = self.room_mut(id)
        {
            room.add_door(x, y);
        }
        wallify_region(self, Rect::new(x - 1, y - 1, x + 1, y + 1));
        tracing::debug!(x, y, "wall destroyed");
        true
    }
}
