//! Door placement (mklev.c: dodoor, okdoor, bydoor; sp_lev.c: create_door)

use bitflags::bitflags;
use dgn_rng::Isaac64;

use super::cell::{Door, DoorState, Terrain, WallKind};
use super::level::Level;
use super::room::RoomId;
use crate::consts::{COLNO, DOOR_TRIES, ROWNO};

bitflags! {
    /// Walls of a room a door may be placed on
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DoorWalls: u8 {
        const NORTH = 0x01;
        const SOUTH = 0x02;
        const WEST = 0x04;
        const EAST = 0x08;
    }
}

/// Door request for `create_door`; `None` fields are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorSpec {
    pub secret: Option<bool>,
    pub state: Option<DoorState>,
    /// Candidate walls; `None` picks one wall at random per try
    pub walls: Option<DoorWalls>,
}

impl DoorSpec {
    /// Random door on any wall
    pub fn any_wall() -> Self {
        Self {
            walls: Some(DoorWalls::all()),
            ..Self::default()
        }
    }
}

/// Is there a door orthogonally next to `(x, y)`?
pub fn bydoor(level: &Level, x: i32, y: i32) -> bool {
    [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
        .into_iter()
        .any(|(nx, ny)| {
            level
                .get(nx, ny)
                .is_some_and(|c| matches!(c.terrain, Terrain::Door(_) | Terrain::SecretDoor(_)))
        })
}

/// Can a door go at `(x, y)`: a straight wall with no door beside it
pub fn okdoor(level: &Level, x: i32, y: i32) -> bool {
    let straight = level.get(x, y).is_some_and(|c| {
        matches!(
            c.terrain,
            Terrain::Wall(WallKind::Horizontal) | Terrain::Wall(WallKind::Vertical)
        )
    });
    straight && !bydoor(level, x, y)
}

/// Solid for the purpose of "does this door lead anywhere"
fn solid(level: &Level, x: i32, y: i32) -> bool {
    level.get(x, y).is_none_or(|c| {
        c.terrain.is_rock() || matches!(c.terrain, Terrain::SecretDoor(_) | Terrain::SecretCorridor)
    })
}

fn draw_door(rng: &mut Isaac64, spec: &DoorSpec) -> (bool, Door) {
    let secret = spec.secret.unwrap_or_else(|| rng.rn2(2) != 0);
    if let Some(state) = spec.state {
        return (secret, Door::new(state));
    }
    let door = if !secret {
        if rng.rn2(3) == 0 {
            let state = if rng.rn2(5) == 0 {
                DoorState::Open
            } else if rng.rn2(6) == 0 {
                DoorState::Locked
            } else {
                DoorState::Closed
            };
            if state != DoorState::Open && rng.rn2(25) == 0 {
                Door::trapped(state)
            } else {
                Door::new(state)
            }
        } else {
            Door::new(DoorState::NoDoor)
        }
    } else {
        let state = if rng.rn2(5) == 0 {
            DoorState::Locked
        } else {
            DoorState::Closed
        };
        if rng.rn2(20) == 0 {
            Door::trapped(state)
        } else {
            Door::new(state)
        }
    };
    (secret, door)
}

/// Put a door on one of a room's walls.
///
/// The door's secrecy and state are settled first, then up to
/// `DOOR_TRIES` rounds each pick a starting wall and go around the room
/// looking for a spot that leads somewhere and is not next to another door.
pub fn create_door(level: &mut Level, rng: &mut Isaac64, id: RoomId, spec: DoorSpec) -> bool {
    let Some(room) = level.room(id) else {
        return false;
    };
    let (lx, ly, hx, hy) = (room.lx, room.ly, room.hx, room.hy);
    let (secret, door) = draw_door(rng, &spec);

    for _ in 0..DOOR_TRIES {
        let walls = spec
            .walls
            .unwrap_or_else(|| DoorWalls::from_bits_truncate(1 << rng.rn2(4)));
        let mut wtry = rng.rn2(4);
        for _ in 0..4 {
            let candidate = match wtry {
                0 if walls.contains(DoorWalls::NORTH) => {
                    let x = lx + rng.rn2(1 + hx - lx);
                    (!solid(level, x, ly - 2)).then_some((x, ly - 1))
                }
                1 if walls.contains(DoorWalls::SOUTH) => {
                    let x = lx + rng.rn2(1 + hx - lx);
                    (!solid(level, x, hy + 2)).then_some((x, hy + 1))
                }
                2 if walls.contains(DoorWalls::WEST) => {
                    let y = ly + rng.rn2(1 + hy - ly);
                    (!solid(level, lx - 2, y)).then_some((lx - 1, y))
                }
                3 if walls.contains(DoorWalls::EAST) => {
                    let y = ly + rng.rn2(1 + hy - ly);
                    (!solid(level, hx + 2, y)).then_some((hx + 1, y))
                }
                _ => None,
            };
            if let Some((x, y)) = candidate
                && okdoor(level, x, y)
            {
                let cell = level.cell_mut(x, y);
                cell.terrain = if secret {
                    Terrain::SecretDoor(door)
                } else {
                    Terrain::Door(door)
                };
                if let Some(room) = level.room_mut(id) {
                    room.add_door(x, y);
                }
                tracing::trace!(?id, x, y, secret, state = %door.state, "door created");
                return true;
            }
            wtry = (wtry + 1) % 4;
        }
    }
    tracing::warn!(?id, "no place for a door");
    false
}

/// Settle every provisional door left by corridor digging.
///
/// Scans x-major. A marker between room floor and corridor becomes a door
/// with a drawn state; one touching only one kind becomes an empty doorway
/// without a draw; one touching neither reverts to corridor.
pub fn resolve_doors(level: &mut Level, rng: &mut Isaac64) {
    rng.set_site("dodoors");
    let mut resolved = 0;
    for x in 1..COLNO - 1 {
        for y in 1..ROWNO - 1 {
            if level.cell(x, y).terrain != Terrain::ProvisionalDoor {
                continue;
            }
            let neighbors = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)];
            let room_side = neighbors
                .iter()
                .any(|&(nx, ny)| level.cell(nx, ny).terrain.is_room_like());
            let corridor_side = neighbors
                .iter()
                .any(|&(nx, ny)| level.cell(nx, ny).terrain.is_corridor());

            let state = match (room_side, corridor_side) {
                (true, true) => match rng.rn2(5) {
                    0 => DoorState::NoDoor,
                    1 => DoorState::Open,
                    4 => DoorState::Locked,
                    _ => DoorState::Closed,
                },
                (false, false) => {
                    let cell = level.cell_mut(x, y);
                    cell.terrain = Terrain::Corridor;
                    cell.room = None;
                    cell.edge = false;
                    continue;
                }
                _ => DoorState::NoDoor,
            };
            level.cell_mut(x, y).terrain = Terrain::Door(Door::new(state));
            resolved += 1;

            for (nx, ny) in neighbors {
                let c = level.cell(nx, ny);
                if c.terrain.is_room_like()
                    && let Some(owner) = c.room
                    && let Some(room) = level.room_mut(owner)
                {
                    room.add_door(x, y);
                }
            }
        }
    }
    tracing::debug!(resolved, "doors resolved");
}
