//! Corridor routing (mklev.c: makecorridors, join; sp_lev.c: dig_corridor)
//!
//! Generation joins rooms with two-leg L-shaped corridors:
//! 1. Join consecutive rooms in left-to-right order
//! 2. Join rooms a blocked corridor left unconnected
//! 3. Add random extra joins between arbitrary rooms
//!
//! Wall cells crossed on the way become provisional doors, settled later
//! by door resolution. Corridors never cross liquid or closed rooms. The
//! random-walk digger is kept for collaborators that tunnel after
//! generation.

use dgn_rng::Isaac64;

use super::cell::Terrain;
use super::level::Level;
use super::room::RoomId;
use super::trap::{SpawnHint, SpawnKind};
use crate::consts::{COLNO, ROWNO};

/// Dig one cell of an L-shaped corridor
fn dig_cell(level: &mut Level, x: i32, y: i32) {
    let cell = level.cell_mut(x, y);
    match cell.terrain {
        Terrain::Stone => {
            cell.terrain = Terrain::Corridor;
            cell.lit = false;
            cell.room = None;
        }
        Terrain::Wall(_) => cell.terrain = Terrain::ProvisionalDoor,
        _ => {}
    }
}

/// Cells of a straight line between two points, inclusive
fn line(from: (i32, i32), to: (i32, i32)) -> impl Iterator<Item = (i32, i32)> {
    let (dx, dy) = ((to.0 - from.0).signum(), (to.1 - from.1).signum());
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs());
    (0..=steps).map(move |i| (from.0 + i * dx, from.1 + i * dy))
}

/// Dig a straight line between two points, inclusive
fn dig_line(level: &mut Level, from: (i32, i32), to: (i32, i32)) {
    for (x, y) in line(from, to) {
        dig_cell(level, x, y);
    }
}

/// A corridor may not cross liquid or anything belonging to a room that
/// stays closed off
fn undiggable(level: &Level, x: i32, y: i32) -> bool {
    let cell = level.cell(x, y);
    cell.terrain.is_liquid()
        || cell
            .room
            .and_then(|id| level.room(id))
            .is_some_and(|r| !r.needjoining)
}

/// Can an L-shaped corridor run from `org` through `corner` to `dest`?
fn clear_path(level: &Level, org: (i32, i32), corner: (i32, i32), dest: (i32, i32)) -> bool {
    line(org, corner)
        .chain(line(corner, dest))
        .all(|(x, y)| !undiggable(level, x, y))
}

/// Join two top-level rooms with an L-shaped corridor.
///
/// Rooms that are missing or do not need joining are skipped silently.
/// When the drawn leg order would cross liquid or a closed room the other
/// order is tried; if both are blocked nothing is dug. Returns whether a
/// corridor was dug.
pub fn join(level: &mut Level, rng: &mut Isaac64, a: usize, b: usize) -> bool {
    let wanted = |i: usize| level.rooms.get(i).is_some_and(|r| r.needjoining);
    if a == b || !wanted(a) || !wanted(b) {
        return false;
    }

    let Some(org) = level.somexy(rng, RoomId::Room(a)) else {
        return false;
    };
    let Some(dest) = level.somexy(rng, RoomId::Room(b)) else {
        return false;
    };

    let horizontal_first = (dest.0, org.1);
    let vertical_first = (org.0, dest.1);
    let (drawn, other) = if rng.rn2(2) != 0 {
        (horizontal_first, vertical_first)
    } else {
        (vertical_first, horizontal_first)
    };
    let Some(corner) = [drawn, other]
        .into_iter()
        .find(|&corner| clear_path(level, org, corner, dest))
    else {
        tracing::debug!(a, b, ?org, ?dest, "no clear corridor between rooms");
        return false;
    };
    dig_line(level, org, corner);
    dig_line(level, corner, dest);
    tracing::trace!(a, b, ?org, ?dest, ?corner, "rooms joined");
    true
}

/// Rooms known to be connected, grouped by label
struct Components(Vec<usize>);

impl Components {
    fn new(n: usize) -> Self {
        Self((0..n).collect())
    }

    fn same(&self, a: usize, b: usize) -> bool {
        self.0[a] == self.0[b]
    }

    fn merge(&mut self, a: usize, b: usize) {
        let (keep, drop) = (self.0[a].min(self.0[b]), self.0[a].max(self.0[b]));
        for label in &mut self.0 {
            if *label == drop {
                *label = keep;
            }
        }
    }
}

/// Connect every room that needs joining.
///
/// Consecutive rooms are joined first. Rooms left apart by a blocked join
/// are then joined to every room they are not yet connected with, and
/// finally a few random extra joins add loops.
pub fn makecorridors(level: &mut Level, rng: &mut Isaac64) {
    rng.set_site("makecorridors");
    let nroom = level.rooms.len();
    let mut groups = Components::new(nroom);

    let joinable: Vec<usize> = (0..nroom).filter(|&i| level.rooms[i].needjoining).collect();
    for pair in joinable.windows(2) {
        if join(level, rng, pair[0], pair[1]) {
            groups.merge(pair[0], pair[1]);
        }
    }

    let mut repairs = 0;
    for &a in &joinable {
        for &b in &joinable {
            if a != b && !groups.same(a, b) && join(level, rng, a, b) {
                groups.merge(a, b);
                repairs += 1;
            }
        }
    }

    let mut extra = 0;
    for i in 0..nroom {
        if rng.rn2(3) == 0 && nroom > 2 {
            let other = rng.rn2(nroom as i32) as usize;
            if other != i && join(level, rng, i, other) {
                extra += 1;
            }
        }
    }
    tracing::debug!(rooms = nroom, repairs, extra, "corridors dug");
}

fn passable(t: Terrain, ftyp: Terrain, btyp: Terrain) -> bool {
    t == btyp || t == ftyp || t == Terrain::SecretCorridor
}

/// Random-walk corridor digger.
///
/// Walks from `org` towards `dest` converting `btyp` cells to `ftyp`. With
/// `nxcor` the walk may give up at any step and may leave a boulder behind.
/// Plain corridors turn secret one time in a hundred. Returns `false` when
/// the walk was abandoned or ran into something it cannot dig.
pub fn dig_corridor(
    level: &mut Level,
    rng: &mut Isaac64,
    org: (i32, i32),
    dest: (i32, i32),
    nxcor: bool,
    ftyp: Terrain,
    btyp: Terrain,
) -> bool {
    let (mut xx, mut yy) = org;
    let (tx, ty) = dest;
    if xx <= 0 || yy <= 0 || tx <= 0 || ty <= 0 || xx > COLNO - 1 || tx > COLNO - 1 || yy > ROWNO - 1 || ty > ROWNO - 1
    {
        return false;
    }

    let (mut dx, mut dy) = if tx > xx {
        (1, 0)
    } else if ty > yy {
        (0, 1)
    } else if tx < xx {
        (-1, 0)
    } else {
        (0, -1)
    };

    xx -= dx;
    yy -= dy;
    let mut cct = 0;
    while xx != tx || yy != ty {
        if cct > 500 || (nxcor && rng.rn2(35) == 0) {
            return false;
        }
        cct += 1;

        xx += dx;
        yy += dy;
        if xx >= COLNO - 1 || xx <= 0 || yy <= 0 || yy >= ROWNO - 1 {
            return false;
        }

        let here = level.cell(xx, yy).terrain;
        if here == btyp {
            let cell = level.cell_mut(xx, yy);
            if ftyp != Terrain::Corridor || rng.rn2(100) != 0 {
                cell.terrain = ftyp;
                if nxcor && rng.rn2(50) == 0 {
                    level.spawns.push(SpawnHint::new(SpawnKind::Object, "boulder", xx, yy));
                }
            } else {
                cell.terrain = Terrain::SecretCorridor;
            }
        } else if here != ftyp && here != Terrain::SecretCorridor {
            return false;
        }

        // find next corridor position
        let mut dix = (xx - tx).abs();
        let mut diy = (yy - ty).abs();
        if dix > diy && diy != 0 && rng.rn2(dix - diy + 1) == 0 {
            dix = 0;
        } else if diy > dix && dix != 0 && rng.rn2(diy - dix + 1) == 0 {
            diy = 0;
        }

        // do we have to change direction?
        if dy != 0 && dix > diy {
            let ddx = if xx > tx { -1 } else { 1 };
            if passable(level.cell(xx + ddx, yy).terrain, ftyp, btyp) {
                dx = ddx;
                dy = 0;
                continue;
            }
        } else if dx != 0 && diy > dix {
            let ddy = if yy > ty { -1 } else { 1 };
            if passable(level.cell(xx, yy + ddy).terrain, ftyp, btyp) {
                dy = ddy;
                dx = 0;
                continue;
            }
        }

        // continue straight on?
        if passable(level.cell(xx + dx, yy + dy).terrain, ftyp, btyp) {
            continue;
        }

        // try to change direction
        if dx != 0 {
            dx = 0;
            dy = if ty < yy { -1 } else { 1 };
        } else {
            dy = 0;
            dx = if tx < xx { -1 } else { 1 };
        }
        if passable(level.cell(xx + dx, yy + dy).terrain, ftyp, btyp) {
            continue;
        }
        dy = -dy;
        dx = -dx;
    }
    true
}
