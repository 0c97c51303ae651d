//! Room placement (sp_lev.c: create_room, check_room, create_subroom;
//! mklev.c: makerooms, sort_rooms, add_room)

use dgn_rng::Isaac64;

use super::cell::{Terrain, WallKind};
use super::level::Level;
use super::rect::{Rect, RectPool};
use super::room::{Lighting, Room, RoomId};
use super::themes;
use crate::consts::{COLNO, MAX_SUBROOMS, MAXNROFROOMS, ROOM_TRIES, ROWNO, XLIM, YLIM};
use crate::options::GenOptions;

/// Size of a requested room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomSize {
    /// Drawn from the candidate rectangle, may shrink to fit
    #[default]
    Random,
    /// Exact floor size
    Fixed { w: i32, h: i32 },
}

impl Level {
    /// Carve a room's floor and walls into the grid and register it.
    ///
    /// With a parent the room becomes a subroom; its walls take over any
    /// shared parent wall cells.
    pub(crate) fn carve_room(&mut self, mut room: Room, parent: Option<RoomId>) -> RoomId {
        let id = match parent {
            Some(_) => RoomId::Subroom(self.subrooms.len()),
            None => RoomId::Room(self.rooms.len()),
        };
        let (lx, ly, hx, hy, lit) = (room.lx, room.ly, room.hx, room.hy, room.lit);

        for x in lx - 1..=hx + 1 {
            for y in ly - 1..=hy + 1 {
                let cell = self.cell_mut(x, y);
                let top_or_bottom = y == ly - 1 || y == hy + 1;
                let side = x == lx - 1 || x == hx + 1;
                if !top_or_bottom && !side {
                    cell.terrain = Terrain::Room;
                    cell.room = Some(id);
                    cell.edge = false;
                    cell.lit = lit;
                    continue;
                }
                let kind = match (x == lx - 1, x == hx + 1, y == ly - 1, y == hy + 1) {
                    (true, _, true, _) => WallKind::TopLeft,
                    (_, true, true, _) => WallKind::TopRight,
                    (true, _, _, true) => WallKind::BottomLeft,
                    (_, true, _, true) => WallKind::BottomRight,
                    _ if top_or_bottom => WallKind::Horizontal,
                    _ => WallKind::Vertical,
                };
                cell.terrain = Terrain::Wall(kind);
                cell.horizontal = top_or_bottom;
                cell.edge = true;
                if parent.is_some() || cell.room.is_none() {
                    cell.room = Some(id);
                }
                if lit {
                    cell.lit = true;
                }
            }
        }

        room.parent = parent;
        match parent {
            Some(pid) => {
                self.subrooms.push(room);
                if let Some(p) = self.room_mut(pid) {
                    p.subrooms.push(id.index());
                }
            }
            None => self.rooms.push(room),
        }
        id
    }
}

/// Check that a candidate room and its margin are clear, shrinking it when
/// something is in the way. Returns `false` when the room is abandoned.
///
/// `lowx`, `lowy` are the floor origin, `dx`, `dy` the floor extent minus one.
fn check_room(
    level: &Level,
    rng: &mut Isaac64,
    lowx: &mut i32,
    dx: &mut i32,
    lowy: &mut i32,
    dy: &mut i32,
) -> bool {
    let mut hix = *lowx + *dx;
    let mut hiy = *lowy + *dy;

    *lowx = (*lowx).max(3);
    *lowy = (*lowy).max(2);
    hix = hix.min(COLNO - 3);
    hiy = hiy.min(ROWNO - 3);

    'chk: loop {
        if hix <= *lowx || hiy <= *lowy {
            return false;
        }
        for x in *lowx - XLIM..=hix + XLIM {
            if x <= 0 || x >= COLNO {
                continue;
            }
            let ymin = (*lowy - YLIM).max(0);
            let ymax = (hiy + YLIM).min(ROWNO - 1);
            for y in ymin..=ymax {
                if level.cell(x, y).terrain == Terrain::Stone {
                    continue;
                }
                if rng.rn2(3) == 0 {
                    return false;
                }
                if x < *lowx {
                    *lowx = x + XLIM + 1;
                } else {
                    hix = x - XLIM - 1;
                }
                if y < *lowy {
                    *lowy = y + YLIM + 1;
                } else {
                    hiy = y - YLIM - 1;
                }
                continue 'chk;
            }
        }
        break;
    }

    *dx = hix - *lowx;
    *dy = hiy - *lowy;
    true
}

/// Fixed-size variant of `check_room`: no shrinking and no draws.
fn check_fixed_room(level: &Level, lowx: i32, dx: i32, lowy: i32, dy: i32) -> bool {
    let hix = lowx + dx;
    let hiy = lowy + dy;
    if lowx < 3 || lowy < 2 || hix > COLNO - 3 || hiy > ROWNO - 3 {
        return false;
    }
    for x in (lowx - XLIM).max(1)..=(hix + XLIM).min(COLNO - 1) {
        for y in (lowy - YLIM).max(0)..=(hiy + YLIM).min(ROWNO - 1) {
            if level.cell(x, y).terrain != Terrain::Stone {
                return false;
            }
        }
    }
    true
}

/// Place a new top-level room inside a free rectangle.
///
/// Lighting is decided once, before any placement draw. Gives up after
/// `ROOM_TRIES` candidates or as soon as the pool runs dry.
pub fn create_room(
    level: &mut Level,
    pool: &mut RectPool,
    rng: &mut Isaac64,
    size: RoomSize,
    lighting: Lighting,
) -> Option<RoomId> {
    let lit = lighting.resolve(rng, level.depth);
    let nroom = level.rooms.len() as i32;

    for _ in 0..ROOM_TRIES {
        let r = pool.pick(rng)?;

        let (mut dx, mut dy) = match size {
            RoomSize::Random => {
                let dx = 2 + rng.rn2(if r.hx - r.lx > 28 { 12 } else { 8 });
                let mut dy = 2 + rng.rn2(4);
                if dx * dy > 50 {
                    dy = 50 / dx;
                }
                (dx, dy)
            }
            RoomSize::Fixed { w, h } => (w - 1, h - 1),
        };

        let xborder = if r.lx > 0 && r.hx < COLNO - 1 { 2 * XLIM } else { XLIM + 1 };
        let yborder = if r.ly > 0 && r.hy < ROWNO - 1 { 2 * YLIM } else { YLIM + 1 };
        if r.hx - r.lx < dx + 3 + xborder || r.hy - r.ly < dy + 3 + yborder {
            continue;
        }

        let xmin = if r.lx > 0 { r.lx } else { 3 };
        let ymin = if r.ly > 0 { r.ly } else { 2 };
        let mut xabs = r.lx + (if r.lx > 0 { XLIM } else { 3 }) + rng.rn2(r.hx - xmin - dx - xborder + 1);
        let mut yabs = r.ly + (if r.ly > 0 { YLIM } else { 2 }) + rng.rn2(r.hy - ymin - dy - yborder + 1);

        let ok = match size {
            RoomSize::Random => {
                // pull early rooms in a full-height rectangle towards the top
                if r.ly == 0
                    && r.hy >= ROWNO - 1
                    && (nroom == 0 || rng.rn2(nroom) == 0)
                    && yabs + dy > ROWNO / 2
                {
                    yabs = rng.rn1(3, 2);
                    if nroom < 4 && dy > 1 {
                        dy -= 1;
                    }
                }
                check_room(level, rng, &mut xabs, &mut dx, &mut yabs, &mut dy)
            }
            RoomSize::Fixed { .. } => check_fixed_room(level, xabs, dx, yabs, dy),
        };
        if !ok {
            tracing::trace!(?r, xabs, yabs, dx, dy, "room candidate rejected");
            continue;
        }

        let footprint = Rect::new(xabs - 1, yabs - 1, xabs + dx + 1, yabs + dy + 1);
        pool.split(&footprint);
        let id = level.carve_room(Room::new(xabs, yabs, xabs + dx, yabs + dy, lit), None);
        tracing::debug!(?id, lx = xabs, ly = yabs, hx = xabs + dx, hy = yabs + dy, lit, "room placed");
        return Some(id);
    }
    None
}

/// Place a subroom inside `parent`'s floor.
///
/// `size` and `pos` (offset from the parent's origin) are drawn when not
/// given. Subrooms do not touch the rectangle pool.
pub fn create_subroom(
    level: &mut Level,
    rng: &mut Isaac64,
    parent: RoomId,
    size: Option<(i32, i32)>,
    pos: Option<(i32, i32)>,
    lighting: Lighting,
) -> Option<RoomId> {
    if level.subrooms.len() >= MAX_SUBROOMS {
        tracing::warn!(?parent, "subroom limit reached");
        return None;
    }
    let proom = level.room(parent)?;
    let (plx, ply) = (proom.lx, proom.ly);
    let width = proom.width();
    let height = proom.height();
    if width < 4 || height < 4 {
        return None;
    }

    let (w, h) = match size {
        Some(wh) => wh,
        None => (rng.rnd(width - 3), rng.rnd(height - 3)),
    };
    if w < 1 || h < 1 || w > width - 2 || h > height - 2 {
        return None;
    }
    let (mut x, mut y) = match pos {
        Some(xy) => xy,
        None => (rng.rnd(width - w - 1) - 1, rng.rnd(height - h - 1) - 1),
    };
    if x == 1 {
        x = 0;
    }
    if y == 1 {
        y = 0;
    }
    if x < 0 || y < 0 || x + w + 1 > width || y + h + 1 > height {
        return None;
    }

    let lit = lighting.resolve(rng, level.depth);
    let room = Room::new(plx + x, ply + y, plx + x + w - 1, ply + y + h - 1, lit);
    let id = level.carve_room(room, Some(parent));
    tracing::debug!(?id, ?parent, w, h, "subroom placed");
    Some(id)
}

/// Sort rooms by left edge and remap every reference to them.
pub(crate) fn sort_rooms(level: &mut Level) {
    let mut order: Vec<usize> = (0..level.rooms.len()).collect();
    order.sort_by_key(|&i| level.rooms[i].lx);

    let mut remap = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new;
    }

    let mut slots: Vec<Option<Room>> = std::mem::take(&mut level.rooms).into_iter().map(Some).collect();
    level.rooms = order.iter().filter_map(|&i| slots[i].take()).collect();

    let fix = |id: &mut Option<RoomId>| {
        if let Some(RoomId::Room(i)) = id {
            *i = remap[*i];
        }
    };
    for cell in level.cells.iter_mut().flatten() {
        fix(&mut cell.room);
    }
    for sub in &mut level.subrooms {
        fix(&mut sub.parent);
    }
    level.creation_order = order;
}

/// Fill the level with rooms, ordinary or themed.
pub(crate) fn makerooms(level: &mut Level, pool: &mut RectPool, rng: &mut Isaac64, options: &GenOptions) {
    rng.set_site("makerooms");
    let target = rng.rn1(6, 3) as usize;
    let mut attempts = 0;

    while level.rooms.len() < target
        && level.rooms.len() < MAXNROFROOMS
        && attempts < options.max_room_attempts
    {
        attempts += 1;
        if pool.pick(rng).is_none() {
            tracing::debug!(rooms = level.rooms.len(), "no free space left");
            break;
        }
        let placed = match &options.themes {
            Some(themes) => themes::generate_themed_room(level, pool, rng, themes),
            None => create_room(level, pool, rng, RoomSize::Random, Lighting::Random).is_some(),
        };
        if !placed {
            tracing::trace!(attempts, "room request failed");
        }
    }
    tracing::debug!(rooms = level.rooms.len(), target, attempts, "rooms placed");
}
