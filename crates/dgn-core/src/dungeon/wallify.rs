//! Wall classification (wallification)
//!
//! Every wall cell is reclassified from the set of its four cardinal
//! neighbours that are also walls. The pass reads only wall-ness, never the
//! wall variant, so it reaches its fixed point in one sweep.

use bitflags::bitflags;

use super::cell::{Terrain, WallKind};
use super::level::Level;
use super::rect::Rect;
use crate::consts::{COLNO, ROWNO};

bitflags! {
    /// Cardinal neighbours that are wall-like
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WallNeighbors: u8 {
        const NORTH = 0x01;
        const SOUTH = 0x02;
        const WEST = 0x04;
        const EAST = 0x08;
    }
}

impl WallNeighbors {
    /// Wall-like neighbours of `(x, y)`; off-grid counts as open
    pub fn of(level: &Level, x: i32, y: i32) -> Self {
        let mut n = WallNeighbors::empty();
        let wall_at = |x: i32, y: i32| level.get(x, y).is_some_and(|c| c.terrain.is_wall_like());
        if wall_at(x, y - 1) {
            n |= WallNeighbors::NORTH;
        }
        if wall_at(x, y + 1) {
            n |= WallNeighbors::SOUTH;
        }
        if wall_at(x - 1, y) {
            n |= WallNeighbors::WEST;
        }
        if wall_at(x + 1, y) {
            n |= WallNeighbors::EAST;
        }
        n
    }

    /// Wall variant for this neighbour pattern. `horizontal` breaks the tie
    /// for an isolated wall cell.
    pub fn classify(self, horizontal: bool) -> WallKind {
        const N: WallNeighbors = WallNeighbors::NORTH;
        const S: WallNeighbors = WallNeighbors::SOUTH;
        const W: WallNeighbors = WallNeighbors::WEST;
        const E: WallNeighbors = WallNeighbors::EAST;

        if self == WallNeighbors::all() {
            return WallKind::Cross;
        }
        if self.bits().count_ones() == 3 {
            let missing = WallNeighbors::all().difference(self);
            return if missing == N {
                WallKind::TDown
            } else if missing == S {
                WallKind::TUp
            } else if missing == W {
                WallKind::TRight
            } else {
                WallKind::TLeft
            };
        }
        if self == S | E {
            WallKind::TopLeft
        } else if self == S | W {
            WallKind::TopRight
        } else if self == N | E {
            WallKind::BottomLeft
        } else if self == N | W {
            WallKind::BottomRight
        } else if self.intersects(N | S) {
            WallKind::Vertical
        } else if self.intersects(W | E) {
            WallKind::Horizontal
        } else if horizontal {
            WallKind::Horizontal
        } else {
            WallKind::Vertical
        }
    }
}

/// Reclassify every wall cell on the level
pub fn wallify(level: &mut Level) {
    wallify_region(level, Rect::full());
}

/// Reclassify wall cells inside `area`, clipped to the grid.
///
/// Classes are computed from a snapshot before any cell is rewritten.
pub fn wallify_region(level: &mut Level, area: Rect) {
    let lx = area.lx.max(0);
    let ly = area.ly.max(0);
    let hx = area.hx.min(COLNO - 1);
    let hy = area.hy.min(ROWNO - 1);

    let mut updates = Vec::new();
    for x in lx..=hx {
        for y in ly..=hy {
            let cell = level.cell(x, y);
            if let Terrain::Wall(kind) = cell.terrain {
                let new_kind = WallNeighbors::of(level, x, y).classify(cell.horizontal);
                if new_kind != kind {
                    updates.push((x, y, new_kind));
                }
            }
        }
    }

    for (x, y, kind) in updates {
        level.cell_mut(x, y).terrain = Terrain::Wall(kind);
    }
}
