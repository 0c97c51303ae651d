//! Map templates: irregular rooms stamped from small ASCII maps
//!
//! A map is placed at a random spot where it and a one-cell stone ring
//! around it fit. Its floor is then flood-filled from a seed cell and
//! registered as an irregular room.

use dgn_rng::Isaac64;

use super::ThemeTemplate;
use crate::consts::{COLNO, MAP_TRIES, ROWNO};
use crate::dungeon::cell::{Door, DoorState, Terrain, WallKind};
use crate::dungeon::level::Level;
use crate::dungeon::rect::{Rect, RectPool};
use crate::dungeon::room::{Lighting, Room, RoomId, RoomType};
use crate::dungeon::trap::{SpawnHint, SpawnKind};

/// An ASCII map template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapTemplate {
    pub rows: &'static [&'static str],
    /// Flood-fill seed for the room, relative to the map origin
    pub filler: (i32, i32),
}

impl MapTemplate {
    pub fn width(&self) -> i32 {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Character at a map position; short rows are padded with stone
    pub fn at(&self, x: i32, y: i32) -> char {
        self.rows
            .get(y as usize)
            .and_then(|row| row.as_bytes().get(x as usize))
            .map_or(' ', |&b| b as char)
    }

    /// Every position with its character, row by row
    fn positions(&self) -> impl Iterator<Item = (i32, i32, char)> + '_ {
        let (w, h) = (self.width(), self.height());
        (0..h).flat_map(move |y| (0..w).map(move |x| (x, y, self.at(x, y))))
    }
}

/// Terrain for a map character. `x` is transparent and has none.
pub(super) fn terrain_for(ch: char) -> Option<Terrain> {
    let t = match ch {
        ' ' => Terrain::Stone,
        '-' => Terrain::Wall(WallKind::Horizontal),
        '|' => Terrain::Wall(WallKind::Vertical),
        '.' => Terrain::Room,
        'L' => Terrain::Lava,
        'P' => Terrain::Pool,
        '}' => Terrain::Moat,
        'T' => Terrain::Tree,
        'I' => Terrain::Ice,
        'C' => Terrain::Cloud,
        '#' => Terrain::Corridor,
        'W' => Terrain::Water,
        'S' => Terrain::SecretDoor(Door::new(DoorState::Closed)),
        '+' => Terrain::Door(Door::new(DoorState::Closed)),
        '{' => Terrain::Fountain,
        'F' => Terrain::IronBars,
        _ => return None,
    };
    Some(t)
}

static L_SHAPED: MapTemplate = MapTemplate {
    rows: &["-----xxx", "|...|xxx", "|...|xxx", "|...----", "|......|", "|......|", "|......|", "--------"],
    filler: (1, 1),
};

static L_SHAPED_ROT1: MapTemplate = MapTemplate {
    rows: &["xxx-----", "xxx|...|", "xxx|...|", "----...|", "|......|", "|......|", "|......|", "--------"],
    filler: (5, 1),
};

static L_SHAPED_ROT2: MapTemplate = MapTemplate {
    rows: &["--------", "|......|", "|......|", "|......|", "----...|", "xxx|...|", "xxx|...|", "xxx-----"],
    filler: (1, 1),
};

static L_SHAPED_ROT3: MapTemplate = MapTemplate {
    rows: &["--------", "|......|", "|......|", "|......|", "|...----", "|...|xxx", "|...|xxx", "-----xxx"],
    filler: (1, 1),
};

static BLOCKED_CENTER: MapTemplate = MapTemplate {
    rows: &[
        "-----------",
        "|.........|",
        "|.........|",
        "|.........|",
        "|...LLL...|",
        "|...LLL...|",
        "|...LLL...|",
        "|.........|",
        "|.........|",
        "|.........|",
        "-----------",
    ],
    filler: (1, 1),
};

static CIRCULAR_SMALL: MapTemplate = MapTemplate {
    rows: &["xx---xx", "x--.--x", "--...--", "|.....|", "--...--", "x--.--x", "xx---xx"],
    filler: (3, 3),
};

static CIRCULAR_MEDIUM: MapTemplate = MapTemplate {
    rows: &[
        "xx-----xx",
        "x--...--x",
        "--.....--",
        "|.......|",
        "|.......|",
        "|.......|",
        "--.....--",
        "x--...--x",
        "xx-----xx",
    ],
    filler: (4, 4),
};

static CIRCULAR_BIG: MapTemplate = MapTemplate {
    rows: &[
        "xxx-----xxx",
        "x---...---x",
        "x-.......-x",
        "--.......--",
        "|.........|",
        "|.........|",
        "|.........|",
        "--.......--",
        "x-.......-x",
        "x---...---x",
        "xxx-----xxx",
    ],
    filler: (5, 5),
};

static T_SHAPED: MapTemplate = MapTemplate {
    rows: &[
        "xxx-----xxx",
        "xxx|...|xxx",
        "xxx|...|xxx",
        "----...----",
        "|.........|",
        "|.........|",
        "|.........|",
        "-----------",
    ],
    filler: (5, 5),
};

static T_SHAPED_ROT1: MapTemplate = MapTemplate {
    rows: &[
        "-----xxx",
        "|...|xxx",
        "|...|xxx",
        "|...----",
        "|......|",
        "|......|",
        "|......|",
        "|...----",
        "|...|xxx",
        "|...|xxx",
        "-----xxx",
    ],
    filler: (2, 2),
};

static T_SHAPED_ROT2: MapTemplate = MapTemplate {
    rows: &[
        "-----------",
        "|.........|",
        "|.........|",
        "|.........|",
        "----...----",
        "xxx|...|xxx",
        "xxx|...|xxx",
        "xxx-----xxx",
    ],
    filler: (2, 2),
};

static T_SHAPED_ROT3: MapTemplate = MapTemplate {
    rows: &[
        "xxx-----",
        "xxx|...|",
        "xxx|...|",
        "----...|",
        "|......|",
        "|......|",
        "|......|",
        "----...|",
        "xxx|...|",
        "xxx|...|",
        "xxx-----",
    ],
    filler: (5, 5),
};

static S_SHAPED: MapTemplate = MapTemplate {
    rows: &[
        "-----xxx",
        "|...|xxx",
        "|...|xxx",
        "|...----",
        "|......|",
        "|......|",
        "|......|",
        "----...|",
        "xxx|...|",
        "xxx|...|",
        "xxx-----",
    ],
    filler: (2, 2),
};

static S_SHAPED_ROT1: MapTemplate = MapTemplate {
    rows: &[
        "xxx--------",
        "xxx|......|",
        "xxx|......|",
        "----......|",
        "|......----",
        "|......|xxx",
        "|......|xxx",
        "--------xxx",
    ],
    filler: (5, 5),
};

static Z_SHAPED: MapTemplate = MapTemplate {
    rows: &[
        "xxx-----",
        "xxx|...|",
        "xxx|...|",
        "----...|",
        "|......|",
        "|......|",
        "|......|",
        "|...----",
        "|...|xxx",
        "|...|xxx",
        "-----xxx",
    ],
    filler: (5, 5),
};

static Z_SHAPED_ROT1: MapTemplate = MapTemplate {
    rows: &[
        "--------xxx",
        "|......|xxx",
        "|......|xxx",
        "|......----",
        "----......|",
        "xxx|......|",
        "xxx|......|",
        "xxx--------",
    ],
    filler: (2, 2),
};

static CROSS: MapTemplate = MapTemplate {
    rows: &[
        "xxx-----xxx",
        "xxx|...|xxx",
        "xxx|...|xxx",
        "----...----",
        "|.........|",
        "|.........|",
        "|.........|",
        "----...----",
        "xxx|...|xxx",
        "xxx|...|xxx",
        "xxx-----xxx",
    ],
    filler: (6, 6),
};

static FOUR_LEAF_CLOVER: MapTemplate = MapTemplate {
    rows: &[
        "-----x-----",
        "|...|x|...|",
        "|...---...|",
        "|.........|",
        "---.....---",
        "xx|.....|xx",
        "---.....---",
        "|.........|",
        "|...---...|",
        "|...|x|...|",
        "-----x-----",
    ],
    filler: (6, 6),
};

static WATER_VAULT: MapTemplate = MapTemplate {
    rows: &["}}}}}}", "}----}", "}|..|}", "}|..|}", "}----}", "}}}}}}"],
    filler: (2, 2),
};

pub(super) fn map_for(template: ThemeTemplate) -> Option<&'static MapTemplate> {
    use ThemeTemplate::*;
    let map = match template {
        LShaped => &L_SHAPED,
        LShapedRot1 => &L_SHAPED_ROT1,
        LShapedRot2 => &L_SHAPED_ROT2,
        LShapedRot3 => &L_SHAPED_ROT3,
        BlockedCenter => &BLOCKED_CENTER,
        CircularSmall => &CIRCULAR_SMALL,
        CircularMedium => &CIRCULAR_MEDIUM,
        CircularBig => &CIRCULAR_BIG,
        TShaped => &T_SHAPED,
        TShapedRot1 => &T_SHAPED_ROT1,
        TShapedRot2 => &T_SHAPED_ROT2,
        TShapedRot3 => &T_SHAPED_ROT3,
        SShaped => &S_SHAPED,
        SShapedRot1 => &S_SHAPED_ROT1,
        ZShaped => &Z_SHAPED,
        ZShapedRot1 => &Z_SHAPED_ROT1,
        Cross => &CROSS,
        FourLeafClover => &FOUR_LEAF_CLOVER,
        WaterVault => &WATER_VAULT,
        _ => return None,
    };
    Some(map)
}

/// Can the map go at `(xstart, ystart)`?
///
/// The ring around it must be on the map, stone and unowned, and so must
/// every non-transparent cell inside. The map and its ring may not reach
/// into another room's walls, even through transparent corners.
fn fits(level: &Level, map: &MapTemplate, xstart: i32, ystart: i32) -> bool {
    let (wid, hei) = (map.width(), map.height());
    if ystart + hei > ROWNO || xstart < 1 || xstart + wid >= COLNO {
        return false;
    }
    let area = Rect::new(xstart - 1, ystart - 1, xstart + wid, ystart + hei);
    if level.rooms.iter().any(|r| r.footprint().intersects(&area)) {
        return false;
    }

    for x in xstart - 1..=xstart + wid {
        for y in ystart - 1..=ystart + hei {
            let on_ring = x == xstart - 1 || x == xstart + wid || y == ystart - 1 || y == ystart + hei;
            if !on_ring {
                continue;
            }
            if !Level::isok(x, y) {
                return false;
            }
            let cell = level.cell(x, y);
            if cell.terrain != Terrain::Stone || cell.room.is_some() {
                return false;
            }
        }
    }

    map.positions()
        .filter(|&(_, _, ch)| terrain_for(ch).is_some())
        .all(|(dx, dy, _)| {
            let cell = level.cell(xstart + dx, ystart + dy);
            cell.terrain == Terrain::Stone && cell.room.is_none()
        })
}

fn stamp(level: &mut Level, map: &MapTemplate, xstart: i32, ystart: i32) {
    for (dx, dy, ch) in map.positions() {
        let Some(terrain) = terrain_for(ch) else {
            continue;
        };
        let cell = level.cell_mut(xstart + dx, ystart + dy);
        cell.terrain = terrain;
        cell.room = None;
        cell.edge = false;
        cell.horizontal = matches!(terrain, Terrain::Wall(WallKind::Horizontal) | Terrain::IronBars);
    }
}

/// Place a map template and build its room. Returns `false` when no spot
/// was found in `MAP_TRIES` attempts.
pub(super) fn place_map(
    level: &mut Level,
    pool: &mut RectPool,
    rng: &mut Isaac64,
    template: ThemeTemplate,
    map: &MapTemplate,
) -> bool {
    let (wid, hei) = (map.width(), map.height());
    let mut spot = None;
    for _ in 0..MAP_TRIES {
        let xstart = 1 + rng.rn2(COLNO - 1 - wid);
        let ystart = rng.rn2(ROWNO - hei);
        if fits(level, map, xstart, ystart) {
            spot = Some((xstart, ystart));
            break;
        }
    }
    let Some((xstart, ystart)) = spot else {
        return false;
    };

    stamp(level, map, xstart, ystart);
    pool.split(&Rect::new(xstart, ystart, xstart + wid - 1, ystart + hei - 1));
    tracing::debug!(%template, xstart, ystart, "map placed");

    match template {
        ThemeTemplate::WaterVault => water_vault(level, rng, xstart, ystart),
        ThemeTemplate::BlockedCenter => {
            if rng.percent(30) {
                let mut blocks = ['-', 'P'];
                rng.shuffle(&mut blocks);
                let block = terrain_for(blocks[0]).unwrap_or(Terrain::Lava);
                replace_lava(level, rng, map, xstart, ystart, block);
            }
            filler_region(level, rng, template, xstart + map.filler.0, ystart + map.filler.1);
        }
        _ => filler_region(level, rng, template, xstart + map.filler.0, ystart + map.filler.1),
    }
    true
}

/// Swap the lava block for `block`, cell by cell, each at a 100% chance
fn replace_lava(level: &mut Level, rng: &mut Isaac64, map: &MapTemplate, xstart: i32, ystart: i32, block: Terrain) {
    for (dx, dy, ch) in map.positions() {
        if ch != 'L' {
            continue;
        }
        if rng.rn2(100) < 100 {
            let cell = level.cell_mut(xstart + dx, ystart + dy);
            cell.terrain = block;
            cell.horizontal = block.is_wall();
        }
    }
}

/// Turn the map's floor into a room, themed three times in ten
fn filler_region(level: &mut Level, rng: &mut Isaac64, template: ThemeTemplate, x: i32, y: i32) {
    let themed = rng.rn2(100) < 30;
    let lit = Lighting::Random.resolve(rng, level.depth);
    let Some(id) = register_region(level, template, (x, y), lit, true) else {
        tracing::warn!(%template, x, y, "map filler is not on floor");
        return;
    };
    if themed && let Some(room) = level.room_mut(id) {
        room.room_type = RoomType::Themed;
        room.themed_fill = true;
    }
}

/// Flood-fill unowned floor from `start` and register it as an irregular
/// top-level room. Walls touching the region become its edge.
pub(crate) fn register_region(
    level: &mut Level,
    template: ThemeTemplate,
    start: (i32, i32),
    lit: bool,
    needjoining: bool,
) -> Option<RoomId> {
    let free_floor =
        |level: &Level, x: i32, y: i32| level.get(x, y).is_some_and(|c| c.terrain == Terrain::Room && c.room.is_none());
    if !free_floor(level, start.0, start.1) {
        return None;
    }

    let id = RoomId::Room(level.rooms.len());
    let mut stack = vec![start];
    let mut region = Vec::new();
    level.cell_mut(start.0, start.1).room = Some(id);
    while let Some((x, y)) = stack.pop() {
        region.push((x, y));
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if free_floor(level, nx, ny) {
                level.cell_mut(nx, ny).room = Some(id);
                stack.push((nx, ny));
            }
        }
    }

    let (mut lx, mut ly, mut hx, mut hy) = (COLNO, ROWNO, 0, 0);
    for &(x, y) in &region {
        lx = lx.min(x);
        ly = ly.min(y);
        hx = hx.max(x);
        hy = hy.max(y);
        level.cell_mut(x, y).lit = lit;
        for nx in x - 1..=x + 1 {
            for ny in y - 1..=y + 1 {
                if !Level::isok(nx, ny) {
                    continue;
                }
                let cell = level.cell_mut(nx, ny);
                if cell.terrain.is_wall_like() {
                    if cell.room.is_none() {
                        cell.room = Some(id);
                    }
                    cell.edge = true;
                    cell.lit |= lit;
                }
            }
        }
    }

    let mut room = Room::new(lx, ly, hx, hy, lit);
    room.irregular = true;
    room.needjoining = needjoining;
    room.template = Some(template);
    level.rooms.push(room);
    tracing::debug!(?id, %template, cells = region.len(), "irregular room registered");
    Some(id)
}

/// Moat-ringed closet with four chests, one holding a way out, and a
/// nasty undead guard. Not joined to the rest of the level.
fn water_vault(level: &mut Level, rng: &mut Isaac64, xstart: i32, ystart: i32) {
    let lit = Lighting::Random.resolve(rng, level.depth);
    let Some(id) = register_region(level, ThemeTemplate::WaterVault, (xstart + 2, ystart + 2), lit, false) else {
        return;
    };
    if let Some(room) = level.room_mut(id) {
        room.room_type = RoomType::Themed;
        room.normal_fill = false;
    }

    let mut chest_spots = [(2, 2), (3, 2), (2, 3), (3, 3)];
    rng.shuffle(&mut chest_spots);
    let escape_items = [
        "scroll of teleportation",
        "cursed scroll of teleportation",
        "wand of teleportation",
        "wand of digging",
    ];
    let escape = escape_items[rng.rn2(escape_items.len() as i32) as usize];
    for (i, &(dx, dy)) in chest_spots.iter().enumerate() {
        let (x, y) = (xstart + dx, ystart + dy);
        level.spawns.push(SpawnHint::new(SpawnKind::Object, "chest", x, y));
        if i == 0 {
            level.spawns.push(SpawnHint::new(SpawnKind::Object, escape, x, y));
        }
    }

    let mut undead = ["giant zombie", "ettin zombie", "vampire lord"];
    rng.shuffle(&mut undead);
    level
        .spawns
        .push(SpawnHint::new(SpawnKind::Monster, undead[0], xstart + 2, ystart + 2));
}
