//! Room fills, applied once the level's layout and stairs are final
//!
//! Ordinary rooms get the usual scattering of dungeon furniture. Rooms
//! marked for a themed fill get one fill picked by reservoir sampling over
//! the fills their depth and lighting allow.

use dgn_rng::Isaac64;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::dungeon::cell::Terrain;
use crate::dungeon::door::bydoor;
use crate::dungeon::level::Level;
use crate::dungeon::room::RoomId;
use crate::dungeon::trap::{SpawnHint, SpawnKind, TerrainTimer, TimerKind, Trap, TrapKind};

/// Themed room contents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemeFill {
    Ice,
    Cloud,
    Boulder,
    Spider,
    Trap,
    Garden,
    BuriedTreasure,
    BuriedZombies,
    Massacre,
    Statuary,
    LightSource,
    Temple,
    Ghost,
    Storeroom,
    Teleport,
}

impl ThemeFill {
    /// Can this fill go in a room at `depth` with the given lighting?
    pub fn eligible(self, depth: i32, lit: bool) -> bool {
        match self {
            ThemeFill::Boulder => depth >= 4,
            ThemeFill::Garden => lit,
            ThemeFill::LightSource => !lit,
            _ => true,
        }
    }
}

/// Corpses that can rise as zombies, weakest first
const ZOMBIFIABLE: [&str; 8] = ["kobold", "gnome", "orc", "dwarf", "elf", "human", "ettin", "giant"];

/// Zombie kinds for `depth`: four to start, elves and humans from depth 4,
/// ettins and giants from depth 7
fn zombifiable(depth: i32) -> &'static [&'static str] {
    let n = match depth {
        ..=3 => 4,
        4..=6 => 6,
        _ => 8,
    };
    &ZOMBIFIABLE[..n]
}

const MASSACRE_VICTIMS: [&str; 27] = [
    "apprentice",
    "warrior",
    "ninja",
    "thug",
    "hunter",
    "acolyte",
    "abbot",
    "page",
    "attendant",
    "neanderthal",
    "chieftain",
    "student",
    "wizard",
    "valkyrie",
    "tourist",
    "samurai",
    "rogue",
    "ranger",
    "priestess",
    "priest",
    "monk",
    "knight",
    "healer",
    "cavewoman",
    "caveman",
    "barbarian",
    "archeologist",
];

const TREASURE_ENGRAVINGS: [&str; 4] = ["X marks the spot.", "X marks the spot.", "Here be treasure.", "Dig here!"];

const STOREROOM_CLASSES: [&str; 5] = ["random tool", "random armor", "random weapon", "random gem", "random food"];

/// Plain floor cells owned by `id`, row by row
fn floor_cells(level: &Level, id: RoomId) -> Vec<(i32, i32)> {
    let Some(room) = level.room(id) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    for y in room.ly..=room.hy {
        for x in room.lx..=room.hx {
            let c = level.cell(x, y);
            if c.terrain == Terrain::Room && c.room == Some(id) {
                cells.push((x, y));
            }
        }
    }
    cells
}

fn has_trap(level: &Level, x: i32, y: i32) -> bool {
    level.traps.iter().any(|t| t.x == x && t.y == y)
}

/// Random floor spot free of traps and not beside a door (mklev.c:
/// find_okay_roompos)
fn okay_roompos(level: &Level, rng: &mut Isaac64, id: RoomId) -> Option<(i32, i32)> {
    for _ in 0..200 {
        let (x, y) = level.somexy(rng, id)?;
        if level.cell(x, y).terrain == Terrain::Room && !has_trap(level, x, y) && !bydoor(level, x, y) {
            return Some((x, y));
        }
    }
    None
}

fn put_feature(level: &mut Level, rng: &mut Isaac64, id: RoomId, terrain: Terrain) {
    if let Some((x, y)) = okay_roompos(level, rng, id) {
        level.cell_mut(x, y).terrain = terrain;
    }
}

fn put_trap(level: &mut Level, x: i32, y: i32, kind: TrapKind) {
    if level.cell(x, y).terrain == Terrain::Room && !has_trap(level, x, y) {
        level.traps.push(Trap { x, y, kind });
    }
}

fn hint(level: &mut Level, kind: SpawnKind, name: impl Into<String>, (x, y): (i32, i32)) {
    level.spawns.push(SpawnHint::new(kind, name, x, y));
}

/// Furniture for an ordinary room (mklev.c: fill_ordinary_room)
fn normal_fill(level: &mut Level, rng: &mut Isaac64, id: RoomId) {
    if rng.rn2(10) == 0 {
        put_feature(level, rng, id, Terrain::Fountain);
    }
    if rng.rn2(60) == 0 {
        put_feature(level, rng, id, Terrain::Sink);
    }
    if rng.rn2(60) == 0 {
        put_feature(level, rng, id, Terrain::Altar);
    }
    let grave_odds = (80 - 2 * level.depth).max(2);
    if rng.rn2(grave_odds) == 0 {
        put_feature(level, rng, id, Terrain::Grave);
    }
}

/// Pick and apply one themed fill. Returns the fill used.
fn themed_fill(level: &mut Level, rng: &mut Isaac64, id: RoomId) -> Option<ThemeFill> {
    let lit = level.room(id)?.lit;
    let depth = level.depth;

    let mut total = 0;
    let mut pick = None;
    for fill in ThemeFill::iter().filter(|f| f.eligible(depth, lit)) {
        total += 1;
        if rng.rn2(total) == 0 {
            pick = Some(fill);
        }
    }
    let fill = pick?;
    apply_fill(level, rng, id, fill);
    if let Some(room) = level.room_mut(id) {
        room.applied_fill = Some(fill);
    }
    tracing::debug!(?id, %fill, "themed fill applied");
    Some(fill)
}

fn apply_fill(level: &mut Level, rng: &mut Isaac64, id: RoomId, fill: ThemeFill) {
    let Some(room) = level.room(id) else {
        return;
    };
    let area = room.width() * room.height();
    let depth = level.depth;

    match fill {
        ThemeFill::Ice => {
            let melts = rng.percent(25);
            for (x, y) in floor_cells(level, id) {
                level.cell_mut(x, y).terrain = Terrain::Ice;
                if melts {
                    let turns = (1000 - depth * 100).max(0) + rng.rn2(1000);
                    level.timers.push(TerrainTimer {
                        x,
                        y,
                        kind: TimerKind::MeltIce,
                        turns,
                    });
                }
            }
        }

        ThemeFill::Cloud => {
            for (x, y) in floor_cells(level, id) {
                level.cell_mut(x, y).terrain = Terrain::Cloud;
            }
            for _ in 0..area / 4 {
                if let Some(pos) = level.somexy(rng, id) {
                    hint(level, SpawnKind::Monster, "fog cloud", pos);
                }
            }
        }

        ThemeFill::Boulder => {
            for (x, y) in floor_cells(level, id) {
                if rng.percent(30) {
                    if rng.percent(50) {
                        hint(level, SpawnKind::Object, "boulder", (x, y));
                    } else {
                        put_trap(level, x, y, TrapKind::RollingBoulder);
                    }
                }
            }
        }

        ThemeFill::Spider => {
            for (x, y) in floor_cells(level, id) {
                if rng.percent(30) {
                    put_trap(level, x, y, TrapKind::Web);
                    if depth > 8 && rng.percent(80) {
                        hint(level, SpawnKind::Monster, "giant spider", (x, y));
                    }
                }
            }
        }

        ThemeFill::Trap => {
            let mut kinds = [
                TrapKind::Arrow,
                TrapKind::Dart,
                TrapKind::FallingRock,
                TrapKind::BearTrap,
                TrapKind::LandMine,
                TrapKind::SleepingGas,
                TrapKind::Rust,
                TrapKind::AntiMagic,
            ];
            rng.shuffle(&mut kinds);
            for (x, y) in floor_cells(level, id) {
                if rng.percent(30) {
                    put_trap(level, x, y, kinds[0]);
                }
            }
        }

        ThemeFill::Garden => {
            let npts = floor_cells(level, id).len() / 6;
            for _ in 0..npts {
                if let Some(pos) = level.somexy(rng, id) {
                    hint(level, SpawnKind::Monster, "wood nymph", pos);
                }
                if rng.percent(30) {
                    put_feature(level, rng, id, Terrain::Tree);
                }
            }
            if rng.percent(30) {
                put_feature(level, rng, id, Terrain::Fountain);
            }
        }

        ThemeFill::BuriedTreasure => {
            if let Some(pos) = level.somexy(rng, id) {
                level.spawns.push(SpawnHint::new(SpawnKind::Object, "chest", pos.0, pos.1).buried());
            }
            let text = TREASURE_ENGRAVINGS[rng.rn2(TREASURE_ENGRAVINGS.len() as i32) as usize];
            if let Some(pos) = level.somexy(rng, id) {
                hint(level, SpawnKind::Engraving, text, pos);
            }
        }

        ThemeFill::BuriedZombies => {
            let mut kinds = zombifiable(depth).to_vec();
            for _ in 0..area / 2 {
                rng.shuffle(&mut kinds);
                let Some((x, y)) = level.somexy(rng, id) else {
                    break;
                };
                let corpse = format!("{} corpse", kinds[0]);
                level.spawns.push(SpawnHint::new(SpawnKind::Object, corpse, x, y).buried());
                level.timers.push(TerrainTimer {
                    x,
                    y,
                    kind: TimerKind::Zombify,
                    turns: 990 + rng.rn2(21),
                });
            }
        }

        ThemeFill::Massacre => {
            let n = MASSACRE_VICTIMS.len() as i32;
            let mut idx = rng.rn2(n) as usize;
            for _ in 0..rng.d(5, 5) {
                if rng.percent(10) {
                    idx = rng.rn2(n) as usize;
                }
                if let Some(pos) = level.somexy(rng, id) {
                    hint(level, SpawnKind::Object, format!("{} corpse", MASSACRE_VICTIMS[idx]), pos);
                }
            }
        }

        ThemeFill::Statuary => {
            for _ in 0..rng.d(5, 5) {
                if let Some(pos) = level.somexy(rng, id) {
                    hint(level, SpawnKind::Object, "statue", pos);
                }
            }
            for _ in 0..rng.rnd(3) {
                if let Some((x, y)) = okay_roompos(level, rng, id) {
                    put_trap(level, x, y, TrapKind::Statue);
                }
            }
        }

        ThemeFill::LightSource => {
            if let Some(pos) = level.somexy(rng, id) {
                hint(level, SpawnKind::Object, "lit oil lamp", pos);
            }
        }

        ThemeFill::Temple => {
            for _ in 0..3 {
                if let Some((x, y)) = level.somexy(rng, id)
                    && level.cell(x, y).terrain == Terrain::Room
                {
                    level.cell_mut(x, y).terrain = Terrain::Altar;
                }
            }
        }

        ThemeFill::Ghost => {
            let Some(pos) = level.somexy(rng, id) else {
                return;
            };
            hint(level, SpawnKind::Monster, "ghost", pos);
            let loot: [(i32, &[&str]); 5] = [
                (65, &["dagger"]),
                (55, &["random weapon"]),
                (45, &["bow", "arrow"]),
                (65, &["random armor"]),
                (20, &["random ring"]),
            ];
            for (chance, names) in loot {
                if rng.percent(chance) {
                    for name in names {
                        hint(level, SpawnKind::Object, *name, pos);
                    }
                }
            }
            if rng.percent(20) {
                hint(level, SpawnKind::Object, "random scroll", pos);
            }
        }

        ThemeFill::Storeroom => {
            let class = STOREROOM_CLASSES[rng.rn2(STOREROOM_CLASSES.len() as i32) as usize];
            for pos in floor_cells(level, id) {
                if rng.percent(30) {
                    hint(level, SpawnKind::Object, class, pos);
                }
            }
        }

        ThemeFill::Teleport => {
            for _ in 0..2 + rng.rn2(3) {
                if let Some((x, y)) = okay_roompos(level, rng, id) {
                    put_trap(level, x, y, TrapKind::Teleport);
                }
            }
        }
    }
}

fn fill_subrooms(level: &mut Level, rng: &mut Isaac64, parent: RoomId) {
    let subs = level.room(parent).map(|r| r.subrooms.clone()).unwrap_or_default();
    for s in subs {
        let id = RoomId::Subroom(s);
        if level.subrooms[s].normal_fill {
            normal_fill(level, rng, id);
        }
        fill_subrooms(level, rng, id);
    }
}

/// Fill every room in sorted order: normal fill, then themed fill, then
/// the room's subrooms.
pub fn apply_fills(level: &mut Level, rng: &mut Isaac64) {
    rng.set_site("fill");
    let mut themed = 0;
    for i in 0..level.rooms.len() {
        let id = RoomId::Room(i);
        if level.rooms[i].normal_fill {
            normal_fill(level, rng, id);
        }
        if level.rooms[i].themed_fill && themed_fill(level, rng, id).is_some() {
            themed += 1;
        }
        fill_subrooms(level, rng, id);
    }
    tracing::debug!(rooms = level.rooms.len(), themed, "rooms filled");
}
