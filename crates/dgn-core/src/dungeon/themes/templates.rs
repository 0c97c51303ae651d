//! Rectangular themed rooms: nested rooms, pillars, mausoleums and friends

use dgn_rng::Isaac64;

use super::ThemeTemplate;
use super::maps::terrain_for;
use crate::dungeon::cell::{DoorState, Terrain};
use crate::dungeon::door::{DoorSpec, create_door};
use crate::dungeon::level::Level;
use crate::dungeon::placement::{RoomSize, create_room, create_subroom};
use crate::dungeon::rect::RectPool;
use crate::dungeon::room::{Lighting, RoomId, RoomType};
use crate::dungeon::trap::{SpawnHint, SpawnKind};

/// Scripted rooms roll against a creation chance. Every template here uses
/// a chance of 100, so the roll always passes but still consumes a draw.
fn room_chance(rng: &mut Isaac64) -> bool {
    rng.rn2(100) < 100
}

/// Door with a random state on a random wall.
///
/// The script rolls a door state of its own first and then lets
/// `create_door` roll again, so the first roll is discarded.
fn random_door(level: &mut Level, rng: &mut Isaac64, id: RoomId, walls_any: bool) {
    rng.rn2(5);
    let mut spec = if walls_any {
        DoorSpec::any_wall()
    } else {
        DoorSpec::default()
    };
    spec.secret = Some(false);
    create_door(level, rng, id, spec);
}

fn secret_door(level: &mut Level, rng: &mut Isaac64, id: RoomId) {
    let spec = DoorSpec {
        secret: Some(true),
        state: Some(DoorState::Closed),
        walls: None,
    };
    create_door(level, rng, id, spec);
}

/// Tag a freshly built room with the template and fill flags
fn mark(level: &mut Level, id: RoomId, template: ThemeTemplate, room_type: RoomType, normal: bool, themed: bool) {
    if let Some(room) = level.room_mut(id) {
        room.template = Some(template);
        room.room_type = room_type;
        room.normal_fill = normal;
        room.themed_fill = themed;
    }
}

fn set_terrain(level: &mut Level, x: i32, y: i32, terrain: Terrain) {
    let cell = level.cell_mut(x, y);
    cell.terrain = terrain;
    cell.horizontal = matches!(terrain, Terrain::Wall(_) | Terrain::IronBars);
}

/// Build a non-map template. Returns whether the outermost room exists.
pub(super) fn build(level: &mut Level, pool: &mut RectPool, rng: &mut Isaac64, template: ThemeTemplate) -> bool {
    use ThemeTemplate::*;

    match template {
        Default => {
            room_chance(rng);
            let Some(id) = create_room(level, pool, rng, RoomSize::Random, Lighting::Random) else {
                return false;
            };
            mark(level, id, template, RoomType::Ordinary, true, false);
            true
        }

        FakeDelphi => {
            room_chance(rng);
            let Some(outer) = create_room(level, pool, rng, RoomSize::Fixed { w: 11, h: 9 }, Lighting::Random) else {
                return false;
            };
            mark(level, outer, template, RoomType::Ordinary, true, false);
            room_chance(rng);
            if let Some(inner) = create_subroom(level, rng, outer, Some((3, 3)), Some((4, 3)), Lighting::Random) {
                mark(level, inner, template, RoomType::Ordinary, true, false);
                random_door(level, rng, inner, true);
            }
            true
        }

        RoomInRoom => {
            room_chance(rng);
            let Some(outer) = create_room(level, pool, rng, RoomSize::Random, Lighting::Random) else {
                return false;
            };
            mark(level, outer, template, RoomType::Ordinary, true, false);
            room_chance(rng);
            if let Some(inner) = create_subroom(level, rng, outer, None, None, Lighting::Random) {
                mark(level, inner, template, RoomType::Ordinary, false, false);
                random_door(level, rng, inner, false);
            }
            true
        }

        HugeRoom => {
            let wid = rng.rn2(10);
            let hei = rng.rn2(5);
            room_chance(rng);
            let size = RoomSize::Fixed { w: 11 + wid, h: 8 + hei };
            let Some(outer) = create_room(level, pool, rng, size, Lighting::Random) else {
                return false;
            };
            mark(level, outer, template, RoomType::Ordinary, true, false);
            if rng.rn2(100) < 90 {
                room_chance(rng);
                if let Some(inner) = create_subroom(level, rng, outer, None, None, Lighting::Random) {
                    mark(level, inner, template, RoomType::Ordinary, true, false);
                    random_door(level, rng, inner, false);
                    if rng.rn2(100) < 50 {
                        random_door(level, rng, inner, false);
                    }
                }
            }
            true
        }

        NestingRooms => build_nesting(level, pool, rng),

        ThemedFill | UnlitThemedFill | NormalAndThemedFill => {
            let lighting = if template == UnlitThemedFill {
                Lighting::Unlit
            } else {
                Lighting::Random
            };
            room_chance(rng);
            let Some(id) = create_room(level, pool, rng, RoomSize::Random, lighting) else {
                return false;
            };
            mark(level, id, template, RoomType::Themed, template == NormalAndThemedFill, true);
            true
        }

        Pillars => {
            room_chance(rng);
            let Some(id) = create_room(level, pool, rng, RoomSize::Fixed { w: 10, h: 10 }, Lighting::Random) else {
                return false;
            };
            mark(level, id, template, RoomType::Themed, false, false);
            let mut terrains = ['-', '-', '-', '-', 'L', 'P', 'T'];
            rng.shuffle(&mut terrains);
            let pillar = terrain_for(terrains[0]).unwrap_or(Terrain::Room);
            let Some(room) = level.room(id) else {
                return true;
            };
            let (lx, ly) = (room.lx, room.ly);
            for px in 0..=1 {
                for py in 0..=1 {
                    let (x0, y0) = (lx + px * 4 + 2, ly + py * 4 + 2);
                    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        set_terrain(level, x0 + dx, y0 + dy, pillar);
                    }
                }
            }
            true
        }

        Mausoleum => build_mausoleum(level, pool, rng),

        RandomFeature => {
            let wid = 3 + rng.rn2(3) * 2;
            let hei = 3 + rng.rn2(3) * 2;
            room_chance(rng);
            let Some(id) = create_room(level, pool, rng, RoomSize::Fixed { w: wid, h: hei }, Lighting::Random) else {
                return false;
            };
            mark(level, id, template, RoomType::Ordinary, true, false);
            let mut features = ['C', 'L', 'I', 'P', 'T'];
            rng.shuffle(&mut features);
            if let Some(room) = level.room(id)
                && let Some(feature) = terrain_for(features[0])
            {
                let (x, y) = (room.lx + (room.hx - room.lx) / 2, room.ly + (room.hy - room.ly) / 2);
                set_terrain(level, x, y, feature);
            }
            true
        }

        _ => {
            tracing::error!(%template, "map template routed to the room builder");
            false
        }
    }
}

/// Three rooms, each inside the last
fn build_nesting(level: &mut Level, pool: &mut RectPool, rng: &mut Isaac64) -> bool {
    let template = ThemeTemplate::NestingRooms;
    let a = rng.rn2(4);
    let b = rng.rn2(4);
    room_chance(rng);
    let Some(outer) = create_room(level, pool, rng, RoomSize::Fixed { w: 9 + a, h: 9 + b }, Lighting::Random) else {
        return false;
    };
    mark(level, outer, template, RoomType::Ordinary, true, false);

    let Some((width, height)) = level.room(outer).map(|r| (r.width(), r.height())) else {
        return true;
    };
    let mid_w = width / 2 + rng.rn2(width - 2 - width / 2 + 1);
    let mid_h = height / 2 + rng.rn2(height - 2 - height / 2 + 1);
    room_chance(rng);
    let Some(middle) = create_subroom(level, rng, outer, Some((mid_w, mid_h)), None, Lighting::Random) else {
        return true;
    };
    mark(level, middle, template, RoomType::Ordinary, true, false);

    if rng.rn2(100) < 90 {
        room_chance(rng);
        if let Some(inner) = create_subroom(level, rng, middle, None, None, Lighting::Random) {
            mark(level, inner, template, RoomType::Ordinary, true, false);
            random_door(level, rng, inner, false);
            if rng.rn2(100) < 15 {
                random_door(level, rng, inner, false);
            }
        }
    }
    random_door(level, rng, middle, false);
    if rng.rn2(100) < 15 {
        random_door(level, rng, middle, false);
    }
    true
}

/// A sealed one-cell tomb in the middle of a themed room
fn build_mausoleum(level: &mut Level, pool: &mut RectPool, rng: &mut Isaac64) -> bool {
    let template = ThemeTemplate::Mausoleum;
    let w = 5 + rng.rn2(3) * 2;
    let h = 5 + rng.rn2(3) * 2;
    room_chance(rng);
    let Some(outer) = create_room(level, pool, rng, RoomSize::Fixed { w, h }, Lighting::Random) else {
        return false;
    };
    mark(level, outer, template, RoomType::Themed, false, false);

    let Some((width, height)) = level.room(outer).map(|r| (r.width(), r.height())) else {
        return true;
    };
    room_chance(rng);
    let pos = ((width - 1) / 2, (height - 1) / 2);
    let Some(tomb) = create_subroom(level, rng, outer, Some((1, 1)), Some(pos), Lighting::Random) else {
        return true;
    };
    mark(level, tomb, template, RoomType::Themed, false, false);
    if let Some(room) = level.room_mut(tomb) {
        room.needjoining = false;
    }

    let Some((x, y)) = level.room(tomb).map(|r| (r.lx, r.ly)) else {
        return true;
    };
    if rng.percent(50) {
        let mut classes = ["mummy", "vampire", "lich", "zombie"];
        rng.shuffle(&mut classes);
        level.spawns.push(SpawnHint::new(SpawnKind::Monster, classes[0], x, y));
    } else {
        level.spawns.push(SpawnHint::new(SpawnKind::Object, "human corpse", x, y));
    }
    if rng.percent(20) {
        secret_door(level, rng, tomb);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_one(seed: u64, template: ThemeTemplate) -> (Level, bool) {
        let mut level = Level::new(seed, 1);
        let mut pool = RectPool::new();
        let mut rng = Isaac64::new(seed);
        let ok = build(&mut level, &mut pool, &mut rng, template);
        (level, ok)
    }

    #[test]
    fn test_default_is_one_ordinary_room() {
        let (level, ok) = build_one(3, ThemeTemplate::Default);
        assert!(ok);
        assert_eq!(level.rooms.len(), 1);
        assert_eq!(level.rooms[0].template, Some(ThemeTemplate::Default));
        assert!(level.rooms[0].normal_fill);
    }

    #[test]
    fn test_fake_delphi_centre_room() {
        let (level, ok) = build_one(5, ThemeTemplate::FakeDelphi);
        assert!(ok);
        let outer = &level.rooms[0];
        assert_eq!((outer.width(), outer.height()), (11, 9));
        let inner = &level.subrooms[0];
        assert_eq!((inner.lx - outer.lx, inner.ly - outer.ly), (4, 3));
        assert_eq!((inner.width(), inner.height()), (3, 3));
        assert_eq!(inner.doors.len(), 1);
        let (x, y) = inner.doors[0];
        assert!(level.cell(x, y).terrain.is_door());
        assert!(!matches!(level.cell(x, y).terrain, Terrain::SecretDoor(_)));
    }

    #[test]
    fn test_nesting_rooms_nest() {
        let mut seen_inner = false;
        for seed in 0..20 {
            let (level, ok) = build_one(seed, ThemeTemplate::NestingRooms);
            assert!(ok);
            let outer = &level.rooms[0];
            assert!((9..=12).contains(&outer.width()));
            let middle = &level.subrooms[0];
            assert_eq!(middle.parent, Some(RoomId::Room(0)));
            assert!(middle.width() >= outer.width() / 2);
            if let Some(inner) = level.subrooms.get(1) {
                assert_eq!(inner.parent, Some(RoomId::Subroom(0)));
                assert!(inner.lx >= middle.lx && inner.hx <= middle.hx);
                seen_inner = true;
            }
        }
        assert!(seen_inner);
    }

    #[test]
    fn test_pillars_are_two_by_two() {
        let (level, ok) = build_one(9, ThemeTemplate::Pillars);
        assert!(ok);
        let room = &level.rooms[0];
        assert_eq!(room.room_type, RoomType::Themed);
        let pillar = level.cell(room.lx + 2, room.ly + 2).terrain;
        assert_ne!(pillar, Terrain::Room);
        for (x, y) in [(3, 3), (6, 2), (7, 7), (2, 7)] {
            assert_eq!(level.cell(room.lx + x, room.ly + y).terrain, pillar);
        }
        assert_eq!(level.cell(room.lx, room.ly).terrain, Terrain::Room);
        assert_eq!(level.cell(room.lx + 4, room.ly + 4).terrain, Terrain::Room);
    }

    #[test]
    fn test_mausoleum_tomb_is_sealed() {
        for seed in 0..10 {
            let (level, ok) = build_one(seed, ThemeTemplate::Mausoleum);
            assert!(ok);
            let outer = &level.rooms[0];
            assert_eq!(outer.width() % 2, 1);
            let tomb = &level.subrooms[0];
            assert_eq!((tomb.width(), tomb.height()), (1, 1));
            assert!(!tomb.needjoining);
            assert_eq!(tomb.lx - outer.lx, (outer.width() - 1) / 2);
            assert_eq!(level.spawns.len(), 1);
            assert_eq!((level.spawns[0].x, level.spawns[0].y), (tomb.lx, tomb.ly));
        }
    }

    #[test]
    fn test_random_feature_in_centre() {
        let (level, ok) = build_one(14, ThemeTemplate::RandomFeature);
        assert!(ok);
        let room = &level.rooms[0];
        assert_eq!(room.width() % 2, 1);
        let (cx, cy) = (room.lx + (room.hx - room.lx) / 2, room.ly + (room.hy - room.ly) / 2);
        assert_ne!(level.cell(cx, cy).terrain, Terrain::Room);
        let features = level.count_cells(|c| c.room == Some(RoomId::Room(0)) && !c.terrain.is_wall() && c.terrain != Terrain::Room);
        assert_eq!(features, 1);
    }

    #[test]
    fn test_unlit_themed_fill_room() {
        let mut level = Level::new(0, 1);
        let mut pool = RectPool::new();
        let mut rng = Isaac64::new(2);
        rng.enable_logging();
        assert!(build(&mut level, &mut pool, &mut rng, ThemeTemplate::UnlitThemedFill));
        let room = &level.rooms[0];
        assert!(!room.lit);
        assert!(room.themed_fill);
        assert!(!room.normal_fill);
        assert_eq!(room.room_type, RoomType::Themed);
        // the chance roll, then straight to the pool pick with no lighting draw
        assert_eq!(rng.log()[0].args, vec![100]);
        assert_eq!(rng.log()[1].args, vec![1]);
    }
}
