//! Structural properties of generated levels over random seeds and depths.

use std::collections::VecDeque;

use dgn_core::dungeon::{RoomId, Terrain, check_level, wallify};
use dgn_core::{COLNO, GenOptions, Level, ROWNO, generate_level, generate_level_with};
use proptest::prelude::*;

/// Needjoining rooms that cannot be walked to from the first one without
/// crossing rock or liquid
fn unreachable_rooms(level: &Level) -> Vec<usize> {
    let floor = |i: usize| {
        let r = &level.rooms[i];
        (r.lx..=r.hx)
            .flat_map(|x| (r.ly..=r.hy).map(move |y| (x, y)))
            .find(|&(x, y)| level.cell(x, y).room == Some(RoomId::Room(i)) && !level.cell(x, y).terrain.blocks_passage())
    };
    let joined: Vec<usize> = (0..level.rooms.len()).filter(|&i| level.rooms[i].needjoining).collect();
    let Some(start) = joined.first().and_then(|&i| floor(i)) else {
        return Vec::new();
    };

    let mut seen = vec![vec![false; ROWNO as usize]; COLNO as usize];
    let mut queue = VecDeque::from([start]);
    seen[start.0 as usize][start.1 as usize] = true;
    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if level.get(nx, ny).is_some_and(|c| !c.terrain.is_rock() && !c.terrain.is_liquid())
                && !seen[nx as usize][ny as usize]
            {
                seen[nx as usize][ny as usize] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    joined
        .into_iter()
        .filter(|&i| !floor(i).is_some_and(|(x, y)| seen[x as usize][y as usize]))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), depth in 1i32..30) {
        let a = generate_level(seed, depth);
        let b = generate_level(seed, depth);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn plain_levels_pass_every_check(seed in any::<u64>(), depth in 1i32..30) {
        let level = generate_level_with(seed, depth, &GenOptions::plain());
        prop_assert_eq!(check_level(&level), Ok(()));
    }

    #[test]
    fn themed_levels_pass_every_check(seed in any::<u64>(), depth in 1i32..30) {
        let level = generate_level(seed, depth);
        prop_assert_eq!(check_level(&level), Ok(()));
    }

    #[test]
    fn joined_rooms_are_walkable_around_liquid(seed in any::<u64>(), depth in 1i32..30) {
        let level = generate_level(seed, depth);
        prop_assert_eq!(check_level(&level), Ok(()));
        prop_assert_eq!(unreachable_rooms(&level), Vec::<usize>::new());
    }

    #[test]
    fn room_footprints_never_overlap(seed in any::<u64>(), depth in 1i32..30) {
        let level = generate_level(seed, depth);
        for (a, ra) in level.rooms.iter().enumerate() {
            for rb in &level.rooms[a + 1..] {
                prop_assert!(!ra.footprint().intersects(&rb.footprint()), "{:?} and {:?}", ra.bounds(), rb.bounds());
            }
        }
    }

    #[test]
    fn room_floor_is_owned_by_its_room(seed in any::<u64>(), depth in 1i32..10) {
        let level = generate_level(seed, depth);
        for (i, room) in level.rooms.iter().enumerate() {
            if room.irregular || !room.subrooms.is_empty() {
                continue;
            }
            for x in room.lx..=room.hx {
                for y in room.ly..=room.hy {
                    prop_assert_eq!(level.cell(x, y).room, Some(RoomId::Room(i)));
                }
            }
        }
    }

    #[test]
    fn wallification_is_stable(seed in any::<u64>()) {
        let level = generate_level(seed, 1);
        let mut again = level.clone();
        wallify(&mut again);
        prop_assert_eq!(level.to_ascii(), again.to_ascii());
    }

    #[test]
    fn stairs_sit_on_stairway_cells(seed in any::<u64>(), depth in 1i32..30) {
        let level = generate_level(seed, depth);
        if let Some(down) = level.down_stairs {
            prop_assert!(matches!(level.cell(down.x, down.y).terrain, Terrain::Stairs(_)));
        }
        if depth == 1 {
            prop_assert!(level.up_stairs.is_none());
        }
    }

    #[test]
    fn border_stays_stone(seed in any::<u64>()) {
        let level = generate_level(seed, 4);
        for x in 0..COLNO {
            prop_assert_eq!(level.cell(x, 0).terrain, Terrain::Stone);
            prop_assert_eq!(level.cell(x, ROWNO - 1).terrain, Terrain::Stone);
        }
        for y in 0..ROWNO {
            prop_assert_eq!(level.cell(0, y).terrain, Terrain::Stone);
        }
    }
}
