//! Stairway placement (mklev.c: mkstairs)

use dgn_rng::Isaac64;

use super::cell::{StairDir, Terrain};
use super::level::{Level, Stairway};
use super::room::RoomId;
use crate::consts::STAIR_TRIES;

/// Try `STAIR_TRIES` random rooms for a plain floor cell, then scan.
///
/// `pick` maps a draw to an index into `candidates`. `avoid` is skipped
/// by the fallback scan when another room is available.
fn find_spot(
    level: &Level,
    rng: &mut Isaac64,
    candidates: &[usize],
    avoid: Option<usize>,
    mut pick: impl FnMut(&mut Isaac64) -> usize,
) -> Option<(usize, i32, i32)> {
    for _ in 0..STAIR_TRIES {
        let i = candidates[pick(rng)];
        if let Some((x, y)) = level.somexy_floor(rng, RoomId::Room(i)) {
            return Some((i, x, y));
        }
    }

    let mut order: Vec<usize> = candidates.iter().copied().filter(|&i| Some(i) != avoid).collect();
    order.extend(avoid.filter(|a| candidates.contains(a)));
    for i in order {
        let room = &level.rooms[i];
        for x in room.lx..=room.hx {
            for y in room.ly..=room.hy {
                let cell = level.cell(x, y);
                if cell.terrain == Terrain::Room && cell.room == Some(RoomId::Room(i)) {
                    tracing::warn!(room = i, x, y, "stairs placed by scan after random tries failed");
                    return Some((i, x, y));
                }
            }
        }
    }
    None
}

fn set_stairs(level: &mut Level, x: i32, y: i32, dir: StairDir) {
    level.cell_mut(x, y).terrain = Terrain::Stairs(dir);
    let stairs = Some(Stairway { x, y, dir });
    match dir {
        StairDir::Up => level.up_stairs = stairs,
        StairDir::Down => level.down_stairs = stairs,
    }
}

/// Place the down stairs, and the up stairs below the first level, in
/// rooms that corridors reach. Up and down go to different rooms when
/// there is more than one. A level whose rooms are all closed off still
/// gets its stairs in one of them.
pub fn place_stairs(level: &mut Level, rng: &mut Isaac64) {
    rng.set_site("mkstairs");
    let mut candidates: Vec<usize> = (0..level.rooms.len())
        .filter(|&i| level.rooms[i].needjoining)
        .collect();
    if candidates.is_empty() {
        candidates = (0..level.rooms.len()).collect();
    }
    if candidates.is_empty() {
        tracing::warn!(depth = level.depth, "no room for stairs");
        return;
    }
    let ncand = candidates.len() as i32;

    let Some((down_room, x, y)) = find_spot(level, rng, &candidates, None, |rng| rng.rn2(ncand) as usize)
    else {
        tracing::warn!("down stairs not placed");
        return;
    };
    set_stairs(level, x, y, StairDir::Down);

    if level.depth <= 1 {
        return;
    }

    let down_idx = candidates.iter().position(|&i| i == down_room).unwrap_or(0);
    let pick_up = |rng: &mut Isaac64| {
        if ncand > 1 {
            let i = rng.rn2(ncand - 1) as usize;
            if i >= down_idx { i + 1 } else { i }
        } else {
            0
        }
    };
    match find_spot(level, rng, &candidates, Some(down_room), pick_up) {
        Some((_, x, y)) => set_stairs(level, x, y, StairDir::Up),
        None => tracing::warn!("up stairs not placed"),
    }
}
