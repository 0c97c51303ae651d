//! Structural checks for generated levels

use std::collections::VecDeque;

use super::cell::Terrain;
use super::level::Level;
use super::room::RoomId;
use super::wallify::wallify;
use crate::consts::{COLNO, ROWNO};
use crate::error::InvariantViolation;

/// Check a level against the structural rules every generated level obeys.
///
/// Returns every violation found, not just the first.
pub fn check_level(level: &Level) -> Result<(), Vec<InvariantViolation>> {
    let mut found = Vec::new();
    check_ownership(level, &mut found);
    check_separation(level, &mut found);
    check_connectivity(level, &mut found);
    check_stairs(level, &mut found);
    check_walls(level, &mut found);
    if found.is_empty() { Ok(()) } else { Err(found) }
}

fn check_ownership(level: &Level, found: &mut Vec<InvariantViolation>) {
    for x in 0..COLNO {
        for y in 0..ROWNO {
            let cell = level.cell(x, y);
            if let Some(id) = cell.room
                && level.room(id).is_none()
            {
                found.push(InvariantViolation::UnknownRoom { x, y, id });
            }
            if cell.terrain == Terrain::ProvisionalDoor {
                found.push(InvariantViolation::ProvisionalDoor { x, y });
            }
        }
    }
}

fn check_separation(level: &Level, found: &mut Vec<InvariantViolation>) {
    for (a, ra) in level.rooms.iter().enumerate() {
        for (b, rb) in level.rooms.iter().enumerate().skip(a + 1) {
            if ra.bounds().intersects(&rb.footprint()) || rb.bounds().intersects(&ra.footprint()) {
                found.push(InvariantViolation::OverlappingRooms { a, b });
            }
        }
    }
}

/// Cells reachable from `start` without crossing rock or liquid
fn reachable(level: &Level, start: (i32, i32)) -> Vec<Vec<bool>> {
    let mut seen = vec![vec![false; ROWNO as usize]; COLNO as usize];
    let mut queue = VecDeque::from([start]);
    seen[start.0 as usize][start.1 as usize] = true;
    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            let Some(cell) = level.get(nx, ny) else {
                continue;
            };
            if cell.terrain.blocks_passage() || seen[nx as usize][ny as usize] {
                continue;
            }
            seen[nx as usize][ny as usize] = true;
            queue.push_back((nx, ny));
        }
    }
    seen
}

fn first_floor(level: &Level, i: usize) -> Option<(i32, i32)> {
    let room = &level.rooms[i];
    (room.lx..=room.hx)
        .flat_map(|x| (room.ly..=room.hy).map(move |y| (x, y)))
        .find(|&(x, y)| {
            let c = level.cell(x, y);
            c.room == Some(RoomId::Room(i)) && !c.terrain.blocks_passage()
        })
}

fn check_connectivity(level: &Level, found: &mut Vec<InvariantViolation>) {
    let joined: Vec<usize> = (0..level.rooms.len())
        .filter(|&i| level.rooms[i].needjoining)
        .collect();
    let Some(&from) = joined.first() else {
        return;
    };
    let Some(start) = first_floor(level, from) else {
        return;
    };
    let seen = reachable(level, start);
    for &room in &joined[1..] {
        let reached = first_floor(level, room).is_some_and(|(x, y)| seen[x as usize][y as usize]);
        if !reached {
            found.push(InvariantViolation::Disconnected { room, from });
        }
    }
}

fn check_stairs(level: &Level, found: &mut Vec<InvariantViolation>) {
    let has_room = !level.rooms.is_empty();
    if has_room && level.down_stairs.is_none() {
        found.push(InvariantViolation::MissingDownStairs);
    }
    match (level.depth, level.up_stairs) {
        (d, Some(_)) if d <= 1 => found.push(InvariantViolation::UnexpectedUpStairs),
        (d, None) if d > 1 && has_room => found.push(InvariantViolation::MissingUpStairs { depth: d }),
        _ => {}
    }
    if let (Some(up), Some(down)) = (level.up_stairs, level.down_stairs)
        && (up.x, up.y) == (down.x, down.y)
    {
        found.push(InvariantViolation::StairsCoincide { x: up.x, y: up.y });
    }
}

fn check_walls(level: &Level, found: &mut Vec<InvariantViolation>) {
    let mut again = level.clone();
    wallify(&mut again);
    for x in 0..COLNO {
        for y in 0..ROWNO {
            let before = level.cell(x, y).terrain;
            let after = again.cell(x, y).terrain;
            if before != after {
                found.push(InvariantViolation::WallificationUnstable {
                    x,
                    y,
                    before: format!("{:?}", before),
                    after: format!("{:?}", after),
                });
            }
        }
    }
}
