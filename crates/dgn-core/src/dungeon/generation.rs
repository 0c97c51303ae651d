//! Level generation (mklev.c: makelevel)
//!
//! Generates a level from a seed and depth:
//! 1. Rooms, ordinary or themed, carved from the free-rectangle pool
//! 2. Rooms sorted by left edge
//! 3. Corridors between rooms
//! 4. Wall shapes derived from neighbours
//! 5. Doors settled where corridors met walls
//! 6. Stairs
//! 7. Room fills
//!
//! Every random decision comes from one ISAAC64 stream seeded with `seed`,
//! so equal inputs give equal levels.

use dgn_rng::Isaac64;

use super::corridor::makecorridors;
use super::door::resolve_doors;
use super::level::Level;
use super::placement::{makerooms, sort_rooms};
use super::rect::RectPool;
use super::stairs::place_stairs;
use super::themes::apply_fills;
use super::validate::check_level;
use super::wallify::wallify;
use crate::options::GenOptions;

/// Generate a level with default options (themed rooms on)
pub fn generate_level(seed: u64, depth: i32) -> Level {
    generate_level_with(seed, depth, &GenOptions::default())
}

/// Generate a level with explicit options
pub fn generate_level_with(seed: u64, depth: i32, options: &GenOptions) -> Level {
    let span = tracing::debug_span!("generate_level", seed, depth);
    let _enter = span.enter();

    let mut rng = Isaac64::new(seed);
    if options.log_rng {
        rng.enable_logging();
    }
    let mut level = Level::new(seed, depth);
    let mut pool = RectPool::new();

    makerooms(&mut level, &mut pool, &mut rng, options);
    sort_rooms(&mut level);
    makecorridors(&mut level, &mut rng);
    wallify(&mut level);
    resolve_doors(&mut level, &mut rng);
    place_stairs(&mut level, &mut rng);
    apply_fills(&mut level, &mut rng);
    rng.clear_site();

    if options.log_rng {
        level.rng_log = rng.take_log();
    }

    if options.validate
        && let Err(violations) = check_level(&level)
    {
        for v in &violations {
            tracing::warn!(seed, depth, "{}", v);
        }
    }

    tracing::info!(
        seed,
        depth,
        rooms = level.rooms.len(),
        subrooms = level.subrooms.len(),
        draws = rng.call_count(),
        "level generated"
    );
    level
}
