//! Themed room scenarios: every template on its own, and the standard mix.

use dgn_core::dungeon::{RoomType, Terrain, ThemePool, ThemeTemplate, check_level};
use dgn_core::{GenOptions, Level, generate_level, generate_level_with};
use strum::IntoEnumIterator;

// ============================================================================
// Helpers
// ============================================================================

fn only(template: ThemeTemplate) -> GenOptions {
    GenOptions {
        themes: Some(ThemePool::only(template)),
        ..GenOptions::default()
    }
}

fn has_template(level: &Level, template: ThemeTemplate) -> bool {
    level
        .rooms
        .iter()
        .chain(level.subrooms.iter())
        .any(|r| r.template == Some(template))
}

// ============================================================================
// Single-template levels
// ============================================================================

#[test]
fn every_template_builds_a_valid_level() {
    for template in ThemeTemplate::iter() {
        for seed in 0..4 {
            let level = generate_level_with(seed, 3, &only(template));
            assert!(has_template(&level, template), "{} seed {}", template, seed);
            if let Err(errs) = check_level(&level) {
                panic!("{} seed {}: {:?}\n{}", template, seed, errs, level.to_ascii());
            }
        }
    }
}

#[test]
fn map_templates_make_irregular_rooms() {
    for template in ThemeTemplate::iter().filter(|t| t.map().is_some()) {
        let level = generate_level_with(11, 2, &only(template));
        let room = level
            .rooms
            .iter()
            .find(|r| r.template == Some(template))
            .unwrap_or_else(|| panic!("{} not placed", template));
        assert!(room.irregular, "{}", template);
        assert_eq!(room.needjoining, template != ThemeTemplate::WaterVault);
    }
}

#[test]
fn nesting_rooms_have_subrooms() {
    let level = generate_level_with(21, 1, &only(ThemeTemplate::NestingRooms));
    assert!(!level.subrooms.is_empty());
    for sub in &level.subrooms {
        let parent = level.room(sub.parent.unwrap()).unwrap();
        assert!(sub.lx >= parent.lx && sub.hx <= parent.hx);
        assert!(sub.ly >= parent.ly && sub.hy <= parent.hy);
    }
}

#[test]
fn themed_fill_rooms_record_their_fill() {
    let mut filled = 0;
    for seed in 0..10 {
        let level = generate_level_with(seed, 6, &only(ThemeTemplate::ThemedFill));
        for room in &level.rooms {
            assert_eq!(room.room_type, RoomType::Themed);
            if let Some(fill) = room.applied_fill {
                assert!(fill.eligible(6, room.lit), "{} in a room lit={}", fill, room.lit);
                filled += 1;
            }
        }
    }
    assert!(filled > 0);
}

// ============================================================================
// Standard pool
// ============================================================================

#[test]
fn standard_pool_is_mostly_default_rooms() {
    let mut default = 0;
    let mut total = 0;
    for seed in 0..40 {
        let level = generate_level(seed, 1);
        for room in &level.rooms {
            total += 1;
            if room.template == Some(ThemeTemplate::Default) {
                default += 1;
            }
        }
    }
    assert!(default * 10 > total * 8, "{} of {} default rooms", default, total);
}

#[test]
fn disabling_themes_gives_plain_rooms() {
    let level = generate_level_with(42, 1, &GenOptions::plain());
    assert!(level.rooms.iter().all(|r| r.template.is_none() && !r.irregular));
    assert!(level.subrooms.is_empty());
}

#[test]
fn fills_never_cover_stairs() {
    for seed in 0..30 {
        let level = generate_level(seed, 5);
        if let Some(s) = level.up_stairs {
            assert!(matches!(level.cell(s.x, s.y).terrain, Terrain::Stairs(_)));
        }
        if let Some(s) = level.down_stairs {
            assert!(matches!(level.cell(s.x, s.y).terrain, Terrain::Stairs(_)));
        }
    }
}
