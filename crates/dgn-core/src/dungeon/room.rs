//! Rooms and subrooms (mkroom.h)

use dgn_rng::Isaac64;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::cell::Terrain;
use super::level::Level;
use super::rect::Rect;
use super::themes::{ThemeFill, ThemeTemplate};

/// Back-reference from a cell to the room owning it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomId {
    /// Index into `Level::rooms`
    Room(usize),
    /// Index into `Level::subrooms`
    Subroom(usize),
}

impl RoomId {
    pub const fn index(self) -> usize {
        match self {
            RoomId::Room(i) | RoomId::Subroom(i) => i,
        }
    }

    pub const fn is_subroom(self) -> bool {
        matches!(self, RoomId::Subroom(_))
    }
}

/// Room classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum RoomType {
    #[default]
    Ordinary,
    /// Ordinary room selected for a themed fill
    Themed,
}

/// Lighting request for a new room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lighting {
    /// Decided by the depth-dependent lighting draw
    #[default]
    Random,
    Lit,
    Unlit,
}

impl Lighting {
    /// Resolve to a lit flag; `Random` consumes `rnd(1 + depth)` and
    /// possibly `rn2(77)`.
    pub fn resolve(self, rng: &mut Isaac64, depth: i32) -> bool {
        match self {
            Lighting::Lit => true,
            Lighting::Unlit => false,
            Lighting::Random => rng.rnd(1 + depth.abs()) < 11 && rng.rn2(77) != 0,
        }
    }
}

/// A room or subroom
///
/// Bounds describe the floor only; walls sit one cell outside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub lx: i32,
    pub ly: i32,
    pub hx: i32,
    pub hy: i32,
    pub room_type: RoomType,
    pub lit: bool,
    /// Door positions on this room's walls
    pub doors: Vec<(i32, i32)>,
    /// Shape comes from a map template rather than a rectangle
    pub irregular: bool,
    /// Whether corridors must reach this room
    pub needjoining: bool,
    pub parent: Option<RoomId>,
    /// Indices into `Level::subrooms`
    pub subrooms: Vec<usize>,
    /// Theme template that produced this room, if any
    pub template: Option<ThemeTemplate>,
    pub normal_fill: bool,
    pub themed_fill: bool,
    /// Themed fill actually applied
    pub applied_fill: Option<ThemeFill>,
}

impl Room {
    pub fn new(lx: i32, ly: i32, hx: i32, hy: i32, lit: bool) -> Self {
        Self {
            lx,
            ly,
            hx,
            hy,
            room_type: RoomType::Ordinary,
            lit,
            doors: Vec::new(),
            irregular: false,
            needjoining: true,
            parent: None,
            subrooms: Vec::new(),
            template: None,
            normal_fill: true,
            themed_fill: false,
            applied_fill: None,
        }
    }

    pub const fn width(&self) -> i32 {
        self.hx - self.lx + 1
    }

    pub const fn height(&self) -> i32 {
        self.hy - self.ly + 1
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.lx && x <= self.hx && y >= self.ly && y <= self.hy
    }

    /// Floor bounds as a rectangle
    pub const fn bounds(&self) -> Rect {
        Rect::new(self.lx, self.ly, self.hx, self.hy)
    }

    /// Floor plus surrounding walls
    pub const fn footprint(&self) -> Rect {
        Rect::new(self.lx - 1, self.ly - 1, self.hx + 1, self.hy + 1)
    }

    pub fn add_door(&mut self, x: i32, y: i32) {
        if !self.doors.contains(&(x, y)) {
            self.doors.push((x, y));
        }
    }

    /// Random column inside the room
    pub fn somex(&self, rng: &mut Isaac64) -> i32 {
        rng.rn1(self.hx - self.lx + 1, self.lx)
    }

    /// Random row inside the room
    pub fn somey(&self, rng: &mut Isaac64) -> i32 {
        rng.rn1(self.hy - self.ly + 1, self.ly)
    }
}

impl Level {
    /// Random interior point of a room.
    ///
    /// A plain rectangular room takes exactly two draws. Irregular rooms and
    /// rooms containing subrooms redraw until the point is the room's own
    /// floor, then fall back to a scan. `None` when the room has no floor
    /// of its own.
    pub fn somexy(&self, rng: &mut Isaac64, id: RoomId) -> Option<(i32, i32)> {
        let room = self.room(id)?;
        if !room.irregular && room.subrooms.is_empty() {
            let x = room.somex(rng);
            let y = room.somey(rng);
            return Some((x, y));
        }

        let owned = |x: i32, y: i32| {
            self.get(x, y).is_some_and(|c| {
                c.room == Some(id) && !c.terrain.is_wall() && !c.edge
            })
        };

        for _ in 0..100 {
            let x = room.somex(rng);
            let y = room.somey(rng);
            if owned(x, y) {
                return Some((x, y));
            }
        }

        for x in room.lx..=room.hx {
            for y in room.ly..=room.hy {
                if owned(x, y) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// `somexy` restricted to plain room floor
    pub(crate) fn somexy_floor(&self, rng: &mut Isaac64, id: RoomId) -> Option<(i32, i32)> {
        self.somexy(rng, id)
            .filter(|&(x, y)| self.cell(x, y).terrain == Terrain::Room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_geometry() {
        let room = Room::new(10, 5, 14, 7, true);
        assert_eq!(room.width(), 5);
        assert_eq!(room.height(), 3);
        assert!(room.contains(10, 7));
        assert!(!room.contains(15, 7));
        assert_eq!(room.footprint(), Rect::new(9, 4, 15, 8));
    }

    #[test]
    fn test_somexy_plain_room_uses_two_draws() {
        let mut level = Level::new(1, 1);
        level.carve_room(Room::new(10, 5, 14, 7, true), None);
        let mut rng = Isaac64::new(7);
        for _ in 0..50 {
            let (x, y) = level.somexy(&mut rng, RoomId::Room(0)).unwrap();
            assert!((10..=14).contains(&x) && (5..=7).contains(&y));
        }
        assert_eq!(rng.call_count(), 100);
    }

    #[test]
    fn test_somexy_avoids_subroom() {
        let mut level = Level::new(1, 1);
        level.carve_room(Room::new(10, 5, 20, 12, true), None);
        level.carve_room(Room::new(12, 7, 18, 10, true), Some(RoomId::Room(0)));
        let mut rng = Isaac64::new(11);
        for _ in 0..50 {
            let (x, y) = level.somexy(&mut rng, RoomId::Room(0)).unwrap();
            assert_eq!(level.cell(x, y).room, Some(RoomId::Room(0)));
            assert!(!level.cell(x, y).terrain.is_wall());
        }
    }

    #[test]
    fn test_lighting_resolution() {
        let mut rng = Isaac64::new(1);
        assert!(Lighting::Lit.resolve(&mut rng, 5));
        assert!(!Lighting::Unlit.resolve(&mut rng, 5));
        assert_eq!(rng.call_count(), 0);
        Lighting::Random.resolve(&mut rng, 1);
        assert!(rng.call_count() >= 1);
    }

    #[test]
    fn test_deep_levels_are_dark() {
        // rnd(1 + depth) < 11 almost never holds this deep
        let mut rng = Isaac64::new(3);
        let lit = (0..200).filter(|_| Lighting::Random.resolve(&mut rng, 60)).count();
        assert!(lit < 60, "{} of 200 rooms lit at depth 60", lit);
    }
}
