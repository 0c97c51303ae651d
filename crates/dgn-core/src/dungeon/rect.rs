//! Rectangle pool for room placement (rect.c)
//!
//! Tracks the free space left on the level as a list of disjoint
//! rectangles. Carving a room splits every rectangle it touches into
//! smaller residual rectangles around the carved footprint.

use dgn_rng::Isaac64;
use serde::{Deserialize, Serialize};

use crate::consts::{COLNO, MAXRECT, ROWNO, XLIM, YLIM};

/// An axis-aligned rectangle, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub lx: i32,
    pub ly: i32,
    pub hx: i32,
    pub hy: i32,
}

impl Rect {
    pub const fn new(lx: i32, ly: i32, hx: i32, hy: i32) -> Self {
        Self { lx, ly, hx, hy }
    }

    /// The whole map
    pub const fn full() -> Self {
        Self::new(0, 0, COLNO - 1, ROWNO - 1)
    }

    pub const fn width(&self) -> i32 {
        if self.hx >= self.lx {
            self.hx - self.lx + 1
        } else {
            0
        }
    }

    pub const fn height(&self) -> i32 {
        if self.hy >= self.ly {
            self.hy - self.ly + 1
        } else {
            0
        }
    }

    pub const fn area(&self) -> i32 {
        self.width() * self.height()
    }

    pub const fn is_valid(&self) -> bool {
        self.hx >= self.lx && self.hy >= self.ly
    }

    pub const fn contains(&self, other: &Rect) -> bool {
        self.lx <= other.lx && self.hx >= other.hx && self.ly <= other.ly && self.hy >= other.hy
    }

    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.lx && x <= self.hx && y >= self.ly && y <= self.hy
    }

    pub const fn intersects(&self, other: &Rect) -> bool {
        !(self.hx < other.lx || self.lx > other.hx || self.hy < other.ly || self.ly > other.hy)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            lx: self.lx.max(other.lx),
            ly: self.ly.max(other.ly),
            hx: self.hx.min(other.hx),
            hy: self.hy.min(other.hy),
        })
    }

    /// Grow by `n` cells on every side
    pub const fn expand(&self, n: i32) -> Rect {
        Rect::new(self.lx - n, self.ly - n, self.hx + n, self.hy + n)
    }

    /// Free space left over when `hit` (a sub-rectangle of `self`) is carved.
    ///
    /// Strips above and below span the full width; strips left and right
    /// span only the rows between them, so the residuals never overlap.
    /// Each strip keeps one cell of separation from `hit` and is kept only
    /// when it is deep enough to hold a room plus margins.
    fn residuals(&self, hit: &Rect) -> Vec<Rect> {
        let mut out = Vec::with_capacity(4);
        let top_limit = if self.hy < ROWNO - 1 { 2 * YLIM } else { YLIM + 1 } + 4;
        let left_limit = if self.hx < COLNO - 1 { 2 * XLIM } else { XLIM + 1 } + 4;
        let bottom_limit = if self.ly > 0 { 2 * YLIM } else { YLIM + 1 } + 4;
        let right_limit = if self.lx > 0 { 2 * XLIM } else { XLIM + 1 } + 4;

        let has_top = hit.ly - self.ly - 1 > top_limit;
        let has_bottom = self.hy - hit.hy - 1 > bottom_limit;
        let mid_ly = if has_top { hit.ly - 1 } else { self.ly };
        let mid_hy = if has_bottom { hit.hy + 1 } else { self.hy };

        if has_top {
            out.push(Rect::new(self.lx, self.ly, self.hx, hit.ly - 2));
        }
        if hit.lx - self.lx - 1 > left_limit {
            out.push(Rect::new(self.lx, mid_ly, hit.lx - 2, mid_hy));
        }
        if has_bottom {
            out.push(Rect::new(self.lx, hit.hy + 2, self.hx, self.hy));
        }
        if self.hx - hit.hx - 1 > right_limit {
            out.push(Rect::new(hit.hx + 2, mid_ly, self.hx, mid_hy));
        }
        out
    }
}

/// The set of free rectangles available for new rooms
#[derive(Debug, Clone)]
pub struct RectPool {
    rects: Vec<Rect>,
}

impl Default for RectPool {
    fn default() -> Self {
        Self::new()
    }
}

impl RectPool {
    /// A pool holding the whole map
    pub fn new() -> Self {
        let mut pool = Self {
            rects: Vec::with_capacity(MAXRECT),
        };
        pool.init(Rect::full());
        pool
    }

    /// Reset to a single rectangle
    pub fn init(&mut self, area: Rect) {
        self.rects.clear();
        if area.is_valid() {
            self.rects.push(area);
        }
    }

    /// Pick a rectangle uniformly; `None` means no space is left.
    pub fn pick(&self, rng: &mut Isaac64) -> Option<Rect> {
        if self.rects.is_empty() {
            return None;
        }
        let idx = rng.rn2(self.rects.len() as i32) as usize;
        Some(self.rects[idx])
    }

    /// Index of the first rectangle containing `target`
    pub fn find_containing(&self, target: &Rect) -> Option<usize> {
        self.rects.iter().position(|r| r.contains(target))
    }

    /// Add a rectangle unless an existing one already contains it.
    pub fn add(&mut self, r: Rect) {
        if self.find_containing(&r).is_some() {
            return;
        }
        if self.rects.len() >= MAXRECT {
            tracing::warn!(?r, "rectangle pool full, dropping free space");
            return;
        }
        self.rects.push(r);
    }

    /// Remove the rectangle at `idx`; the last one takes its slot.
    pub fn remove(&mut self, idx: usize) -> Rect {
        self.rects.swap_remove(idx)
    }

    /// Carve `footprint` out of the pool.
    ///
    /// Every rectangle touching the footprint is removed and replaced by its
    /// residual strips. Walks from the back so the swap-in from `remove`
    /// only ever brings in rectangles that were already visited.
    pub fn split(&mut self, footprint: &Rect) {
        let mut i = self.rects.len();
        while i > 0 {
            i -= 1;
            if i >= self.rects.len() {
                continue;
            }
            if let Some(hit) = self.rects[i].intersection(footprint) {
                let old = self.remove(i);
                for r in old.residuals(&hit) {
                    self.add(r);
                }
            }
        }
        tracing::trace!(?footprint, remaining = self.rects.len(), "split rectangle pool");
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10, 20, 15, 25);
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 6);
        assert_eq!(r.area(), 36);
        assert_eq!(Rect::new(5, 5, 4, 4).width(), 0);
    }

    #[test]
    fn test_rect_contains() {
        let outer = Rect::new(0, 0, 20, 20);
        let inner = Rect::new(5, 5, 10, 10);
        let outside = Rect::new(25, 25, 30, 30);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outside));
    }

    #[test]
    fn test_rect_intersection() {
        let r1 = Rect::new(0, 0, 10, 10);
        let r2 = Rect::new(5, 5, 15, 15);
        let r3 = Rect::new(20, 20, 30, 30);

        assert_eq!(r1.intersection(&r2), Some(Rect::new(5, 5, 10, 10)));
        assert!(r1.intersection(&r3).is_none());
    }

    #[test]
    fn test_pool_starts_with_full_map() {
        let pool = RectPool::new();
        assert_eq!(pool.rects(), &[Rect::full()]);
    }

    #[test]
    fn test_pick_on_empty_pool() {
        let mut pool = RectPool::new();
        pool.remove(0);
        let mut rng = Isaac64::new(1);
        assert!(pool.pick(&mut rng).is_none());
        assert_eq!(rng.call_count(), 0);
    }

    #[test]
    fn test_split_middle_room() {
        let mut pool = RectPool::new();
        let carved = Rect::new(30, 6, 42, 12);
        pool.split(&carved);

        // left and right strips only; the 5 rows above are too shallow
        assert_eq!(pool.len(), 3);
        for r in pool.rects() {
            assert!(!r.intersects(&carved.expand(1)), "{:?} touches the carved area", r);
        }
        for (i, a) in pool.rects().iter().enumerate() {
            for b in &pool.rects()[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_split_touches_every_intersecting_rect() {
        let mut pool = RectPool::new();
        pool.init(Rect::new(0, 0, 39, 20));
        pool.add(Rect::new(41, 0, 79, 20));
        // straddles both rectangles
        pool.split(&Rect::new(36, 8, 46, 12));
        for r in pool.rects() {
            assert!(r.hx < 35 || r.lx > 47 || r.hy < 7 || r.ly > 13, "{:?}", r);
        }
    }

    #[test]
    fn test_add_skips_contained() {
        let mut pool = RectPool::new();
        pool.add(Rect::new(10, 5, 20, 10));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pool_capacity() {
        let mut pool = RectPool::new();
        pool.init(Rect::new(0, 0, 0, 0));
        for i in 1..(MAXRECT as i32 + 10) {
            pool.add(Rect::new(i, 0, i, 0));
        }
        assert_eq!(pool.len(), MAXRECT);
    }
}
