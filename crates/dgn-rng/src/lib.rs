//! ISAAC64 random number engine.
//!
//! Port of the ISAAC64 generator used by NetHack 3.6/3.7, together with the
//! `rnd.c` helper family (`rn2`, `rnd`, `rn1`, `d`, `rnl`, `rne`, `rnz`).
//! Every helper is built on a single primitive, `RND(x) = next_u64() % x`,
//! so two engines seeded alike consume identical raw values in identical
//! order. An optional call log records one entry per primitive draw.

mod log;

pub use log::{RngCall, RngFunc, format_text_log, parse_jsonl_log, write_jsonl_log};

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Size of the ISAAC64 state arrays (2^8 = 256)
const ISAAC64_SZ_LOG: usize = 8;
const ISAAC64_SZ: usize = 1 << ISAAC64_SZ_LOG;

/// ISAAC64 random number generator context
#[derive(Clone, Serialize, Deserialize)]
pub struct Isaac64 {
    /// Results buffer - random values to be consumed
    r: Vec<u64>,
    /// Memory state
    m: Vec<u64>,
    /// Accumulator
    a: u64,
    /// Previous result
    b: u64,
    /// Counter
    c: u64,
    /// Number of results remaining (counts down from 256)
    n: usize,
    /// Total number of u64 values consumed
    call_count: u64,
    /// If true, record every primitive draw into `log`
    #[serde(skip)]
    logging: bool,
    /// Source tag attached to new log entries
    #[serde(skip)]
    site: Option<Cow<'static, str>>,
    #[serde(skip)]
    log: Vec<RngCall>,
}

impl core::fmt::Debug for Isaac64 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Isaac64")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("c", &self.c)
            .field("n", &self.n)
            .field("call_count", &self.call_count)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Isaac64 {
    /// Create a new engine seeded with a u64 value.
    ///
    /// The seed is fed to ISAAC64 as its 8 little-endian bytes, the same way
    /// NetHack's `init_isaac64` does with an `unsigned long`.
    pub fn new(seed: u64) -> Self {
        let mut ctx = Self {
            r: vec![0; ISAAC64_SZ],
            m: vec![0; ISAAC64_SZ],
            a: 0,
            b: 0,
            c: 0,
            n: 0,
            call_count: 0,
            logging: false,
            site: None,
            log: Vec::new(),
        };
        ctx.init(&seed.to_le_bytes());
        ctx
    }

    /// Reset the engine to the state `Isaac64::new(seed)` would have.
    ///
    /// The logging flag survives; the log itself and the call counter are
    /// cleared.
    pub fn reset(&mut self, seed: u64) {
        self.m.iter_mut().for_each(|v| *v = 0);
        self.call_count = 0;
        self.site = None;
        self.log.clear();
        self.init(&seed.to_le_bytes());
    }

    /// Initialize with seed bytes (matches isaac64_init)
    fn init(&mut self, seed: &[u8]) {
        self.a = 0;
        self.b = 0;
        self.c = 0;
        self.r.iter_mut().for_each(|v| *v = 0);
        self.reseed(seed);
    }

    /// Mix seed bytes into state (matches isaac64_reseed)
    fn reseed(&mut self, seed: &[u8]) {
        let nseed = seed.len().min(ISAAC64_SZ * 8);

        // XOR seed bytes into r[] as little-endian u64s; a trailing partial
        // word is zero-extended.
        for (i, chunk) in seed[..nseed].chunks(8).enumerate() {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.r[i] ^= u64::from_le_bytes(word);
        }

        // Initialize with the golden ratio
        let mut x = [0x9E37_79B9_7F4A_7C13u64; 8];
        for _ in 0..4 {
            Self::mix(&mut x);
        }

        for i in (0..ISAAC64_SZ).step_by(8) {
            for j in 0..8 {
                x[j] = x[j].wrapping_add(self.r[i + j]);
            }
            Self::mix(&mut x);
            self.m[i..i + 8].copy_from_slice(&x);
        }

        // Second pass
        for i in (0..ISAAC64_SZ).step_by(8) {
            for j in 0..8 {
                x[j] = x[j].wrapping_add(self.m[i + j]);
            }
            Self::mix(&mut x);
            self.m[i..i + 8].copy_from_slice(&x);
        }

        self.update();
    }

    /// Mix function (matches isaac64_mix)
    fn mix(x: &mut [u64; 8]) {
        const SHIFT: [u32; 8] = [9, 9, 23, 15, 14, 20, 17, 14];

        for i in (0..8).step_by(2) {
            x[i] = x[i].wrapping_sub(x[(i + 4) & 7]);
            x[(i + 5) & 7] ^= x[(i + 7) & 7] >> SHIFT[i];
            x[(i + 7) & 7] = x[(i + 7) & 7].wrapping_add(x[i]);

            let i = i + 1;
            x[i] = x[i].wrapping_sub(x[(i + 4) & 7]);
            x[(i + 5) & 7] ^= x[(i + 7) & 7] << SHIFT[i];
            x[(i + 7) & 7] = x[(i + 7) & 7].wrapping_add(x[i]);
        }
    }

    /// Bits 3..3+ISAAC64_SZ_LOG, used as a state index
    #[inline]
    fn lower_bits(x: u64) -> usize {
        ((x & (((ISAAC64_SZ - 1) as u64) << 3)) >> 3) as usize
    }

    /// Bits ISAAC64_SZ_LOG+3..2*ISAAC64_SZ_LOG+3
    #[inline]
    fn upper_bits(y: u64) -> usize {
        ((y >> (ISAAC64_SZ_LOG + 3)) & ((ISAAC64_SZ - 1) as u64)) as usize
    }

    /// One ISAAC64 round step. `shuffle` is the per-lane accumulator twist,
    /// `partner` the index of the opposite half of `m`.
    #[inline]
    fn step(&mut self, i: usize, partner: usize, a: &mut u64, b: &mut u64, shuffle: impl Fn(u64) -> u64) {
        let x = self.m[i];
        *a = shuffle(*a).wrapping_add(self.m[partner]);
        let y = self.m[Self::lower_bits(x)].wrapping_add(*a).wrapping_add(*b);
        self.m[i] = y;
        *b = self.m[Self::upper_bits(y)].wrapping_add(x);
        self.r[i] = *b;
    }

    /// Generate 256 new random values (matches isaac64_update)
    fn update(&mut self) {
        const HALF: usize = ISAAC64_SZ / 2;
        let mut a = self.a;
        self.c = self.c.wrapping_add(1);
        let mut b = self.b.wrapping_add(self.c);

        for i in (0..ISAAC64_SZ).step_by(4) {
            let p = if i < HALF { i + HALF } else { i - HALF };
            self.step(i, p, &mut a, &mut b, |a| !a ^ (a << 21));
            self.step(i + 1, p + 1, &mut a, &mut b, |a| a ^ (a >> 5));
            self.step(i + 2, p + 2, &mut a, &mut b, |a| a ^ (a << 12));
            self.step(i + 3, p + 3, &mut a, &mut b, |a| a ^ (a >> 33));
        }

        self.b = b;
        self.a = a;
        self.n = ISAAC64_SZ;
    }

    /// Next raw 64-bit value (matches isaac64_next_uint64). Not logged.
    #[inline]
    fn next_raw(&mut self) -> u64 {
        if self.n == 0 {
            self.update();
        }
        self.n -= 1;
        self.call_count += 1;
        self.r[self.n]
    }

    fn record(&mut self, func: RngFunc, args: &[i32], result: u64, raw: u64) {
        if !self.logging {
            return;
        }
        self.log.push(RngCall {
            seq: self.call_count - 1,
            func,
            args: args.to_vec(),
            result,
            raw,
            site: self.site.clone(),
        });
    }

    /// `RND(x)`: one raw draw reduced modulo `x`, logged under `func`.
    ///
    /// Non-positive moduli are a caller bug. Debug builds stop here; release
    /// builds still consume one raw value so the stream stays aligned with
    /// the call count, and yield 0.
    fn primitive(&mut self, func: RngFunc, x: i32, args: &[i32], offset: i32) -> i32 {
        debug_assert!(x > 0, "{}({:?}) called with non-positive modulus", func, args);
        let raw = self.next_raw();
        let res = if x > 0 {
            (raw % x as u64) as i32
        } else {
            tracing::error!(%func, ?args, "non-positive RNG modulus, returning lower bound");
            0
        };
        let value = res + offset;
        self.record(func, args, value as u64, raw);
        value
    }

    /// Returns a random value in `[0, x)` - matches `rn2(x)`
    #[inline]
    pub fn rn2(&mut self, x: i32) -> i32 {
        self.primitive(RngFunc::Rn2, x, &[x], 0)
    }

    /// Returns a random value in `[1, x]` - matches `rnd(x)`
    #[inline]
    pub fn rnd(&mut self, x: i32) -> i32 {
        self.primitive(RngFunc::Rnd, x, &[x], 1)
    }

    /// Returns a random value in `[base, base + width)` - matches `rn1(x, y)`
    #[inline]
    pub fn rn1(&mut self, width: i32, base: i32) -> i32 {
        self.primitive(RngFunc::Rn1, width, &[width, base], base)
    }

    /// Roll `n` dice of `x` sides - matches `d(n, x)`
    ///
    /// Each die is a separate primitive draw and a separate log entry.
    pub fn d(&mut self, n: i32, x: i32) -> i32 {
        let mut total = 0;
        for _ in 0..n.max(0) {
            total += self.primitive(RngFunc::Dice, x, &[n, x], 1);
        }
        total
    }

    /// True with probability `pct` percent (`rn2(100) < pct`)
    pub fn percent(&mut self, pct: i32) -> bool {
        self.rn2(100) < pct
    }

    /// Luck-adjusted random - matches `rnl(x)` from rnd.c
    pub fn rnl(&mut self, x: i32, luck: i32) -> i32 {
        let adjustment = if x <= 15 {
            (luck.abs() + 1) / 3 * luck.signum()
        } else {
            luck
        };
        let mut i = self.primitive(RngFunc::Rnl, x, &[x, luck], 0);
        if adjustment != 0 && self.rn2(37 + adjustment.abs()) != 0 {
            i = (i - adjustment).clamp(0, (x - 1).max(0));
        }
        i
    }

    /// Geometric roll - matches `rne(x)` from rnd.c
    ///
    /// `level` plays the role of the hero's experience level, which caps the
    /// result at 5 below level 15.
    pub fn rne(&mut self, x: i32, level: i32) -> i32 {
        let cap = if level < 15 { 5 } else { level / 3 };
        let mut tmp = 1;
        while tmp < cap && self.rn2(x) == 0 {
            tmp += 1;
        }
        tmp
    }

    /// Biased large-range roll - matches `rnz(i)` from rnd.c
    pub fn rnz(&mut self, i: i32, level: i32) -> i32 {
        let mut x = i as i64;
        let mut tmp = 1000i64;
        tmp += self.rn2(1000) as i64;
        tmp *= self.rne(4, level) as i64;
        if self.rn2(2) != 0 {
            x = x * tmp / 1000;
        } else {
            x = x * 1000 / tmp;
        }
        x as i32
    }

    /// Shuffle a slice in place, Fisher-Yates from the back with `rn2(i + 1)`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as i32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Tag subsequent log entries with a source site.
    pub fn set_site(&mut self, site: &'static str) {
        self.site = Some(Cow::Borrowed(site));
    }

    /// Drop the current source tag.
    pub fn clear_site(&mut self) {
        self.site = None;
    }

    /// Start recording primitive draws. Clears any previous log.
    pub fn enable_logging(&mut self) {
        self.logging = true;
        self.log.clear();
    }

    /// Stop recording. The existing log is kept.
    pub fn disable_logging(&mut self) {
        self.logging = false;
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    /// Borrow the current log.
    pub fn log(&self) -> &[RngCall] {
        &self.log
    }

    /// Hand the log to the caller, leaving an empty one behind.
    pub fn take_log(&mut self) -> Vec<RngCall> {
        std::mem::take(&mut self.log)
    }

    /// Total number of raw u64 values consumed
    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}

impl Default for Isaac64 {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Lets `rand`-based collaborator code draw from the same stream. These
/// draws are logged as `raw`.
impl rand::RngCore for Isaac64 {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let raw = self.next_raw();
        self.record(RngFunc::Raw, &[], raw, raw);
        raw
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = rand::RngCore::next_u64(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_reference_raw_values() {
        // First outputs of NetHack's isaac64 for these seeds.
        let mut rng = Isaac64::new(0);
        assert_eq!(RngCore::next_u64(&mut rng), 0x9d39_247e_3377_6d41);
        assert_eq!(RngCore::next_u64(&mut rng), 0x2af7_3980_05aa_a5c7);

        let mut rng = Isaac64::new(42);
        let raws: Vec<u64> = (0..5).map(|_| RngCore::next_u64(&mut rng)).collect();
        assert_eq!(
            raws,
            vec![
                0xbbd6_1fa5_105a_596a,
                0x9b3c_c89c_4acb_57ba,
                0xf246_9ccf_a2bc_2790,
                0xc84d_04a4_0816_0c5d,
                0x6ef7_a3bd_4b47_bd78,
            ]
        );
    }

    #[test]
    fn test_rn2_is_modulo_of_raw() {
        let mut a = Isaac64::new(163);
        let mut b = Isaac64::new(163);
        for n in [1, 2, 7, 77, 1000, 1036] {
            let raw = RngCore::next_u64(&mut b);
            assert_eq!(a.rn2(n) as u64, raw % n as u64);
        }
    }

    #[test]
    fn test_helpers_in_bounds() {
        let mut rng = Isaac64::new(7);
        for _ in 0..1000 {
            let v = rng.rn2(10);
            assert!((0..10).contains(&v));
            let v = rng.rnd(6);
            assert!((1..=6).contains(&v));
            let v = rng.rn1(6, 3);
            assert!((3..=8).contains(&v));
            let v = rng.d(3, 6);
            assert!((3..=18).contains(&v));
            let v = rng.rnl(20, 3);
            assert!((0..20).contains(&v));
        }
    }

    #[test]
    fn test_wraps_after_256_values() {
        let mut rng = Isaac64::new(1);
        for _ in 0..600 {
            rng.rn2(1000);
        }
        assert_eq!(rng.call_count(), 600);
    }

    #[test]
    fn test_reset_matches_new() {
        let mut rng = Isaac64::new(5);
        for _ in 0..300 {
            rng.rn2(50);
        }
        rng.reset(99);
        let mut fresh = Isaac64::new(99);
        for _ in 0..300 {
            assert_eq!(rng.rn2(1 << 20), fresh.rn2(1 << 20));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Isaac64::new(42);
        let mut items = [1, 2, 3, 4, 5, 6, 7];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7]);
        // n - 1 draws for n items
        assert_eq!(rng.call_count(), 6);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_rn2_zero_is_fatal_in_debug() {
        let mut rng = Isaac64::new(1);
        rng.rn2(0);
    }
}
