//! RNG module - story seeds
//!
//! The moose's story generator is reseeded every time the story is reset.
//! Seeds come from a fixed list drawn once at start-up, so a run is fully
//! reproducible from the game seed.
//!
//! [`SimpleRng`] also drives the offline story generator.

use tui_bear_types::{STORY_SEED_COUNT, STORY_SEED_MAX};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Low LCG bits cycle quickly; take the high half.
        (self.next_u32() >> 16) % max
    }

    /// Pick an element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.next_range(items.len() as u32) as usize;
        items.get(i)
    }
}

/// Pool of story seeds, drawn once per game.
#[derive(Debug, Clone)]
pub struct SeedList {
    seeds: [u32; STORY_SEED_COUNT],
    current: u32,
    rng: SimpleRng,
}

impl SeedList {
    /// Draw the pool from `seed`. The first entry is the initial current seed.
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let mut seeds = [0u32; STORY_SEED_COUNT];
        for s in seeds.iter_mut() {
            *s = rng.next_range(STORY_SEED_MAX + 1);
        }
        Self {
            current: seeds[0],
            seeds,
            rng,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Replace the current seed with a random entry from the pool.
    pub fn reseed(&mut self) -> u32 {
        if let Some(&s) = self.rng.choose(&self.seeds) {
            self.current = s;
        }
        self.current
    }
}
