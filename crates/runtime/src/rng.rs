//! Deterministic PRNG hook for the embedding layer (spec §6.1).
//!
//! `game-core` itself never draws randomness — every tick is a pure function
//! of the current [`game_core::World`] and the action batch. This PCG-XSH-RR
//! generator is plumbed through [`crate::Environment`] so a future core
//! extension (e.g. randomized combat variance) has a documented place to draw
//! from; nothing currently calls [`PcgRng::next_u32`]. That's a deliberate,
//! documented no-op hook, not unused dead code.

/// PCG random number generator (Permuted Congruential Generator), PCG-XSH-RR
/// variant: 64 bits of state, 32 bits of output, single multiply + xorshift +
/// rotate. Deterministic: the same seed always produces the same output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state.wrapping_mul(Self::MULTIPLIER).wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Generates a random `u32` from `seed`. Does not mutate `self`; callers
    /// derive a fresh seed per draw via [`seed_for_step`].
    pub fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives a per-tick seed from the episode seed and the current step, so a
/// future caller of [`PcgRng::next_u32`] gets an independent stream per tick
/// without storing any generator state on [`crate::Environment`].
pub fn seed_for_step(episode_seed: u64, step: u64) -> u64 {
    let mut hash = episode_seed;
    hash ^= step.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_always_produces_the_same_output() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
    }

    #[test]
    fn different_steps_derive_different_seeds() {
        assert_ne!(seed_for_step(1, 0), seed_for_step(1, 1));
    }
}
