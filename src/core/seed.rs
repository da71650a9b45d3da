//! Match seeds and the deterministic RNG derived from them.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Length of generated seeds.
pub const SEED_LEN: usize = 12;

/// Generates a fresh alphanumeric seed from the operating system's entropy
/// source, independent of any game logic.
#[instrument]
pub fn generate_seed() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SEED_LEN)
        .map(char::from)
        .collect()
}

/// Builds a reproducible RNG from a seed string.
///
/// The same seed always yields the same sequence on every platform.
#[instrument]
pub fn seeded_rng(seed: &str) -> ChaCha8Rng {
    let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
    ChaCha8Rng::from_seed(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_seed_is_alphanumeric() {
        let seed = generate_seed();
        assert_eq!(seed.len(), SEED_LEN);
        assert!(seed.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_seeds_differ() {
        assert_ne!(generate_seed(), generate_seed());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: Vec<u32> = seeded_rng("abc").sample_iter(rand::distributions::Standard).take(8).collect();
        let b: Vec<u32> = seeded_rng("abc").sample_iter(rand::distributions::Standard).take(8).collect();
        let c: Vec<u32> = seeded_rng("abd").sample_iter(rand::distributions::Standard).take(8).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
