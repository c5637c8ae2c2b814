//! Create inputs by applying small random edits to known inputs.
//!
//! All mutators operate on characters, never on bytes, so every mutant is a valid string.

use rand::{rngs::StdRng, seq::IndexedRandom, Rng};

use crate::{
    config::{make_rng, MutationConfig},
    error::{Error, MutationError},
    fuzzer::Fuzzer,
};

/// Remove one random character. The empty string stays empty.
pub fn delete_random_character<R: Rng + ?Sized>(s: &str, rng: &mut R) -> String {
    let mut chars = s.chars().collect::<Vec<_>>();

    if chars.is_empty() {
        return String::new();
    }

    let pos = rng.random_range(0..chars.len());
    chars.remove(pos);
    chars.into_iter().collect()
}

/// Insert a printable ASCII character (32..127) at a random position, which may be the end.
pub fn insert_random_character<R: Rng + ?Sized>(s: &str, rng: &mut R) -> String {
    let mut chars = s.chars().collect::<Vec<_>>();
    let pos = rng.random_range(0..=chars.len());
    let c = char::from(rng.random_range(32u8..127u8));
    chars.insert(pos, c);
    chars.into_iter().collect()
}

/// Flip one of the low seven bits of a random character. The empty string stays empty.
pub fn flip_random_character<R: Rng + ?Sized>(s: &str, rng: &mut R) -> String {
    let mut chars = s.chars().collect::<Vec<_>>();

    if chars.is_empty() {
        return String::new();
    }

    let pos = rng.random_range(0..chars.len());
    let bit = 1u32 << rng.random_range(0..=6);
    let c = chars[pos];
    // Flipping can land in the surrogate range
    chars[pos] = char::from_u32(c as u32 ^ bit).unwrap_or(c);
    chars.into_iter().collect()
}

/// Apply one uniformly chosen mutator to `s`.
pub fn mutate<R: Rng + ?Sized>(s: &str, rng: &mut R) -> String {
    match rng.random_range(0..3) {
        0 => delete_random_character(s, rng),
        1 => insert_random_character(s, rng),
        _ => flip_random_character(s, rng),
    }
}

/// Returns the seeds first, then mutants of them.
///
/// ```
/// use treefuzz::{config::MutationConfig, fuzzer::Fuzzer, mutation::MutationFuzzer};
///
/// let mut fuzzer = MutationFuzzer::new(vec!["http://www.google.com/search?q=fuzzing".to_string()], &MutationConfig::default()).unwrap();
/// assert_eq!(fuzzer.fuzz().unwrap(), "http://www.google.com/search?q=fuzzing");
/// let _mutant = fuzzer.fuzz().unwrap();
/// ```
#[derive(Debug)]
pub struct MutationFuzzer {
    seeds: Vec<String>,
    seed_index: usize,
    min_mutations: usize,
    max_mutations: usize,
    rng: StdRng,
}

impl MutationFuzzer {
    /// Mutate `seeds` with the bounds and seed of `config`.
    pub fn new(seeds: Vec<String>, config: &MutationConfig) -> Result<Self, MutationError> {
        config.validate()?;

        if seeds.is_empty() {
            return Err(MutationError::EmptySeedPool);
        }

        Ok(Self {
            seeds,
            seed_index: 0,
            min_mutations: config.min_mutations,
            max_mutations: config.max_mutations,
            rng: make_rng(config.seed),
        })
    }

    /// The seed inputs.
    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    /// Start over with returning the seeds.
    pub fn reset(&mut self) {
        self.seed_index = 0;
    }

    /// Draw how many mutations the next candidate gets, in `min_mutations..=max_mutations`.
    pub fn mutation_count(&mut self) -> usize {
        self.rng.random_range(self.min_mutations..=self.max_mutations)
    }

    /// Mutate a random seed [`mutation_count`](Self::mutation_count) times.
    pub fn create_candidate(&mut self) -> String {
        let mut candidate = self.seeds.choose(&mut self.rng).cloned().unwrap_or_default();
        let trials = self.mutation_count();

        for _ in 0..trials {
            candidate = mutate(&candidate, &mut self.rng);
        }

        log::trace!("Candidate after {} mutations: {:?}", trials, candidate);

        candidate
    }

    /// The next seed, or a new candidate once all seeds have been returned.
    pub fn next_input(&mut self) -> String {
        if let Some(seed) = self.seeds.get(self.seed_index) {
            self.seed_index += 1;
            return seed.clone();
        }

        self.create_candidate()
    }
}

impl Fuzzer for MutationFuzzer {
    fn fuzz(&mut self) -> Result<String, Error> {
        Ok(self.next_input())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_delete() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(delete_random_character("", &mut rng), "");

        for _ in 0..20 {
            let mutant = delete_random_character("abc", &mut rng);
            assert!(["bc", "ac", "ab"].contains(&mutant.as_str()), "{}", mutant);
        }
    }

    #[test]
    fn test_insert() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(insert_random_character("", &mut rng).chars().count(), 1);

        for _ in 0..20 {
            let mutant = insert_random_character("äb", &mut rng);
            assert_eq!(mutant.chars().count(), 3);
            assert_eq!(mutant.chars().filter(|c| (' '..='~').contains(c)).count(), 2);
        }
    }

    #[test]
    fn test_flip() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(flip_random_character("", &mut rng), "");

        for _ in 0..20 {
            let mutant = flip_random_character("A", &mut rng);
            let diff = mutant.chars().next().unwrap() as u32 ^ 'A' as u32;
            assert_eq!(diff.count_ones(), 1);
            assert!(diff < 1 << 7);
        }
    }

    #[test]
    fn test_mutate_changes_length_by_at_most_one() {
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let mutant = mutate("A quick brown fox", &mut rng);
            assert!(mutant.chars().count().abs_diff(17) <= 1);
        }
    }

    #[test]
    fn test_seeds_come_first() {
        let seeds = vec!["one".to_string(), "two".to_string()];
        let config = MutationConfig {
            seed: Some(3),
            ..MutationConfig::default()
        };
        let mut fuzzer = MutationFuzzer::new(seeds, &config).unwrap();

        assert_eq!(fuzzer.fuzz().unwrap(), "one");
        assert_eq!(fuzzer.fuzz().unwrap(), "two");

        for _ in 0..10 {
            let mutant = fuzzer.fuzz().unwrap();
            assert!(mutant.chars().count() <= 3 + 10);
        }

        fuzzer.reset();
        assert_eq!(fuzzer.fuzz().unwrap(), "one");
    }

    #[test]
    fn test_mutation_count() {
        let config = MutationConfig {
            min_mutations: 0,
            max_mutations: 0,
            seed: Some(0),
        };
        let mut fuzzer = MutationFuzzer::new(vec!["seed".to_string()], &config).unwrap();
        assert_eq!(fuzzer.create_candidate(), "seed");

        let config = MutationConfig {
            min_mutations: 2,
            max_mutations: 10,
            seed: Some(5),
        };
        let mut fuzzer = MutationFuzzer::new(vec!["seed".to_string()], &config).unwrap();
        let counts = (0..500).map(|_| fuzzer.mutation_count()).collect::<Vec<_>>();

        assert!(counts.iter().all(|count| (2..=10).contains(count)));
        assert!(counts.contains(&2));
        assert!(counts.contains(&10));

        // A candidate differs from its seed by at most one character per mutation
        for _ in 0..50 {
            let mutant = fuzzer.create_candidate();
            assert!(mutant.chars().count().abs_diff(4) <= 10);
        }
    }

    #[test]
    fn test_rejects_bad_setup() {
        assert_eq!(
            MutationFuzzer::new(Vec::new(), &MutationConfig::default()).unwrap_err(),
            MutationError::EmptySeedPool,
        );

        let config = MutationConfig {
            min_mutations: 5,
            max_mutations: 4,
            seed: None,
        };
        assert_eq!(
            MutationFuzzer::new(vec!["x".to_string()], &config).unwrap_err(),
            MutationError::InvalidBounds { min: 5, max: 4 },
        );
    }
}
