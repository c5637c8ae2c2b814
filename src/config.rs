//! Settings of the generators. They can be written in code or loaded from JSON files
//! (comments allowed) like
//! ```json
//! {
//!     "start-symbol": "<start>",
//!     "min-nonterminals": 3,
//!     "max-nonterminals": 20,
//!     "seed": 1234
//! }
//! ```

use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{GenerationError, MutationError, ParsingError},
    grammar::START_SYMBOL,
    parser::json::read_json,
};

/// Settings of the [`GrammarFuzzer`](crate::generator::GrammarFuzzer).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Where generation starts
    pub start_symbol: String,
    /// Grow the tree at maximum cost until it has this many open non-terminals
    pub min_nonterminals: usize,
    /// Expand randomly while the tree has fewer open non-terminals than this
    pub max_nonterminals: usize,
    /// Compute all symbol and expansion costs once at construction
    pub precompute_costs: bool,
    /// Memoize the conversion of expansions into tree nodes
    pub cache_expansions: bool,
    /// Seed for the random number generator. Taken from the OS if absent.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_symbol: START_SYMBOL.to_string(),
            min_nonterminals: 0,
            max_nonterminals: 10,
            precompute_costs: false,
            cache_expansions: false,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load the config from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        load_json(path.as_ref())
    }

    /// Check that the bounds are consistent.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.min_nonterminals > self.max_nonterminals {
            return Err(GenerationError::InvalidBounds {
                min: self.min_nonterminals,
                max: self.max_nonterminals,
            });
        }

        Ok(())
    }
}

/// Settings of the [`MutationFuzzer`](crate::mutation::MutationFuzzer).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct MutationConfig {
    /// Fewest mutations applied to one candidate
    pub min_mutations: usize,
    /// Most mutations applied to one candidate
    pub max_mutations: usize,
    /// Seed for the random number generator. Taken from the OS if absent.
    pub seed: Option<u64>,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            min_mutations: 2,
            max_mutations: 10,
            seed: None,
        }
    }
}

impl MutationConfig {
    /// Load the config from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        load_json(path.as_ref())
    }

    /// Check that the bounds are consistent.
    pub fn validate(&self) -> Result<(), MutationError> {
        if self.min_mutations > self.max_mutations {
            return Err(MutationError::InvalidBounds {
                min: self.min_mutations,
                max: self.max_mutations,
            });
        }

        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ParsingError> {
    let value = read_json(path)?;
    serde_json::from_value(value).map_err(|e| ParsingError::new(path, format!("Invalid config: {}", e)))
}

/// The random number generator for one engine instance.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_generator_config() {
        let config = GeneratorConfig::load_from_file("test-data/configs/generator.json").unwrap();
        assert_eq!(config.start_symbol, "<start>");
        assert_eq!(config.min_nonterminals, 3);
        assert_eq!(config.max_nonterminals, 20);
        assert!(config.precompute_costs);
        assert!(!config.cache_expansions);
        assert_eq!(config.seed, Some(1234));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_mutation_config_defaults() {
        let config = MutationConfig::load_from_file("test-data/configs/mutation.json").unwrap();
        assert_eq!(config.min_mutations, 2);
        assert_eq!(config.max_mutations, 4);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_unknown_fields() {
        assert!(GeneratorConfig::load_from_file("test-data/configs/unknown-field.json").is_err());
    }

    #[test]
    fn test_bounds() {
        let config = GeneratorConfig {
            min_nonterminals: 5,
            max_nonterminals: 1,
            ..GeneratorConfig::default()
        };
        assert_eq!(config.validate(), Err(GenerationError::InvalidBounds { min: 5, max: 1 }));

        let config = MutationConfig {
            min_mutations: 3,
            max_mutations: 2,
            seed: None,
        };
        assert_eq!(config.validate(), Err(MutationError::InvalidBounds { min: 3, max: 2 }));
    }
}
