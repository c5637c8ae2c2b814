use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use rand::Rng;

use crate::{grammar::Expansion, tree::DerivationTree};

/// How the alternative for a non-terminal is picked during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpansionPolicy {
    /// Any alternative
    Random,
    /// Only alternatives tied for the lowest cost
    MinCost,
    /// Only alternatives tied for the highest cost
    MaxCost,
}

impl Display for ExpansionPolicy {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            ExpansionPolicy::Random => write!(f, "randomly"),
            ExpansionPolicy::MinCost => write!(f, "at minimum cost"),
            ExpansionPolicy::MaxCost => write!(f, "at maximum cost"),
        }
    }
}

/// The decisions a [`GrammarFuzzer`](super::GrammarFuzzer) delegates.
///
/// The default methods choose uniformly at random and leave the chosen
/// children untouched.
pub trait ExpansionStrategy {
    /// Option keys this strategy understands. Others are reported during validation.
    fn supported_opts(&self) -> HashSet<String> {
        HashSet::new()
    }

    /// Return the index into `possible_children` of the expansion to use for `symbol`.
    /// `possible_children` is never empty.
    fn choose_node_expansion<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        symbol: &str,
        possible_children: &[Vec<DerivationTree>],
    ) -> usize {
        let _ = symbol;
        rng.random_range(0..possible_children.len())
    }

    /// Return the index into `children` of the subtree to descend into.
    /// Every entry of `children` still has something to expand and the slice is never empty.
    fn choose_tree_expansion<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        symbol: &str,
        children: &[&DerivationTree],
    ) -> usize {
        let _ = symbol;
        rng.random_range(0..children.len())
    }

    /// Post-process the children chosen for `expansion`.
    fn process_chosen_children(&mut self, chosen_children: Vec<DerivationTree>, expansion: &Expansion) -> Vec<DerivationTree> {
        let _ = expansion;
        chosen_children
    }
}

/// Uniform random choices everywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomStrategy;

impl ExpansionStrategy for RandomStrategy {}
