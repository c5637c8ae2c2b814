//! Generate inputs by growing derivation trees.
//!
//! The [`GrammarFuzzer`] expands a tree in three phases:
//! 1. While the tree has fewer than `min_nonterminals` open non-terminals, alternatives
//!    with maximum cost are chosen. This makes the tree grow.
//! 2. While it has fewer than `max_nonterminals`, alternatives are chosen randomly.
//! 3. Finally, alternatives with minimum cost close all remaining non-terminals.
//!
//! The cost of an alternative is the number of expansion steps needed to fully terminate it.
//! Recursion back into a symbol that is already being expanded costs infinitely much.
//!
//! Use it like so:
//! ```
//! use treefuzz::{config::GeneratorConfig, fuzzer::Fuzzer, generator::GrammarFuzzer, grammar::builtin};
//!
//! let config = GeneratorConfig {
//!     min_nonterminals: 3,
//!     seed: Some(1),
//!     ..GeneratorConfig::default()
//! };
//! let mut fuzzer = GrammarFuzzer::new(builtin::expr_grammar(), &config).unwrap();
//! let input = fuzzer.fuzz().unwrap();
//! assert!(!input.contains('<'));
//! ```

mod children;
mod cost;
mod simple;
mod strategy;

pub use children::expansion_to_children;
pub use cost::{expansion_cost, symbol_cost, Cost, CostModel};
pub use simple::{simple_grammar_fuzzer, SimpleGrammarFuzzer, DEFAULT_MAX_EXPANSION_TRIALS};
pub use strategy::{ExpansionPolicy, ExpansionStrategy, RandomStrategy};

use itertools::Itertools;
use rand::rngs::StdRng;

use crate::{
    config::{make_rng, GeneratorConfig},
    error::{Error, GenerationError, GrammarError},
    fuzzer::Fuzzer,
    grammar::{validate, Grammar},
    tree::DerivationTree,
};
use children::ChildrenCache;

/// The derivation tree engine.
///
/// Decisions between equally good alternatives are delegated to an [`ExpansionStrategy`].
#[derive(Debug)]
pub struct GrammarFuzzer<S: ExpansionStrategy = RandomStrategy> {
    grammar: Grammar,
    start_symbol: String,
    min_nonterminals: usize,
    max_nonterminals: usize,
    costs: CostModel,
    children: ChildrenCache,
    strategy: S,
    rng: StdRng,
    derivation_tree: Option<DerivationTree>,
}

impl GrammarFuzzer<RandomStrategy> {
    /// Create a fuzzer that makes all choices uniformly at random.
    pub fn new(grammar: Grammar, config: &GeneratorConfig) -> Result<Self, Error> {
        Self::with_strategy(grammar, config, RandomStrategy)
    }
}

impl<S: ExpansionStrategy> GrammarFuzzer<S> {
    /// Create a fuzzer that consults `strategy`.
    ///
    /// The grammar must define the start symbol and be valid with respect to
    /// the options the strategy supports.
    pub fn with_strategy(grammar: Grammar, config: &GeneratorConfig, strategy: S) -> Result<Self, Error> {
        config.validate()?;

        if !grammar.contains(&config.start_symbol) {
            return Err(GrammarError::MissingStartSymbol(config.start_symbol.clone()).into());
        }

        let supported_opts = strategy.supported_opts();
        validate(&grammar, &config.start_symbol, Some(&supported_opts)).into_result()?;

        let costs = if config.precompute_costs {
            CostModel::precomputed(&grammar)
        } else {
            CostModel::new()
        };

        Ok(Self {
            grammar,
            start_symbol: config.start_symbol.clone(),
            min_nonterminals: config.min_nonterminals,
            max_nonterminals: config.max_nonterminals,
            costs,
            children: ChildrenCache::new(config.cache_expansions),
            strategy,
            rng: make_rng(config.seed),
            derivation_tree: None,
        })
    }

    /// The grammar inputs are generated from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The symbol every tree starts with.
    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    /// The tree behind the input most recently returned by [`fuzz`](Fuzzer::fuzz).
    pub fn derivation_tree(&self) -> Option<&DerivationTree> {
        self.derivation_tree.as_ref()
    }

    /// The cost of `symbol` as seen by this fuzzer.
    pub fn symbol_cost(&self, symbol: &str) -> Cost {
        self.costs.symbol_cost(&self.grammar, symbol)
    }

    /// (lookups, lookups answered from the cache) of the children cache.
    pub fn expansion_cache_stats(&self) -> (usize, usize) {
        self.children.stats()
    }

    /// A tree consisting of the unexpanded start symbol.
    pub fn init_tree(&self) -> DerivationTree {
        DerivationTree::new(self.start_symbol.as_str())
    }

    /// Expand an unexpanded `node` with an arbitrary alternative.
    pub fn expand_node_randomly(&mut self, node: DerivationTree) -> Result<DerivationTree, GenerationError> {
        self.expand_node(node, ExpansionPolicy::Random)
    }

    /// Expand an unexpanded `node` with one of its cheapest alternatives.
    pub fn expand_node_min_cost(&mut self, node: DerivationTree) -> Result<DerivationTree, GenerationError> {
        self.expand_node(node, ExpansionPolicy::MinCost)
    }

    /// Expand an unexpanded `node` with one of its most expensive alternatives.
    pub fn expand_node_max_cost(&mut self, node: DerivationTree) -> Result<DerivationTree, GenerationError> {
        self.expand_node(node, ExpansionPolicy::MaxCost)
    }

    /// Expand an unexpanded `node` according to `policy`.
    /// Nodes that are already expanded are returned unchanged.
    pub fn expand_node(&mut self, node: DerivationTree, policy: ExpansionPolicy) -> Result<DerivationTree, GenerationError> {
        match node {
            DerivationTree::Unexpanded(symbol) => self.expand_symbol(symbol, policy),
            expanded => Ok(expanded),
        }
    }

    fn expand_symbol(&mut self, symbol: String, policy: ExpansionPolicy) -> Result<DerivationTree, GenerationError> {
        let Some(expansions) = self.grammar.get(&symbol) else {
            return Err(GenerationError::UndefinedSymbol(symbol));
        };

        if expansions.is_empty() {
            return Err(GenerationError::UndefinedSymbol(symbol));
        }

        log::trace!("Expanding {} {}", symbol, policy);

        let candidates: Vec<usize> = match policy {
            ExpansionPolicy::Random => (0..expansions.len()).collect(),
            ExpansionPolicy::MinCost | ExpansionPolicy::MaxCost => {
                let costs = expansions
                    .iter()
                    .enumerate()
                    .map(|(index, expansion)| self.costs.expansion_cost(&self.grammar, &symbol, index, expansion))
                    .collect::<Vec<_>>();

                let chosen_cost = if policy == ExpansionPolicy::MinCost {
                    costs.iter().min()
                } else {
                    costs.iter().max()
                };

                match chosen_cost {
                    Some(chosen_cost) => costs.iter().positions(|cost| cost == chosen_cost).collect(),
                    None => Vec::new(),
                }
            },
        };

        let possible_children = candidates
            .iter()
            .map(|&index| self.children.children(&expansions[index]))
            .collect::<Vec<_>>();

        let mut chosen = self.strategy.choose_node_expansion(&mut self.rng, &symbol, &possible_children);
        if chosen >= possible_children.len() {
            log::warn!("Strategy chose expansion {} of {} for {}", chosen, possible_children.len(), symbol);
            chosen = possible_children.len() - 1;
        }

        let expansion = &expansions[candidates[chosen]];
        let chosen_children = possible_children.into_iter().nth(chosen).unwrap_or_default();
        let children = self.strategy.process_chosen_children(chosen_children, expansion);

        Ok(DerivationTree::expanded(symbol, children))
    }

    /// Expand one unexpanded non-terminal somewhere in `tree`.
    ///
    /// The strategy picks which subtree to descend into at every level.
    pub fn expand_tree_once(&mut self, tree: DerivationTree, policy: ExpansionPolicy) -> Result<DerivationTree, GenerationError> {
        let (symbol, mut children) = match tree {
            DerivationTree::Unexpanded(symbol) => return self.expand_symbol(symbol, policy),
            DerivationTree::Expanded { symbol, children } => (symbol, children),
        };

        let expandable = children.iter().positions(DerivationTree::any_possible_expansions).collect::<Vec<_>>();

        if expandable.is_empty() {
            return Ok(DerivationTree::Expanded { symbol, children });
        }

        let candidates = expandable.iter().map(|&index| &children[index]).collect::<Vec<_>>();
        let chosen = self.strategy.choose_tree_expansion(&mut self.rng, &symbol, &candidates);
        let index = expandable[chosen.min(expandable.len() - 1)];

        let child = std::mem::take(&mut children[index]);
        children[index] = self.expand_tree_once(child, policy)?;

        Ok(DerivationTree::Expanded { symbol, children })
    }

    /// Expand `tree` according to `policy` while it has fewer than `limit`
    /// open non-terminals, or until it is complete if there is no limit.
    pub fn expand_tree_with_policy(
        &mut self,
        mut tree: DerivationTree,
        policy: ExpansionPolicy,
        limit: Option<usize>,
    ) -> Result<DerivationTree, GenerationError> {
        while limit.is_none_or(|limit| tree.possible_expansions() < limit) && tree.any_possible_expansions() {
            tree = self.expand_tree_once(tree, policy)?;
            log::trace!("Tree: {}", tree.all_terminals());
        }

        Ok(tree)
    }

    /// Fully expand `tree` in the three phases.
    pub fn expand_tree(&mut self, tree: DerivationTree) -> Result<DerivationTree, GenerationError> {
        log::debug!("Growing tree to {} open non-terminals", self.min_nonterminals);
        let tree = self.expand_tree_with_policy(tree, ExpansionPolicy::MaxCost, Some(self.min_nonterminals))?;

        log::debug!("Expanding randomly up to {} open non-terminals", self.max_nonterminals);
        let tree = self.expand_tree_with_policy(tree, ExpansionPolicy::Random, Some(self.max_nonterminals))?;

        log::debug!("Closing {} open non-terminals", tree.possible_expansions());
        let tree = self.expand_tree_with_policy(tree, ExpansionPolicy::MinCost, None)?;

        match tree.possible_expansions() {
            0 => Ok(tree),
            open => Err(GenerationError::Unterminated(open)),
        }
    }

    /// Create a complete derivation tree from the start symbol.
    pub fn fuzz_tree(&mut self) -> Result<DerivationTree, GenerationError> {
        let tree = self.init_tree();
        let tree = self.expand_tree(tree)?;

        let (invocations, cached) = self.children.stats();
        if invocations > 0 {
            log::debug!("Children cache: {} of {} lookups cached", cached, invocations);
        }

        Ok(tree)
    }
}

impl<S: ExpansionStrategy> Fuzzer for GrammarFuzzer<S> {
    fn fuzz(&mut self) -> Result<String, Error> {
        let tree = self.fuzz_tree()?;
        let input = tree.to_output_string();
        self.derivation_tree = Some(tree);
        Ok(input)
    }
}
