use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::Sum;
use std::ops::Add;

use ahash::AHashMap;
use itertools::Itertools;

use crate::grammar::{nonterminals, Expansion, Grammar};

/// Minimum number of expansion steps needed to fully terminate a symbol.
///
/// `Infinite` orders after every finite cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cost {
    /// A bounded number of steps
    Finite(u64),
    /// The alternative can only recurse into symbols that are already being expanded
    Infinite,
}

impl Cost {
    /// Whether this cost is bounded.
    pub fn is_finite(&self) -> bool {
        matches!(self, Cost::Finite(_))
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => Cost::Finite(a.saturating_add(b)),
            _ => Cost::Infinite,
        }
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::Finite(0), Add::add)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Cost::Finite(cost) => write!(f, "{}", cost),
            Cost::Infinite => write!(f, "inf"),
        }
    }
}

/// Cost of `symbol`: the cheapest of its expansions, evaluated with `symbol` added to `seen`.
///
/// `seen` holds the symbols currently being expanded on this evaluation path.
/// Undefined symbols have infinite cost.
pub fn symbol_cost<'a>(grammar: &'a Grammar, symbol: &'a str, seen: &HashSet<&'a str>) -> Cost {
    let Some(expansions) = grammar.get(symbol) else {
        return Cost::Infinite;
    };

    let mut seen = seen.clone();
    seen.insert(symbol);

    expansions
        .iter()
        .map(|expansion| expansion_cost(grammar, expansion.string(), &seen))
        .min()
        .unwrap_or(Cost::Infinite)
}

/// Cost of an expansion string: 1 if it contains no non-terminals, infinite if it
/// references a symbol in `seen`, otherwise 1 plus the cost of every distinct
/// non-terminal it references.
pub fn expansion_cost<'a>(grammar: &'a Grammar, expansion: &'a str, seen: &HashSet<&'a str>) -> Cost {
    let symbols = nonterminals(expansion);

    if symbols.is_empty() {
        return Cost::Finite(1);
    }

    if symbols.iter().any(|symbol| seen.contains(symbol)) {
        return Cost::Infinite;
    }

    symbols
        .into_iter()
        .unique()
        .map(|symbol| symbol_cost(grammar, symbol, seen))
        .sum::<Cost>()
        + Cost::Finite(1)
}

/// Answers cost queries, either by evaluating the recursive definition every
/// time or from a table filled once up front.
///
/// Both modes return identical costs. The table stores every symbol's cost with
/// an empty `seen` set and every expansion's cost with `seen` holding the symbol
/// it belongs to, which are exactly the queries the generator makes.
#[derive(Debug, Default, Clone)]
pub struct CostModel {
    symbols: AHashMap<String, Cost>,
    expansions: AHashMap<String, Vec<Cost>>,
    precomputed: bool,
}

impl CostModel {
    /// A model that evaluates the recursive definition on every query.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model with all costs of `grammar` computed up front.
    pub fn precomputed(grammar: &Grammar) -> Self {
        let mut symbols = AHashMap::new();
        let mut expansions = AHashMap::new();

        for (symbol, alternatives) in grammar.rules() {
            symbols.insert(symbol.to_string(), symbol_cost(grammar, symbol, &HashSet::new()));

            let seen = HashSet::from([symbol]);
            let costs = alternatives
                .iter()
                .map(|expansion| expansion_cost(grammar, expansion.string(), &seen))
                .collect();
            expansions.insert(symbol.to_string(), costs);
        }

        log::debug!("Precomputed costs of {} non-terminals", symbols.len());

        Self {
            symbols,
            expansions,
            precomputed: true,
        }
    }

    /// Whether queries are answered from the table.
    pub fn is_precomputed(&self) -> bool {
        self.precomputed
    }

    /// Cost of `symbol` with nothing in progress.
    pub fn symbol_cost(&self, grammar: &Grammar, symbol: &str) -> Cost {
        match self.symbols.get(symbol) {
            Some(cost) if self.precomputed => *cost,
            _ => symbol_cost(grammar, symbol, &HashSet::new()),
        }
    }

    /// Cost of choosing alternative `index` (which is `expansion`) for `symbol`.
    pub fn expansion_cost(&self, grammar: &Grammar, symbol: &str, index: usize, expansion: &Expansion) -> Cost {
        if self.precomputed {
            if let Some(cost) = self.expansions.get(symbol).and_then(|costs| costs.get(index)) {
                return *cost;
            }
        }

        expansion_cost(grammar, expansion.string(), &HashSet::from([symbol]))
    }
}
