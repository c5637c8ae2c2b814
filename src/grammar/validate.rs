use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use indexmap::IndexSet;
use petgraph::graphmap::DiGraphMap;

use crate::{
    error::GrammarError,
    grammar::{nonterminals, Grammar, START_SYMBOL},
};

/// A finding of [`validate`].
#[derive(Debug, Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Diagnostic {
    /// The non-terminal has an empty expansion list.
    EmptyExpansions(String),
    /// The non-terminal is defined but no expansion references it.
    DefinedNotUsed(String),
    /// The non-terminal is referenced but has no rule.
    UsedNotDefined(String),
    /// The non-terminal cannot be reached from the start symbol.
    Unreachable {
        /// The unreachable non-terminal
        symbol: String,
        /// The symbol(s) reachability was computed from
        from: String,
    },
    /// An expansion uses an option the consumer does not know about.
    UnsupportedOption(String),
}

impl Diagnostic {
    /// Structural diagnostics make a grammar unusable, independent of the caller's policy.
    pub fn is_structural(&self) -> bool {
        matches!(self, Diagnostic::EmptyExpansions(_))
    }

    /// The non-terminal (or option name) this diagnostic is about.
    pub fn symbol(&self) -> &str {
        match self {
            Diagnostic::EmptyExpansions(symbol)
            | Diagnostic::DefinedNotUsed(symbol)
            | Diagnostic::UsedNotDefined(symbol)
            | Diagnostic::Unreachable { symbol, .. }
            | Diagnostic::UnsupportedOption(symbol) => symbol,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Diagnostic::EmptyExpansions(symbol) => write!(f, "{:?}: expansion list empty", symbol),
            Diagnostic::DefinedNotUsed(symbol) => write!(f, "{:?}: defined, but not used", symbol),
            Diagnostic::UsedNotDefined(symbol) => write!(f, "{:?}: used, but not defined", symbol),
            Diagnostic::Unreachable { symbol, from } => write!(f, "{:?}: unreachable from {}", symbol, from),
            Diagnostic::UnsupportedOption(opt) => write!(f, "warning: option {:?} is not supported", opt),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
    valid: bool,
}

impl ValidationReport {
    /// Whether the grammar is fit for generation.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether any structural defect was found.
    pub fn is_structurally_broken(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_structural)
    }

    /// All findings, including warnings that do not affect validity.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Turn the report into an error if the grammar cannot be used.
    /// Structural defects take precedence over the other findings.
    pub fn into_result(self) -> Result<(), GrammarError> {
        if let Some(diagnostic) = self.diagnostics.iter().find(|d| d.is_structural()) {
            return Err(GrammarError::Structure {
                symbol: diagnostic.symbol().to_string(),
                reason: diagnostic.to_string(),
            });
        }

        if !self.valid {
            return Err(GrammarError::Invalid(self.diagnostics));
        }

        Ok(())
    }
}

/// Return the defined and the used non-terminals of `grammar`.
/// `start_symbol` always counts as used.
///
/// Returns `None` if an expansion list is empty.
pub fn def_used_nonterminals<'a>(
    grammar: &'a Grammar,
    start_symbol: &'a str,
) -> Option<(BTreeSet<&'a str>, BTreeSet<&'a str>)> {
    let mut defined = BTreeSet::new();
    let mut used = BTreeSet::from([start_symbol]);

    for (symbol, expansions) in grammar.rules() {
        defined.insert(symbol);

        if expansions.is_empty() {
            return None;
        }

        for expansion in expansions {
            used.extend(expansion.nonterminals());
        }
    }

    Some((defined, used))
}

/// The graph of "symbol has an expansion that references non-terminal" edges.
fn expansion_graph(grammar: &Grammar) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::new();

    for (symbol, expansions) in grammar.rules() {
        graph.add_node(symbol);

        for expansion in expansions {
            for nonterminal in nonterminals(expansion.string()) {
                graph.add_edge(symbol, nonterminal, ());
            }
        }
    }

    graph
}

fn find_reachable<'a>(graph: &DiGraphMap<&'a str, ()>, symbol: &'a str, reachable: &mut IndexSet<&'a str>) {
    reachable.insert(symbol);

    for nonterminal in graph.neighbors(symbol) {
        if !reachable.contains(nonterminal) {
            find_reachable(graph, nonterminal, reachable);
        }
    }
}

/// All non-terminals reachable from `start_symbol`, including itself.
/// Referenced but undefined non-terminals are part of the result.
pub fn reachable_nonterminals<'a>(grammar: &'a Grammar, start_symbol: &'a str) -> IndexSet<&'a str> {
    let graph = expansion_graph(grammar);
    let mut reachable = IndexSet::new();
    find_reachable(&graph, start_symbol, &mut reachable);
    reachable
}

/// Defined non-terminals that cannot be reached from `start_symbol`.
pub fn unreachable_nonterminals<'a>(grammar: &'a Grammar, start_symbol: &'a str) -> BTreeSet<&'a str> {
    let reachable = reachable_nonterminals(grammar, start_symbol);
    grammar.symbols().filter(|symbol| !reachable.contains(symbol)).collect()
}

/// All option keys used by any expansion of `grammar`.
pub fn opts_used(grammar: &Grammar) -> BTreeSet<&str> {
    grammar
        .rules()
        .flat_map(|(_, expansions)| expansions)
        .flat_map(|expansion| expansion.opts().keys())
        .map(String::as_str)
        .collect()
}

/// Check `grammar` for consistency.
///
/// Every finding is logged as a warning and returned in the report. The grammar is valid
/// if the set of used non-terminals equals the set of defined ones and every non-terminal
/// is reachable from `start_symbol` (or from `<start>` if the grammar defines it).
/// Unsupported options are only reported if `supported_opts` is given and never
/// affect validity.
pub fn validate(grammar: &Grammar, start_symbol: &str, supported_opts: Option<&HashSet<String>>) -> ValidationReport {
    let mut diagnostics = Vec::new();

    let Some((defined, mut used)) = def_used_nonterminals(grammar, start_symbol) else {
        for (symbol, expansions) in grammar.rules() {
            if expansions.is_empty() {
                diagnostics.push(Diagnostic::EmptyExpansions(symbol.to_string()));
            }
        }

        for diagnostic in &diagnostics {
            log::warn!("{}", diagnostic);
        }

        return ValidationReport {
            diagnostics,
            valid: false,
        };
    };

    // <start> never counts as unused, even if another start symbol was given
    if grammar.contains(START_SYMBOL) {
        used.insert(START_SYMBOL);
    }

    for symbol in defined.difference(&used) {
        diagnostics.push(Diagnostic::DefinedNotUsed(symbol.to_string()));
    }

    for symbol in used.difference(&defined) {
        diagnostics.push(Diagnostic::UsedNotDefined(symbol.to_string()));
    }

    let mut unreachable = unreachable_nonterminals(grammar, start_symbol);
    let mut from = start_symbol.to_string();

    if grammar.contains(START_SYMBOL) {
        let reachable = reachable_nonterminals(grammar, START_SYMBOL);
        unreachable.retain(|symbol| !reachable.contains(symbol));

        if start_symbol != START_SYMBOL {
            from = format!("{} or {}", start_symbol, START_SYMBOL);
        }
    }

    for symbol in &unreachable {
        diagnostics.push(Diagnostic::Unreachable {
            symbol: symbol.to_string(),
            from: from.clone(),
        });
    }

    if let Some(supported_opts) = supported_opts {
        for opt in opts_used(grammar) {
            if !supported_opts.contains(opt) {
                diagnostics.push(Diagnostic::UnsupportedOption(opt.to_string()));
            }
        }
    }

    for diagnostic in &diagnostics {
        log::warn!("{}", diagnostic);
    }

    ValidationReport {
        valid: used == defined && unreachable.is_empty(),
        diagnostics,
    }
}

/// Shorthand for `validate(..).is_valid()`.
pub fn is_valid_grammar(grammar: &Grammar, start_symbol: &str, supported_opts: Option<&HashSet<String>>) -> bool {
    validate(grammar, start_symbol, supported_opts).is_valid()
}
