use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json as json;

/// The conventional start symbol. It is exempt from the "defined, but not used" check.
pub const START_SYMBOL: &str = "<start>";

static RE_NONTERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<> ]*>").expect("valid non-terminal pattern"));

/// Return all non-terminals referenced in `expansion`, in order of appearance.
/// Duplicates are kept.
pub fn nonterminals(expansion: &str) -> Vec<&str> {
    RE_NONTERMINAL.find_iter(expansion).map(|m| m.as_str()).collect()
}

/// Check whether `symbol` starts with a non-terminal.
pub fn is_nonterminal(symbol: &str) -> bool {
    RE_NONTERMINAL.find(symbol).is_some_and(|m| m.start() == 0)
}

/// Per-expansion metadata. The core never interprets it but keeps it intact.
pub type Options = IndexMap<String, json::Value>;

/// A run of an expansion string: either literal text or a reference to a non-terminal.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum Symbol<'a> {
    /// Literal text
    Terminal(&'a str),
    /// Reference to another rule, brackets included
    NonTerminal(&'a str),
}

/// One alternative of a non-terminal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    string: String,
    opts: Options,
}

impl Expansion {
    /// Create an expansion without options.
    pub fn new<S: Into<String>>(string: S) -> Self {
        Self {
            string: string.into(),
            opts: Options::new(),
        }
    }

    /// Create an expansion that carries options.
    pub fn with_opts<S: Into<String>>(string: S, opts: Options) -> Self {
        Self {
            string: string.into(),
            opts,
        }
    }

    /// The string to be expanded.
    pub fn string(&self) -> &str {
        &self.string
    }

    /// The options of this expansion. Empty if none were given.
    pub fn opts(&self) -> &Options {
        &self.opts
    }

    pub(crate) fn set_string(&mut self, string: String) {
        self.string = string;
    }

    /// Non-terminals referenced by this expansion.
    pub fn nonterminals(&self) -> Vec<&str> {
        nonterminals(&self.string)
    }

    /// Split the expansion into terminal runs and non-terminals.
    /// Empty runs are dropped, so the epsilon expansion yields nothing.
    pub fn symbols(&self) -> Vec<Symbol<'_>> {
        let mut symbols = Vec::new();
        let mut cursor = 0;

        for m in RE_NONTERMINAL.find_iter(&self.string) {
            if m.start() > cursor {
                symbols.push(Symbol::Terminal(&self.string[cursor..m.start()]));
            }
            symbols.push(Symbol::NonTerminal(m.as_str()));
            cursor = m.end();
        }

        if cursor < self.string.len() {
            symbols.push(Symbol::Terminal(&self.string[cursor..]));
        }

        symbols
    }
}

impl Display for Expansion {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{:?}", self.string)?;

        if !self.opts.is_empty() {
            write!(f, " {}", json::Value::Object(self.opts.clone().into_iter().collect()))?;
        }

        Ok(())
    }
}

impl From<&str> for Expansion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Expansion {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<S: Into<String>> From<(S, Options)> for Expansion {
    fn from((s, opts): (S, Options)) -> Self {
        Self::with_opts(s, opts)
    }
}

/// A context-free grammar: a mapping from non-terminals to their alternatives.
///
/// Rules keep their insertion order, which makes normalization and seeded
/// generation reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grammar {
    rules: IndexMap<String, Vec<Expansion>>,
}

impl Grammar {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) `symbol`. Returns the previous expansions, if any.
    pub fn insert<S, I, E>(&mut self, symbol: S, expansions: I) -> Option<Vec<Expansion>>
    where
        S: Into<String>,
        I: IntoIterator<Item = E>,
        E: Into<Expansion>,
    {
        self.rules.insert(symbol.into(), expansions.into_iter().map(Into::into).collect())
    }

    /// The expansions of `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&[Expansion]> {
        self.rules.get(symbol).map(Vec::as_slice)
    }

    pub(crate) fn get_mut(&mut self, symbol: &str) -> Option<&mut Vec<Expansion>> {
        self.rules.get_mut(symbol)
    }

    /// Check whether `symbol` is defined.
    pub fn contains(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    /// All defined non-terminals in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// All rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Expansion])> {
        self.rules.iter().map(|(symbol, expansions)| (symbol.as_str(), expansions.as_slice()))
    }

    /// Number of defined non-terminals.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether no rule is defined.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<S, I, E> FromIterator<(S, I)> for Grammar
where
    S: Into<String>,
    I: IntoIterator<Item = E>,
    E: Into<Expansion>,
{
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        let mut grammar = Self::new();

        for (symbol, expansions) in iter {
            grammar.insert(symbol, expansions);
        }

        grammar
    }
}

impl<S, I, E> Extend<(S, I)> for Grammar
where
    S: Into<String>,
    I: IntoIterator<Item = E>,
    E: Into<Expansion>,
{
    fn extend<T: IntoIterator<Item = (S, I)>>(&mut self, iter: T) {
        for (symbol, expansions) in iter {
            self.insert(symbol, expansions);
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (symbol, expansions) in self.rules() {
            writeln!(f, "{} ::=", symbol)?;

            for expansion in expansions {
                writeln!(f, "    | {}", expansion)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonterminals() {
        assert_eq!(nonterminals("<term> + <expr>"), vec!["<term>", "<expr>"]);
        assert_eq!(nonterminals("<digit><digit>"), vec!["<digit>", "<digit>"]);
        assert!(nonterminals("1 < 2 > 0").is_empty());
        assert_eq!(nonterminals("<<a>>"), vec!["<a>"]);
    }

    #[test]
    fn test_is_nonterminal() {
        assert!(is_nonterminal("<start>"));
        assert!(is_nonterminal("<a>b"));
        assert!(!is_nonterminal("b<a>"));
        assert!(!is_nonterminal("< >"));
        assert!(!is_nonterminal(""));
    }

    #[test]
    fn test_symbols() {
        let expansion = Expansion::new("(<expr>)");
        assert_eq!(
            expansion.symbols(),
            vec![Symbol::Terminal("("), Symbol::NonTerminal("<expr>"), Symbol::Terminal(")")],
        );
        assert!(Expansion::new("").symbols().is_empty());
    }

    #[test]
    fn test_insertion_order() {
        let grammar: Grammar = [
            ("<start>", vec!["<b>"]),
            ("<b>", vec!["<a>"]),
            ("<a>", vec!["a"]),
        ].into_iter().collect();
        assert_eq!(grammar.symbols().collect::<Vec<_>>(), vec!["<start>", "<b>", "<a>"]);
        assert_eq!(grammar.get("<a>").map(|e| e[0].string()), Some("a"));
    }
}
