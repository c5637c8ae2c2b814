use std::collections::HashSet;
use std::path::Path;

use crate::{
    error::GrammarError,
    grammar::{convert_ebnf_grammar, validate, Grammar, START_SYMBOL},
    parser::json,
};

/// The GrammarBuilder loads grammars and returns a single validated [`Grammar`].
///
/// Use it like so:
/// ```no_run
/// # use treefuzz::grammar::Grammar;
/// let grammar = Grammar::builder()
///     // Load a grammar file
///     .json_grammar("my-grammar.json").unwrap()
///     // Rules can be split over multiple files
///     .json_grammar("common-definitions.json").unwrap()
///     // Set the start symbol
///     .start_symbol("<my-start>")
///     .build().unwrap();
/// ```
pub struct GrammarBuilder {
    grammar: Grammar,
    normalize: bool,
    start_symbol: String,
    supported_opts: Option<HashSet<String>>,
}

impl Grammar {
    /// Start loading a grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }
}

impl GrammarBuilder {
    pub(crate) fn new() -> Self {
        Self {
            grammar: Grammar::new(),
            normalize: true,
            start_symbol: START_SYMBOL.to_string(),
            supported_opts: None,
        }
    }

    fn check_start_symbol(&self) -> bool {
        self.grammar.contains(&self.start_symbol)
    }
}

impl GrammarBuilder {
    /// Load a grammar file in JSON format. C-style comments are allowed.
    pub fn json_grammar<P: AsRef<Path>>(self, path: P) -> Result<Self, GrammarError> {
        let grammar = json::parse_json(path.as_ref())?;
        self.grammar(grammar)
    }

    /// Add the rules of an in-memory grammar.
    pub fn grammar(mut self, grammar: Grammar) -> Result<Self, GrammarError> {
        for (symbol, expansions) in grammar.rules() {
            if self.grammar.contains(symbol) {
                return Err(GrammarError::MergeConflict(symbol.to_string()));
            }

            self.grammar.insert(symbol, expansions.iter().cloned());
        }

        Ok(self)
    }

    /// Convert EBNF operators into plain rules before validation. On by default.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the symbol where generation starts. Defaults to `<start>`.
    pub fn start_symbol<S: Into<String>>(mut self, start_symbol: S) -> Self {
        self.start_symbol = start_symbol.into();
        self
    }

    /// Report options that are not in `supported_opts`.
    pub fn supported_opts(mut self, supported_opts: HashSet<String>) -> Self {
        self.supported_opts = Some(supported_opts);
        self
    }

    /// Create the [`Grammar`]. Fails if the start symbol is missing or the grammar is invalid.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if !self.check_start_symbol() {
            return Err(GrammarError::MissingStartSymbol(self.start_symbol));
        }

        let grammar = if self.normalize {
            convert_ebnf_grammar(&self.grammar)
        } else {
            self.grammar
        };

        validate(&grammar, &self.start_symbol, self.supported_opts.as_ref()).into_result()?;

        log::debug!("Loaded grammar with {} non-terminals", grammar.len());

        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{builtin, Diagnostic};

    #[test]
    fn test_missing_refs() {
        let err = Grammar::builder()
            .json_grammar("test-data/grammars/invalid-refs.json").unwrap()
            .build()
            .unwrap_err();

        match err {
            GrammarError::Invalid(diagnostics) => {
                assert_eq!(diagnostics, vec![Diagnostic::UsedNotDefined("<undefined>".to_string())]);
            },
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_normalize() {
        let grammar = Grammar::builder()
            .json_grammar("test-data/grammars/expr-ebnf.json").unwrap()
            .build()
            .unwrap();
        assert_eq!(grammar, convert_ebnf_grammar(&builtin::expr_ebnf_grammar()));
    }

    #[test]
    fn test_without_normalization() {
        // Operators sit outside the brackets, so the raw grammar validates too
        let grammar = Grammar::builder()
            .json_grammar("test-data/grammars/expr-ebnf.json").unwrap()
            .normalize(false)
            .build()
            .unwrap();
        assert_eq!(grammar, builtin::expr_ebnf_grammar());
    }

    #[test]
    fn test_options_survive_loading() {
        let grammar = Grammar::builder()
            .json_grammar("test-data/grammars/options.json").unwrap()
            .build()
            .unwrap();

        let start = grammar.get("<start>").unwrap();
        assert_eq!(start[0].string(), "<greeting>, <name>!");
        assert_eq!(start[0].opts().get("prob"), Some(&serde_json::json!(0.9)));
        assert!(start[1].opts().is_empty());

        let name = grammar.get("<name>").unwrap();
        assert_eq!(name[1].string(), "<letter-1>");
        assert!(grammar.contains("<letter-1>"));
    }

    #[test]
    fn test_missing_start_symbol() {
        let err = Grammar::builder()
            .grammar(builtin::digit_grammar()).unwrap()
            .start_symbol("<nope>")
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::MissingStartSymbol(s) if s == "<nope>"));
    }

    #[test]
    fn test_merge_conflict() {
        let err = Grammar::builder()
            .grammar(builtin::digit_grammar()).unwrap()
            .json_grammar("test-data/grammars/digits.json")
            .err()
            .unwrap();
        assert!(matches!(err, GrammarError::MergeConflict(s) if s == "<start>"));
    }

    #[test]
    fn test_merge_files() {
        let grammar = Grammar::builder()
            .grammar([("<other>", vec!["<start>!"])].into_iter().collect()).unwrap()
            .json_grammar("test-data/grammars/digits.json").unwrap()
            .start_symbol("<other>")
            .build()
            .unwrap();
        assert_eq!(grammar.len(), 3);
    }
}
