//! Error types of this crate.
//!
//! Every fallible operation returns one of the specific error types below.
//! [`Error`] unifies them for the [`Fuzzer`](crate::fuzzer::Fuzzer) trait and the binaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::grammar::Diagnostic;

/// Loading a grammar or config file from disk failed.
#[derive(Debug, Error)]
pub struct ParsingError {
    path: PathBuf,
    msg: String,
}

impl ParsingError {
    pub(crate) fn new<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Self {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// The file that could not be parsed.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// What went wrong.
    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParsingError in {}: {}", self.path.display(), self.msg)
    }
}

/// Errors that make a grammar unusable for generation.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// An expansion list is not a list, is empty, or contains something
    /// that is neither a string nor a (string, options) pair.
    #[error("Malformed expansions of '{symbol}': {reason}")]
    Structure {
        /// The nonterminal whose expansions are malformed
        symbol: String,
        /// Human readable description of the defect
        reason: String,
    },

    /// The start symbol is not defined by the grammar.
    #[error("The grammar does not define the start symbol {0}")]
    MissingStartSymbol(String),

    /// Validation found undefined, unused or unreachable nonterminals.
    #[error("The grammar is invalid ({} problem(s)): {}", .0.len(), itertools::join(.0.iter(), "; "))]
    Invalid(Vec<Diagnostic>),

    /// Two loaded grammars define the same non-terminal.
    #[error("Two grammars define the same non-terminal: {0}")]
    MergeConflict(String),

    /// The grammar file could not be read.
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// Errors raised while turning a grammar into a string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The baseline string-rewriting generator could not keep the number of
    /// nonterminals under its limit.
    #[error("Cannot expand {term:?} after {trials} trials")]
    ExpansionExhausted {
        /// The partially expanded term at the time of giving up
        term: String,
        /// How many consecutive expansions were rejected
        trials: usize,
    },

    /// A nonterminal was reached that the grammar does not define.
    #[error("The non-terminal '{0}' is referenced but never defined")]
    UndefinedSymbol(String),

    /// `min_nonterminals` is larger than `max_nonterminals`.
    #[error("min_nonterminals ({min}) must not exceed max_nonterminals ({max})")]
    InvalidBounds {
        /// Requested lower bound
        min: usize,
        /// Requested upper bound
        max: usize,
    },

    /// A character range that is empty, overflows or contains code points that are not `char`s.
    #[error("Invalid character range: {range} code point(s) from {start:#x}")]
    InvalidCharRange {
        /// First code point
        start: u32,
        /// Number of code points
        range: u32,
    },

    /// The derivation tree still had unexpanded nonterminals after all phases.
    #[error("Derivation tree still contains {0} unexpanded non-terminal(s)")]
    Unterminated(usize),
}

/// Errors of the mutation-based fuzzer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    /// Mutation needs at least one seed to start from.
    #[error("The seed pool is empty")]
    EmptySeedPool,

    /// `min_mutations` is larger than `max_mutations`.
    #[error("min_mutations ({min}) must not exceed max_mutations ({max})")]
    InvalidBounds {
        /// Requested lower bound
        min: usize,
        /// Requested upper bound
        max: usize,
    },
}

/// Union of all errors in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ParsingError`]
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    /// See [`GrammarError`]
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// See [`GenerationError`]
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// See [`MutationError`]
    #[error(transparent)]
    Mutation(#[from] MutationError),
}
