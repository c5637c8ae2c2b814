//! This library contains everything you need to generate test inputs from context-free grammars.
//!
//! It consists of
//! - __grammars__: Load grammars from JSON files or use a [built-in](grammar::builtin) one.
//!   EBNF operators (`?`, `*`, `+`) are converted into plain rules and the result is validated.
//! - __generators__: The [`GrammarFuzzer`](generator::GrammarFuzzer) grows derivation trees
//!   with cost-aware expansion, the [`MutationFuzzer`](mutation::MutationFuzzer) edits seed inputs.
//! - __backends__: Use the loaded grammar for something else. Currently, the
//!   [`json`](backends::json) backend writes normalized grammars back to disk.
//!
//! ## Getting Started
//! The first step always is to load a grammar. To do this use the [`Grammar::builder()`](grammar::Grammar::builder) method
//! that will give you access to a [`GrammarBuilder`](grammar::GrammarBuilder) like this:
//! ```no_run
//! # use treefuzz::grammar::Grammar;
//! let grammar = Grammar::builder()
//!     .json_grammar("my-grammar.json").unwrap()
//!     .start_symbol("<start>")
//!     .build().unwrap();
//! ```
//! Then, plug the grammar into a generator:
//! ```
//! # use treefuzz::{config::GeneratorConfig, fuzzer::Fuzzer, generator::GrammarFuzzer, grammar::builtin};
//! # let grammar = builtin::url_grammar();
//! let mut fuzzer = GrammarFuzzer::new(grammar, &GeneratorConfig::default()).unwrap();
//! println!("{}", fuzzer.fuzz().unwrap());
//! ```
//! And that's it.

#![deny(missing_docs)]

pub(crate) mod parser;

pub mod backends;
pub mod config;
pub mod error;
pub mod fuzzer;
pub mod generator;
pub mod grammar;
pub mod mutation;
pub mod tree;

#[cfg(test)]
mod tests;
