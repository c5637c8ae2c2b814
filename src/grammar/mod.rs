//! This is the frontend that loads, normalizes and checks grammars.
//!
//! A grammar maps non-terminals like `<digit>` to a list of alternatives.
//! Each alternative is a string that mixes literal text with references to other non-terminals:
//! ```
//! use treefuzz::grammar::{Grammar, validate, START_SYMBOL};
//!
//! let grammar: Grammar = [
//!     ("<start>", vec!["<digit>+"]),
//!     ("<digit>", vec!["0", "1"]),
//! ].into_iter().collect();
//!
//! // Get rid of the EBNF operators
//! let grammar = treefuzz::grammar::convert_ebnf_grammar(&grammar);
//! assert!(validate(&grammar, START_SYMBOL, None).is_valid());
//! ```
//! Grammar files are loaded with the [`GrammarBuilder`]:
//! ```no_run
//! # use treefuzz::grammar::Grammar;
//! let grammar = Grammar::builder()
//!     .json_grammar("my-grammar.json").unwrap()
//!     .build().unwrap();
//! ```

mod builder;
pub mod builtin;
mod cfg;
mod ebnf;
mod validate;

pub use builder::*;
pub use cfg::*;
pub use ebnf::*;
pub use validate::*;
