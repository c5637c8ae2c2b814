//! Write a grammar in the JSON format that [`GrammarBuilder::json_grammar`](crate::grammar::GrammarBuilder::json_grammar) reads.
//!
//! Use it like so:
//! ```no_run
//! # use treefuzz::{backends::json::JsonGenerator, grammar::Grammar};
//! // First, load a grammar with EBNF operators. They are converted while loading.
//! let grammar = Grammar::builder()
//!     .json_grammar("my-ebnf-grammar.json").unwrap()
//!     .build().unwrap();
//!
//! // Then, store the plain context-free version.
//! JsonGenerator::new().generate("my-grammar.json", &grammar).unwrap();
//! ```

mod generator;

pub use generator::JsonGenerator;
