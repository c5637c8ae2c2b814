use rand::{rngs::StdRng, seq::IndexedRandom, Rng};

use crate::{
    config::{make_rng, GeneratorConfig},
    error::{Error, GenerationError, GrammarError},
    fuzzer::Fuzzer,
    grammar::{nonterminals, Grammar},
};

/// How many consecutive rejected expansions [`simple_grammar_fuzzer`] tolerates by default.
pub const DEFAULT_MAX_EXPANSION_TRIALS: usize = 100;

/// Generate a string by rewriting the start symbol until no non-terminal is left.
///
/// In every step a random non-terminal of the current term is picked and its first
/// occurrence is replaced by a random alternative. A replacement that would leave
/// `max_nonterminals` or more non-terminals in the term is rejected.
pub fn simple_grammar_fuzzer<R: Rng + ?Sized>(
    grammar: &Grammar,
    start_symbol: &str,
    max_nonterminals: usize,
    max_expansion_trials: usize,
    rng: &mut R,
) -> Result<String, GenerationError> {
    let mut term = start_symbol.to_string();
    let mut expansion_trials = 0;

    loop {
        let symbols = nonterminals(&term);
        let Some(symbol) = symbols.choose(rng) else {
            break;
        };

        let expansions = grammar.get(symbol).ok_or_else(|| GenerationError::UndefinedSymbol(symbol.to_string()))?;
        let Some(expansion) = expansions.choose(rng) else {
            return Err(GenerationError::UndefinedSymbol(symbol.to_string()));
        };

        let new_term = term.replacen(symbol, expansion.string(), 1);

        if nonterminals(&new_term).len() < max_nonterminals {
            log::trace!("{} -> {}", symbol, expansion.string());
            term = new_term;
            expansion_trials = 0;
        } else {
            expansion_trials += 1;

            if expansion_trials >= max_expansion_trials {
                return Err(GenerationError::ExpansionExhausted {
                    term,
                    trials: expansion_trials,
                });
            }
        }
    }

    Ok(term)
}

/// [`simple_grammar_fuzzer`] behind the [`Fuzzer`] trait.
#[derive(Debug)]
pub struct SimpleGrammarFuzzer {
    grammar: Grammar,
    start_symbol: String,
    max_nonterminals: usize,
    max_expansion_trials: usize,
    rng: StdRng,
}

impl SimpleGrammarFuzzer {
    /// Uses the start symbol, `max_nonterminals` and seed of `config`.
    pub fn new(grammar: Grammar, config: &GeneratorConfig) -> Result<Self, GrammarError> {
        if !grammar.contains(&config.start_symbol) {
            return Err(GrammarError::MissingStartSymbol(config.start_symbol.clone()));
        }

        Ok(Self {
            grammar,
            start_symbol: config.start_symbol.clone(),
            max_nonterminals: config.max_nonterminals,
            max_expansion_trials: DEFAULT_MAX_EXPANSION_TRIALS,
            rng: make_rng(config.seed),
        })
    }

    /// Change the number of rejected expansions after which generation gives up.
    pub fn max_expansion_trials(mut self, max_expansion_trials: usize) -> Self {
        self.max_expansion_trials = max_expansion_trials;
        self
    }
}

impl Fuzzer for SimpleGrammarFuzzer {
    fn fuzz(&mut self) -> Result<String, Error> {
        Ok(simple_grammar_fuzzer(
            &self.grammar,
            &self.start_symbol,
            self.max_nonterminals,
            self.max_expansion_trials,
            &mut self.rng,
        )?)
    }
}
