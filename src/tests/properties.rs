use std::collections::HashSet;

use crate::{
    config::GeneratorConfig,
    fuzzer::Fuzzer,
    generator::{symbol_cost, Cost, GrammarFuzzer},
    grammar::{builtin, convert_ebnf_grammar, nonterminals, validate, Grammar, START_SYMBOL},
};

fn grammars() -> Vec<(&'static str, Grammar)> {
    builtin::NAMES
        .iter()
        .filter_map(|name| builtin::by_name(name).map(|grammar| (*name, convert_ebnf_grammar(&grammar))))
        .collect()
}

#[test]
fn test_output_has_no_nonterminals() {
    for (name, grammar) in grammars() {
        let config = GeneratorConfig {
            min_nonterminals: 3,
            max_nonterminals: 12,
            seed: Some(17),
            ..GeneratorConfig::default()
        };
        let mut fuzzer = GrammarFuzzer::new(grammar, &config).unwrap();

        for _ in 0..25 {
            let input = fuzzer.fuzz().unwrap();
            assert!(nonterminals(&input).is_empty(), "{}: {:?}", name, input);
            assert_eq!(fuzzer.derivation_tree().unwrap().possible_expansions(), 0);
        }
    }
}

#[test]
fn test_pure_grammars_survive_normalization() {
    for name in builtin::NAMES.iter().filter(|name| **name != "expr-ebnf") {
        let grammar = builtin::by_name(name).unwrap();
        assert_eq!(convert_ebnf_grammar(&grammar), grammar, "{}", name);
    }
}

#[test]
fn test_validation_is_idempotent() {
    let grammar: Grammar = [
        ("<start>", vec!["<a><b>"]),
        ("<a>", vec!["<undefined>"]),
        ("<x>", vec!["<y>"]),
        ("<y>", vec!["<x>"]),
    ].into_iter().collect();

    let first = validate(&grammar, START_SYMBOL, None);
    let second = validate(&grammar, START_SYMBOL, None);
    assert_eq!(first, second);
    assert!(!first.is_valid());
}

#[test]
fn test_costs() {
    for (name, grammar) in grammars() {
        for symbol in grammar.symbols() {
            let cost = symbol_cost(&grammar, symbol, &HashSet::new());
            assert!(cost.is_finite(), "{} {}", name, symbol);
            assert!(cost > Cost::Finite(0));
        }
    }

    let grammar: Grammar = [("<start>", vec!["<start>x"])].into_iter().collect();
    assert_eq!(symbol_cost(&grammar, "<start>", &HashSet::new()), Cost::Infinite);
}
