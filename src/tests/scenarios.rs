use std::collections::HashSet;

use regex::Regex;

use crate::{
    config::{GeneratorConfig, MutationConfig},
    fuzzer::Fuzzer,
    generator::{symbol_cost, Cost, ExpansionPolicy, GrammarFuzzer},
    grammar::{convert_ebnf_grammar, validate, Diagnostic, Grammar},
    mutation::MutationFuzzer,
};

fn seeded(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        seed: Some(seed),
        ..GeneratorConfig::default()
    }
}

#[test]
fn test_single_digits() {
    let grammar = Grammar::builder()
        .json_grammar("test-data/grammars/digits.json").unwrap()
        .build().unwrap();
    let mut fuzzer = GrammarFuzzer::new(grammar, &seeded(1)).unwrap();

    for _ in 0..100 {
        let input = fuzzer.fuzz().unwrap();
        assert_eq!(input.len(), 1);
        assert!(input.chars().all(|c| c.is_ascii_digit()), "{}", input);
    }
}

#[test]
fn test_one_or_more() {
    let ebnf: Grammar = [
        ("<start>", vec!["<a>+"]),
        ("<a>", vec!["x"]),
    ].into_iter().collect();
    let grammar = convert_ebnf_grammar(&ebnf);

    let start = grammar.get("<start>").unwrap();
    assert_eq!(start.len(), 1);
    assert_eq!(start[0].string(), "<a-1>");
    assert!(grammar.get("<a-1>").unwrap().iter().all(|e| !e.string().is_empty()));

    let config = GeneratorConfig {
        min_nonterminals: 1,
        max_nonterminals: 5,
        ..seeded(2)
    };
    let mut fuzzer = GrammarFuzzer::new(grammar, &config).unwrap();
    let pattern = Regex::new("^x+$").unwrap();
    let mut lengths = HashSet::new();

    for _ in 0..100 {
        let input = fuzzer.fuzz().unwrap();
        assert!(pattern.is_match(&input), "{:?}", input);
        lengths.insert(input.len());
    }

    assert!(lengths.len() > 1);
}

#[test]
fn test_dead_symbol() {
    let grammar: Grammar = [
        ("<start>", vec!["a"]),
        ("<dead>", vec!["b"]),
    ].into_iter().collect();
    let report = validate(&grammar, "<start>", None);

    assert!(!report.is_valid());
    assert!(report.diagnostics().contains(&Diagnostic::DefinedNotUsed("<dead>".to_string())));
}

#[test]
fn test_mutation_after_seeds() {
    let config = MutationConfig {
        seed: Some(4),
        ..MutationConfig::default()
    };
    let mut fuzzer = MutationFuzzer::new(vec!["ab".to_string()], &config).unwrap();

    assert_eq!(fuzzer.fuzz().unwrap(), "ab");

    // 2 to 10 edits, each changes the length by at most one
    let mutant = fuzzer.fuzz().unwrap();
    assert!(mutant.chars().count() <= 12);
}

#[test]
fn test_mutual_recursion_terminates() {
    let grammar: Grammar = [
        ("<start>", vec!["<a>"]),
        ("<a>", vec!["<b>"]),
        ("<b>", vec!["<a>", "x"]),
    ].into_iter().collect();

    assert_eq!(symbol_cost(&grammar, "<b>", &HashSet::new()), Cost::Finite(1));

    let mut fuzzer = GrammarFuzzer::new(grammar, &seeded(5)).unwrap();

    for _ in 0..20 {
        let tree = fuzzer.init_tree();
        let tree = fuzzer.expand_tree_with_policy(tree, ExpansionPolicy::MinCost, None).unwrap();
        assert_eq!(tree.to_output_string(), "x");
    }
}
