use std::sync::LazyLock;

use regex::Regex;

use crate::grammar::Grammar;

static RE_EXTENDED_NONTERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<> ]*>[?+*]").expect("valid extended non-terminal pattern"));
static RE_PARENTHESIZED_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)[?+*]").expect("valid parenthesized expression pattern"));

/// Name that [`convert_ebnf_parentheses`] uses for the rules it introduces.
pub const DEFAULT_SYMBOL_NAME: &str = "<symbol>";

/// Return `symbol_name` if it is not yet defined in `grammar`, otherwise the
/// first of `<name-1>`, `<name-2>`, ... that is free.
pub fn new_symbol(grammar: &Grammar, symbol_name: &str) -> String {
    if !grammar.contains(symbol_name) {
        return symbol_name.to_string();
    }

    let stem = symbol_name.strip_suffix('>').unwrap_or(symbol_name);

    (1..)
        .map(|count| format!("{}-{}>", stem, count))
        .find(|tentative| !grammar.contains(tentative))
        .unwrap_or_default()
}

/// Copy `grammar` and add (or replace) the rules of `extension`.
pub fn extend_grammar(grammar: &Grammar, extension: &Grammar) -> Grammar {
    let mut new_grammar = grammar.clone();

    for (symbol, expansions) in extension.rules() {
        new_grammar.insert(symbol, expansions.iter().cloned());
    }

    new_grammar
}

/// Flat groups followed by an operator, e.g. `(.<integer>)?`.
pub fn parenthesized_expressions(expansion: &str) -> Vec<&str> {
    RE_PARENTHESIZED_EXPR.find_iter(expansion).map(|m| m.as_str()).collect()
}

/// Non-terminals followed by an operator, e.g. `<digit>+`.
pub fn extended_nonterminals(expansion: &str) -> Vec<&str> {
    RE_EXTENDED_NONTERMINAL.find_iter(expansion).map(|m| m.as_str()).collect()
}

/// Replace every group `(...)op` by a fresh non-terminal `<symbol>op` whose single
/// expansion is the content of the group. Nested groups are resolved inside-out.
pub fn convert_ebnf_parentheses(ebnf_grammar: &Grammar) -> Grammar {
    let mut grammar = ebnf_grammar.clone();

    for (nonterminal, expansions) in ebnf_grammar.rules() {
        for (i, expansion) in expansions.iter().enumerate() {
            let mut expansion = expansion.string().to_string();

            loop {
                let exprs = parenthesized_expressions(&expansion)
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>();

                if exprs.is_empty() {
                    break;
                }

                for expr in exprs {
                    let (operator, contents) = split_operator(&expr);
                    let contents = &contents[1..contents.len() - 1];
                    let new_sym = new_symbol(&grammar, DEFAULT_SYMBOL_NAME);

                    expansion = expansion.replacen(&expr, &format!("{}{}", new_sym, operator), 1);
                    log::trace!("{} -> {}", expr, new_sym);
                    grammar.insert(new_sym, [contents]);
                }
            }

            if let Some(rules) = grammar.get_mut(nonterminal) {
                rules[i].set_string(expansion);
            }
        }
    }

    grammar
}

/// Replace every `<x>?`, `<x>*` and `<x>+` by a fresh non-terminal that
/// expands to zero or one, zero or more, one or more `<x>`.
pub fn convert_ebnf_operators(ebnf_grammar: &Grammar) -> Grammar {
    let mut grammar = ebnf_grammar.clone();

    for (nonterminal, expansions) in ebnf_grammar.rules() {
        for (i, expansion) in expansions.iter().enumerate() {
            let mut converted = expansion.string().to_string();

            for extended_symbol in extended_nonterminals(expansion.string()) {
                let (operator, original_symbol) = split_operator(extended_symbol);
                let new_sym = new_symbol(&grammar, original_symbol);

                converted = converted.replacen(extended_symbol, &new_sym, 1);
                log::trace!("{} -> {}", extended_symbol, new_sym);

                let new_expansions = match operator {
                    '?' => vec![String::new(), original_symbol.to_string()],
                    '*' => vec![String::new(), format!("{}{}", original_symbol, new_sym)],
                    _ => vec![original_symbol.to_string(), format!("{}{}", original_symbol, new_sym)],
                };
                grammar.insert(new_sym, new_expansions);
            }

            if let Some(rules) = grammar.get_mut(nonterminal) {
                rules[i].set_string(converted);
            }
        }
    }

    grammar
}

/// Convert a grammar in extended BNF into a pure context-free grammar.
/// The input is not modified.
pub fn convert_ebnf_grammar(ebnf_grammar: &Grammar) -> Grammar {
    convert_ebnf_operators(&convert_ebnf_parentheses(ebnf_grammar))
}

/// Split `x?` into `('?', "x")`. Both patterns guarantee a trailing ASCII operator.
fn split_operator(s: &str) -> (char, &str) {
    let (body, operator) = s.split_at(s.len() - 1);
    (operator.chars().next().unwrap_or('?'), body)
}
