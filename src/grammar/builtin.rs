//! Ready-made grammars. Handy for trying out the generators and as test subjects.

use crate::grammar::Grammar;

/// One expansion per character of `characters`.
pub fn srange(characters: &str) -> Vec<String> {
    characters.chars().map(String::from).collect()
}

/// One expansion per character in the inclusive range `start..=end`.
pub fn crange(start: char, end: char) -> Vec<String> {
    (start..=end).map(String::from).collect()
}

/// A single decimal digit.
pub fn digit_grammar() -> Grammar {
    [("<start>", srange("0123456789"))].into_iter().collect()
}

/// Arithmetic expressions.
pub fn expr_grammar() -> Grammar {
    [
        ("<start>", vec!["<expr>".to_string()]),
        ("<expr>", vec!["<term> + <expr>".into(), "<term> - <expr>".into(), "<term>".into()]),
        ("<term>", vec!["<factor> * <term>".into(), "<factor> / <term>".into(), "<factor>".into()]),
        ("<factor>", vec![
            "+<factor>".into(),
            "-<factor>".into(),
            "(<expr>)".into(),
            "<integer>.<integer>".into(),
            "<integer>".into(),
        ]),
        ("<integer>", vec!["<digit><integer>".into(), "<digit>".into()]),
        ("<digit>", srange("0123456789")),
    ].into_iter().collect()
}

/// Arithmetic expressions, written with EBNF operators.
pub fn expr_ebnf_grammar() -> Grammar {
    [
        ("<start>", vec!["<expr>".to_string()]),
        ("<expr>", vec!["<term> + <expr>".into(), "<term> - <expr>".into(), "<term>".into()]),
        ("<term>", vec!["<factor> * <term>".into(), "<factor> / <term>".into(), "<factor>".into()]),
        ("<factor>", vec!["<sign>?<factor>".into(), "(<expr>)".into(), "<integer>(.<integer>)?".into()]),
        ("<sign>", vec!["+".into(), "-".into()]),
        ("<integer>", vec!["<digit>+".into()]),
        ("<digit>", srange("0123456789")),
    ].into_iter().collect()
}

/// A small subset of URLs.
pub fn url_grammar() -> Grammar {
    [
        ("<start>", vec!["<url>"]),
        ("<url>", vec!["<scheme>://<authority><path><query>"]),
        ("<scheme>", vec!["http", "https", "ftp", "ftps"]),
        ("<authority>", vec!["<host>", "<host>:<port>", "<userinfo>@<host>", "<userinfo>@<host>:<port>"]),
        ("<host>", vec!["cispa.saarland", "www.google.com", "fuzzingbook.com"]),
        ("<port>", vec!["80", "8080", "<nat>"]),
        ("<nat>", vec!["<digit>", "<digit><digit>"]),
        ("<digit>", vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]),
        ("<userinfo>", vec!["user:password"]),
        ("<path>", vec!["", "/", "/<id>"]),
        ("<id>", vec!["abc", "def", "x<digit><digit>"]),
        ("<query>", vec!["", "?<params>"]),
        ("<params>", vec!["<param>", "<param>&<params>"]),
        ("<param>", vec!["<id>=<id>", "<id>=<nat>"]),
    ].into_iter().collect()
}

/// Book titles.
pub fn title_grammar() -> Grammar {
    [
        ("<start>", vec!["<title>"]),
        ("<title>", vec!["<topic>: <subtopic>"]),
        ("<topic>", vec!["Generating Software Tests", "<fuzzing-prefix>Fuzzing", "The Fuzzing Book"]),
        ("<fuzzing-prefix>", vec!["", "The Art of ", "The Joy of "]),
        ("<subtopic>", vec![
            "<subtopic-main>",
            "<subtopic-prefix><subtopic-main>",
            "<subtopic-main><subtopic-suffix>",
        ]),
        ("<subtopic-main>", vec![
            "Breaking Software",
            "Generating Software Tests",
            "Principles, Techniques and Tools",
        ]),
        ("<subtopic-prefix>", vec!["", "Tools and Techniques for "]),
        ("<subtopic-suffix>", vec![
            " for <reader-property> and <reader-property>",
            " for <software-property> and <software-property>",
        ]),
        ("<reader-property>", vec!["Fun", "Profit"]),
        ("<software-property>", vec!["Robustness", "Reliability", "Security"]),
    ].into_iter().collect()
}

/// CGI-encoded strings.
pub fn cgi_grammar() -> Grammar {
    [
        ("<start>", vec!["<string>".to_string()]),
        ("<string>", vec!["<letter>".into(), "<letter><string>".into()]),
        ("<letter>", vec!["<plus>".into(), "<percent>".into(), "<other>".into()]),
        ("<plus>", vec!["+".into()]),
        ("<percent>", vec!["%<hexdigit><hexdigit>".into()]),
        ("<hexdigit>", srange("0123456789abcdef")),
        ("<other>", srange("012345abcde-_")),
    ].into_iter().collect()
}

/// Look up a built-in grammar by name.
pub fn by_name(name: &str) -> Option<Grammar> {
    match name {
        "digit" => Some(digit_grammar()),
        "expr" => Some(expr_grammar()),
        "expr-ebnf" => Some(expr_ebnf_grammar()),
        "url" => Some(url_grammar()),
        "title" => Some(title_grammar()),
        "cgi" => Some(cgi_grammar()),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["digit", "expr", "expr-ebnf", "url", "title", "cgi"];
