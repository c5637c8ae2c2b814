use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use json_comments::{CommentSettings, StripComments};
use serde_json as json;

use crate::{
    error::{GrammarError, ParsingError},
    grammar::{Expansion, Grammar, Options},
};

fn structure_error<S: Into<String>>(symbol: &str, reason: S) -> GrammarError {
    GrammarError::Structure {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

fn parse_expansion(key: &str, value: &json::Value) -> Result<Expansion, GrammarError> {
    match value {
        json::Value::String(string) => Ok(Expansion::new(string.as_str())),
        json::Value::Array(pair) => {
            let [string, opts] = pair.as_slice() else {
                return Err(structure_error(key, format!("{}: not a (string, options) pair", value)));
            };

            let Some(string) = string.as_str() else {
                return Err(structure_error(key, format!("{}: not a string", string)));
            };

            let opts = match opts {
                json::Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Options>(),
                json::Value::Null => Options::new(),
                _ => return Err(structure_error(key, format!("{}: options must be an object", opts))),
            };

            Ok(Expansion::with_opts(string, opts))
        },
        _ => Err(structure_error(key, format!("{}: not a string", value))),
    }
}

/// Convert a JSON value of the form `{"<symbol>": ["expansion", ["expansion", {options}], ...]}`
/// into a grammar.
pub(crate) fn parse_grammar(value: &json::Value) -> Result<Grammar, GrammarError> {
    let object = match value {
        json::Value::Object(object) => object,
        _ => return Err(structure_error("", "Grammar must be specified as an object")),
    };

    let mut grammar = Grammar::new();

    for (key, value) in object {
        // RHS must be a non-empty array of strings or (string, options) pairs
        let rhs = match value {
            json::Value::Array(rhs) => rhs,
            _ => return Err(structure_error(key, "expansion is not a list")),
        };

        if rhs.is_empty() {
            return Err(structure_error(key, "expansion list empty"));
        }

        let expansions = rhs
            .iter()
            .map(|expansion| parse_expansion(key, expansion))
            .collect::<Result<Vec<_>, _>>()?;

        grammar.insert(key.as_str(), expansions);
    }

    Ok(grammar)
}

/// Read a JSON value from `path`. C-style comments are allowed.
pub(crate) fn read_json(path: &Path) -> Result<json::Value, ParsingError> {
    let file = File::open(path).map_err(|e| ParsingError::new(path, format!("Could not open file: {}", e)))?;
    let reader = BufReader::new(file);
    let reader = StripComments::with_settings(CommentSettings::c_style(), reader);

    json::from_reader(reader).map_err(|e| ParsingError::new(path, format!("Invalid JSON syntax: {}", e)))
}

/// Load a grammar file from disk.
pub(crate) fn parse_json(path: &Path) -> Result<Grammar, GrammarError> {
    let value = read_json(path)?;
    parse_grammar(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file() {
        let grammar = parse_json(Path::new("test-data/grammars/expr-ebnf.json")).unwrap();
        assert_eq!(grammar.len(), 7);
        assert_eq!(grammar.symbols().next(), Some("<start>"));
        assert_eq!(grammar.get("<integer>").unwrap()[0].string(), "<digit>+");
    }

    #[test]
    fn test_options() {
        let value = json::json!({
            "<start>": [["<a>", {"prob": 0.5}], "b"],
            "<a>": [["a", null]],
        });
        let grammar = parse_grammar(&value).unwrap();
        let start = grammar.get("<start>").unwrap();
        assert_eq!(start[0].string(), "<a>");
        assert_eq!(start[0].opts().get("prob"), Some(&json::json!(0.5)));
        assert!(start[1].opts().is_empty());
        assert!(grammar.get("<a>").unwrap()[0].opts().is_empty());
    }

    #[test]
    fn test_structure_errors() {
        for value in [
            json::json!(["<start>"]),
            json::json!({"<start>": "a"}),
            json::json!({"<start>": []}),
            json::json!({"<start>": [1]}),
            json::json!({"<start>": [["a", {}, 3]]}),
            json::json!({"<start>": [["a", "not options"]]}),
        ] {
            assert!(
                matches!(parse_grammar(&value), Err(GrammarError::Structure { .. })),
                "{}",
                value,
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_json(Path::new("test-data/grammars/does-not-exist.json")).unwrap_err();
        assert!(matches!(err, GrammarError::Parsing(_)));
    }

    #[test]
    fn test_invalid_syntax() {
        let err = parse_json(Path::new("test-data/grammars/broken-syntax.json")).unwrap_err();
        assert!(matches!(err, GrammarError::Parsing(_)));
    }
}
