use serde::ser::Serialize;
use serde_json::{
    ser::PrettyFormatter,
    Map,
    Serializer,
    Value,
};
use std::{
    fs::File,
    io::Write,
    path::Path,
};

use crate::{
    error::ParsingError,
    grammar::{Expansion, Grammar},
};

fn expansion_value(expansion: &Expansion) -> Value {
    if expansion.opts().is_empty() {
        return Value::String(expansion.string().to_string());
    }

    let opts = expansion.opts().iter().map(|(key, value)| (key.clone(), value.clone())).collect::<Map<_, _>>();
    Value::Array(vec![Value::String(expansion.string().to_string()), Value::Object(opts)])
}

/// This is the main struct of the [`json`](crate::backends::json) backend that turns a grammar into JSON.
pub struct JsonGenerator {
    indent: Vec<u8>,
}

impl JsonGenerator {
    /// Create a new JsonGenerator that indents with four spaces.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            indent: b"    ".to_vec(),
        }
    }

    /// The JSON representation of `grammar`. Rules keep their order.
    pub fn to_value(&self, grammar: &Grammar) -> Value {
        let mut object = Map::new();

        for (symbol, expansions) in grammar.rules() {
            object.insert(symbol.to_string(), Value::Array(expansions.iter().map(expansion_value).collect()));
        }

        Value::Object(object)
    }

    /// Pretty-print `grammar` into `stream`.
    pub fn write<W: Write>(&self, stream: &mut W, grammar: &Grammar) -> std::io::Result<()> {
        let formatter = PrettyFormatter::with_indent(&self.indent);
        let mut ser = Serializer::with_formatter(&mut *stream, formatter);
        self.to_value(grammar).serialize(&mut ser)?;
        writeln!(stream)
    }

    /// Write the rules of the supplied `grammar` into the output file `path`.
    pub fn generate<P: AsRef<Path>>(&self, path: P, grammar: &Grammar) -> Result<(), ParsingError> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| ParsingError::new(path, format!("Could not open output file: {}", e)))?;
        self.write(&mut file, grammar).map_err(|e| ParsingError::new(path, format!("Could not write to output file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{builtin, convert_ebnf_grammar, Options};

    #[test]
    fn test_generator() {
        let grammar = convert_ebnf_grammar(&builtin::expr_ebnf_grammar());
        let path = std::env::temp_dir().join("treefuzz-test-generator.json");
        JsonGenerator::new().generate(&path, &grammar).unwrap();

        let loaded = Grammar::builder().json_grammar(&path).unwrap().normalize(false).build().unwrap();
        assert_eq!(loaded, grammar);
    }

    #[test]
    fn test_options_become_pairs() {
        let mut opts = Options::new();
        opts.insert("prob".to_string(), serde_json::json!(0.5));

        let mut grammar = Grammar::new();
        grammar.insert("<start>", vec![Expansion::with_opts("<a>", opts), Expansion::new("b")]);
        grammar.insert("<a>", vec!["a"]);

        let mut buf = Vec::new();
        JsonGenerator::new().write(&mut buf, &grammar).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, serde_json::json!({
            "<start>": [["<a>", {"prob": 0.5}], "b"],
            "<a>": ["a"],
        }));
    }
}
