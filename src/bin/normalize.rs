use clap::Parser;
use treefuzz::{
    backends::json::JsonGenerator,
    grammar::Grammar,
};

/// Convert the EBNF operators of grammars into plain rules and write the result as one grammar
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grammar files in JSON format. Their rules are merged.
    #[arg(long, required = true)]
    grammar: Vec<String>,

    #[arg(short, long, required = true)]
    output: String,

    #[arg(short, long)]
    start: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let mut builder = Grammar::builder();

    for path in &args.grammar {
        builder = builder.json_grammar(path)?;
    }

    if let Some(start) = args.start {
        builder = builder.start_symbol(start);
    }

    let grammar = builder.build()?;
    JsonGenerator::new().generate(&args.output, &grammar)?;

    log::info!("Wrote {} rules to {}", grammar.len(), args.output);

    Ok(())
}
