use clap::{builder::PossibleValuesParser, Parser};
use std::io::{stdout, BufWriter, Write};
use treefuzz::{
    config::GeneratorConfig,
    fuzzer::{Fuzzer, PrintRunner},
    generator::{GrammarFuzzer, SimpleGrammarFuzzer},
    grammar::{builtin, Grammar},
};

/// Generate inputs from a grammar, one per line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grammar file in JSON format
    #[arg(long, value_name = "GRAMMAR", required_unless_present = "builtin", conflicts_with = "builtin")]
    grammar: Option<String>,

    /// Use a built-in grammar
    #[arg(long, value_parser = PossibleValuesParser::new(builtin::NAMES))]
    builtin: Option<String>,

    /// Generator settings in JSON format. Flags override them.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    min_nonterminals: Option<usize>,

    #[arg(long)]
    max_nonterminals: Option<usize>,

    #[arg(long, short, default_value_t = 1)]
    count: usize,

    #[arg(long, short)]
    seed: Option<u64>,

    /// Keep EBNF operators as literal text
    #[arg(long, default_value_t = false)]
    no_normalize: bool,

    #[arg(long, default_value_t = false)]
    precompute_costs: bool,

    #[arg(long, default_value_t = false)]
    cache_expansions: bool,

    /// Use the string-rewriting generator instead of derivation trees
    #[arg(long, default_value_t = false)]
    simple: bool,
}

fn load_config(args: &Args) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load_from_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(start) = &args.start {
        config.start_symbol = start.clone();
    }

    if let Some(min_nonterminals) = args.min_nonterminals {
        config.min_nonterminals = min_nonterminals;
    }

    if let Some(max_nonterminals) = args.max_nonterminals {
        config.max_nonterminals = max_nonterminals;
    }

    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.precompute_costs |= args.precompute_costs;
    config.cache_expansions |= args.cache_expansions;

    Ok(config)
}

fn load_grammar(args: &Args, config: &GeneratorConfig) -> Result<Grammar, Box<dyn std::error::Error>> {
    let mut builder = Grammar::builder()
        .start_symbol(&config.start_symbol)
        .normalize(!args.no_normalize);

    if let Some(path) = &args.grammar {
        builder = builder.json_grammar(path)?;
    }

    if let Some(name) = &args.builtin {
        let grammar = builtin::by_name(name).ok_or_else(|| format!("Unknown built-in grammar: {}", name))?;
        builder = builder.grammar(grammar)?;
    }

    Ok(builder.build()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let grammar = load_grammar(&args, &config)?;

    let mut runner = PrintRunner::new(BufWriter::new(stdout()));

    if args.simple {
        SimpleGrammarFuzzer::new(grammar, &config)?.runs(&mut runner, args.count)?;
    } else {
        GrammarFuzzer::new(grammar, &config)?.runs(&mut runner, args.count)?;
    }

    runner.into_inner().flush()?;

    Ok(())
}
