use clap::Parser;
use std::io::{stdout, BufWriter, Write};
use treefuzz::{
    config::MutationConfig,
    fuzzer::{Fuzzer, PrintRunner},
    mutation::MutationFuzzer,
};

/// Print the seed inputs followed by random mutations of them, one per line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mutation settings in JSON format. Flags override them.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    min_mutations: Option<usize>,

    #[arg(long)]
    max_mutations: Option<usize>,

    #[arg(long, short, default_value_t = 10)]
    count: usize,

    #[arg(long, short)]
    seed: Option<u64>,

    #[arg(required = true)]
    seeds: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MutationConfig::load_from_file(path)?,
        None => MutationConfig::default(),
    };

    if let Some(min_mutations) = args.min_mutations {
        config.min_mutations = min_mutations;
    }

    if let Some(max_mutations) = args.max_mutations {
        config.max_mutations = max_mutations;
    }

    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut fuzzer = MutationFuzzer::new(args.seeds, &config)?;
    let mut runner = PrintRunner::new(BufWriter::new(stdout()));
    fuzzer.runs(&mut runner, args.count)?;
    runner.into_inner().flush()?;

    Ok(())
}
