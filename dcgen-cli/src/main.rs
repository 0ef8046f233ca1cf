use anyhow::{Context, Result};
use clap::Parser;
use dcgen_core::{
    Config, Generator, GofmtFormatter, PassthroughFormatter, SkipLists, SkipSet, SourceFormatter,
};
use dcgen_model::load_model;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dcgen")]
#[command(version = "0.2.0")]
#[command(about = "Generate deep-copy methods for Go types", long_about = None)]
struct Cli {
    /// Unit description file (JSON)
    #[arg(value_name = "UNIT")]
    unit: PathBuf,

    /// Target type to generate, repeatable; output follows this order
    #[arg(short = 't', long = "type", value_name = "NAME", required = true)]
    types: Vec<String>,

    /// Comma-separated skip paths for the matching --type, by position
    /// (e.g. --skip "Tags[i],Index[k]")
    #[arg(long = "skip", value_name = "PATHS")]
    skips: Vec<String>,

    /// Generate pointer receivers
    #[arg(short = 'p', long)]
    pointer_receiver: bool,

    /// Method name to generate and to search for when reusing
    #[arg(short, long, default_value = "DeepCopy")]
    method: String,

    /// Maximum recursion depth, 0 = unbounded
    #[arg(short = 'd', long, default_value = "0", value_name = "N")]
    max_depth: usize,

    /// Configuration file (JSON); replaces the generation flags above
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Formatter program to pipe the output through
    #[arg(long, default_value = "gofmt", value_name = "PROG")]
    formatter: String,

    /// Skip the external formatter entirely
    #[arg(long)]
    no_format: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config {
            pointer_receiver: cli.pointer_receiver,
            method_name: cli.method.clone(),
            max_depth: cli.max_depth,
            skip_lists: parse_skip_lists(&cli.skips),
        },
    };

    let (model, unit) = load_model(&cli.unit)
        .with_context(|| format!("loading unit description {}", cli.unit.display()))?;

    let formatter: Box<dyn SourceFormatter> = if cli.no_format {
        Box::new(PassthroughFormatter)
    } else {
        Box::new(GofmtFormatter::with_program(&cli.formatter))
    };

    let invocation = std::env::args().collect::<Vec<_>>().join(" ");
    let output = Generator::new(&model, config)
        .with_invocation(&invocation)
        .generate(unit, &cli.types, formatter.as_ref())?;
    log::debug!("generated {} bytes", output.len());

    match &cli.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}

/// One --skip value per --type, split on commas.
fn parse_skip_lists(raw: &[String]) -> SkipLists {
    SkipLists(
        raw.iter()
            .map(|list| {
                SkipSet::from_paths(
                    list.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string),
                )
            })
            .collect(),
    )
}
