//! rxn-yields CLI: print one Buchwald–Hartwig reaction SMILES per table row.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use rxn_yields::{load_rows, Assembler, NativeToolkit, ReactionSettings};

/// Assemble reaction SMILES from a table of coupling conditions.
#[derive(Parser)]
#[command(name = "rxn-yields", version, about, long_about = None)]
struct Cli {
    /// Table of rows (.json array or .jsonl lines).
    table: PathBuf,

    /// Settings TOML with template, coreactant and catalyst.
    #[arg(short, long, env = "RXN_YIELDS_CONFIG")]
    config: Option<PathBuf>,

    /// Reaction SMARTS to apply instead of the configured one.
    #[arg(long)]
    template: Option<String>,

    /// Amine written into every reaction.
    #[arg(long)]
    coreactant: Option<String>,

    #[arg(long)]
    catalyst: Option<String>,

    /// Write reactions here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "lines")]
    format: OutputFormat,

    /// Log format: text (default) or json.
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Lines,
    Json,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "rxn_yields=warn",
        1 => "rxn_yields=info",
        2 => "rxn_yields=debug",
        _ => "rxn_yields=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn settings(cli: &Cli) -> Result<ReactionSettings> {
    let mut settings = match &cli.config {
        Some(path) => ReactionSettings::load(path)
            .wrap_err_with(|| format!("loading settings from {}", path.display()))?,
        None => ReactionSettings::default(),
    };
    if let Some(template) = &cli.template {
        settings.template = template.clone();
    }
    if let Some(coreactant) = &cli.coreactant {
        settings.coreactant = coreactant.clone();
    }
    if let Some(catalyst) = &cli.catalyst {
        settings.catalyst = catalyst.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    let settings = settings(&cli)?;
    let rows = load_rows(&cli.table)
        .wrap_err_with(|| format!("reading table {}", cli.table.display()))?;
    info!(rows = rows.len(), table = %cli.table.display(), "loaded rows");

    let reactions = Assembler::new(NativeToolkit, settings).run(&rows)?;

    let text = match cli.format {
        OutputFormat::Lines => reactions.iter().map(|r| format!("{r}\n")).collect::<String>(),
        OutputFormat::Json => serde_json::to_string_pretty(&reactions)? + "\n",
    };

    match &cli.output {
        Some(path) => std::fs::write(path, text)
            .wrap_err_with(|| format!("writing {}", path.display()))?,
        None => std::io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}
