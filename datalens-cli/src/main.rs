use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use datalens_common::Config;
use datalens_core::{
    export_json, export_parquet, export_summary_csv, load_batches, load_table, print_summary,
    profile_with, write_json, DatalensError, LoadOptions, Profile, ProfileOptions,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// reject 0 at CLI parse time
fn parse_bins(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("not a positive integer: {s}"))?;
    if v >= 1 {
        Ok(v)
    } else {
        Err("bins must be at least 1".into())
    }
}

#[derive(Parser)]
#[command(name = "datalens", version, about = "Statistical profiles of CSV and Parquet tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
    Parquet,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full profile as JSON
    Profile {
        path: PathBuf,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        compact: bool,
    },
    /// Print a per-column summary table
    Summary {
        path: PathBuf,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
    },
    /// Write the profile (json, csv) or the table itself (parquet) to a file
    Export {
        path: PathBuf,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the config file location, optionally writing defaults there
    Config {
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(config: &Config) {
    // RUST_LOG wins over the config file; logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("warning: ignoring config file: {e}");
            Config::default()
        }
    };
    init_tracing(&config);
    match cli.command {
        Commands::Profile { path, bins, output, compact } => {
            run_profile(&path, bins, output.as_deref(), compact, &config)?
        }
        Commands::Summary { path, bins } => run_summary(&path, bins, &config)?,
        Commands::Export { path, format, output } => run_export(&path, format, output, &config)?,
        Commands::Config { init } => run_config(init, &config)?,
    }
    Ok(())
}

fn build_profile(path: &Path, bins: Option<usize>, config: &Config) -> anyhow::Result<Profile> {
    let table = load_table(path, &LoadOptions::from(&config.loader)).map_err(|e| describe(path, e))?;
    let mut opts = ProfileOptions::from(&config.profiling);
    if let Some(b) = bins {
        opts.hist_bins = b;
    }
    profile_with(&table, &opts).map_err(|e| describe(path, e))
}

/// user-facing errors keep their own message; everything else gets the file as context
fn describe(path: &Path, e: DatalensError) -> anyhow::Error {
    if e.is_user_facing() {
        anyhow::anyhow!("{e}")
    } else {
        anyhow::Error::new(e).context(format!("failed to read {}", path.display()))
    }
}

fn run_profile(
    path: &Path,
    bins: Option<usize>,
    output: Option<&Path>,
    compact: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let profile = build_profile(path, bins, config)?;
    match output {
        Some(out) => {
            let file = std::fs::File::create(out)
                .with_context(|| format!("cannot create {}", out.display()))?;
            write_json(std::io::BufWriter::new(file), &profile, !compact)?;
        }
        None => {
            write_json(std::io::stdout().lock(), &profile, !compact)?;
            println!();
        }
    }
    Ok(())
}

fn run_summary(path: &Path, bins: Option<usize>, config: &Config) -> anyhow::Result<()> {
    let profile = build_profile(path, bins, config)?;
    print_summary(&profile)?;
    Ok(())
}

fn default_output(path: &Path, config: &Config, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".into());
    PathBuf::from(&config.export.output_dir).join(format!("{stem}{suffix}"))
}

fn run_export(
    path: &Path,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    let format = match format {
        Some(f) => f,
        None => ExportFormat::from_str(&config.export.format, true)
            .map_err(|e| anyhow::anyhow!("export.format in config: {e}"))?,
    };
    match format {
        ExportFormat::Json => {
            let out = output.unwrap_or_else(|| default_output(path, config, "_profile.json"));
            export_json(&out, &build_profile(path, None, config)?)?;
            println!("{}", out.display());
        }
        ExportFormat::Csv => {
            let out = output.unwrap_or_else(|| default_output(path, config, "_profile.csv"));
            export_summary_csv(&out, &build_profile(path, None, config)?)?;
            println!("{}", out.display());
        }
        ExportFormat::Parquet => {
            let out = output.unwrap_or_else(|| default_output(path, config, ".parquet"));
            anyhow::ensure!(out != path, "refusing to overwrite the input file {}", path.display());
            let (schema, batches) =
                load_batches(path, &LoadOptions::from(&config.loader)).map_err(|e| describe(path, e))?;
            export_parquet(&out, schema, &batches)?;
            println!("{}", out.display());
        }
    }
    Ok(())
}

fn run_config(init: bool, config: &Config) -> anyhow::Result<()> {
    let path = Config::resolved_path();
    if init {
        anyhow::ensure!(!path.exists(), "{} already exists", path.display());
        config.save()?;
    }
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn zero_bins_rejected_at_parse_time() {
        assert!(parse_bins("0").is_err());
        assert!(parse_bins("-3").is_err());
        assert_eq!(parse_bins("12"), Ok(12));
        assert!(Cli::try_parse_from(["datalens", "profile", "x.csv", "--bins", "0"]).is_err());
    }

    #[test]
    fn export_format_from_config_string() {
        assert!(ExportFormat::from_str("CSV", true).is_ok_and(|f| f == ExportFormat::Csv));
        assert!(ExportFormat::from_str("xlsx", true).is_err());
    }
}
