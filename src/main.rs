//! CLI entry point for the post office series tool.
//!
//! Turns the historical post office table into a per-state yearly series of
//! established, discontinued and operating counts for choropleth maps.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use post_office_series::config::PipelineConfig;
use post_office_series::output::{print_json, print_pretty, write_json};
use post_office_series::pipeline;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "post_office_series")]
#[command(about = "Builds per-state post office time series for choropleth maps", long_about = None)]
struct Cli {
    /// Defaults to `process` with the standard file names
    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Process {
            inputs: InputArgs::default(),
            output: None,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the processed CSV
    Process {
        #[command(flatten)]
        inputs: InputArgs,

        /// CSV file to write the series to
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Run the pipeline and report per-state totals without writing the CSV
    Summary {
        #[command(flatten)]
        inputs: InputArgs,

        /// Write the summary JSON here instead of logging it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct InputArgs {
    /// JSON file with input/output paths; explicit flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Post office records (state, established, discontinued)
    #[arg(long, value_name = "FILE")]
    facilities: Option<PathBuf>,

    /// State metadata keyed by code
    #[arg(long, value_name = "FILE")]
    codes: Option<PathBuf>,

    /// Map identifiers keyed by state name
    #[arg(long, value_name = "FILE")]
    geo: Option<PathBuf>,
}

impl InputArgs {
    fn resolve(self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => PipelineConfig::default(),
        };

        Ok(base
            .with_facilities(self.facilities)
            .with_regions(self.codes)
            .with_geo(self.geo))
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/post_office_series.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("post_office_series.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.into_command() {
        Commands::Process { inputs, output } => {
            let config = inputs.resolve()?.with_output(output);
            print_pretty(&config);

            let summary = pipeline::run(&config).context("post office pipeline failed")?;
            info!(
                output = %config.output.display(),
                regions = summary.regions.len(),
                rows = summary.rows,
                dropped = summary.dropped,
                remapped = summary.remapped,
                "Processed series written"
            );
        }
        Commands::Summary { inputs, output } => {
            let config = inputs.resolve()?;
            print_pretty(&config);

            let built = pipeline::build(&config).context("post office pipeline failed")?;
            match output {
                Some(path) => write_json(&path, &built.summary)
                    .with_context(|| format!("failed to write summary '{}'", path.display()))?,
                None => print_json(&built.summary)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use post_office_series::config::{FACILITIES_FILE, OUTPUT_FILE};

    #[test]
    fn test_no_subcommand_runs_process_with_default_files() {
        let cli = Cli::try_parse_from(["post_office_series"]).unwrap();

        match cli.into_command() {
            Commands::Process { inputs, output } => {
                assert!(output.is_none());
                let config = inputs.resolve().unwrap().with_output(output);
                assert_eq!(config.facilities, Path::new(FACILITIES_FILE));
                assert_eq!(config.output, Path::new(OUTPUT_FILE));
            }
            Commands::Summary { .. } => panic!("expected process"),
        }
    }

    #[test]
    fn test_process_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "post_office_series",
            "process",
            "--facilities",
            "data/po.csv",
            "--output",
            "out.csv",
        ])
        .unwrap();

        match cli.into_command() {
            Commands::Process { inputs, output } => {
                let config = inputs.resolve().unwrap().with_output(output);
                assert_eq!(config.facilities, Path::new("data/po.csv"));
                assert_eq!(config.output, Path::new("out.csv"));
            }
            Commands::Summary { .. } => panic!("expected process"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
