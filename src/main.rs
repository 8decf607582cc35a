//! locale-core: validação e tradução em lote dos arquivos de locale JSON.

mod config;
mod error;
mod model;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use config::ToolConfig;
use services::ai::ProviderKind;
use services::pipeline::{self, TranslateOptions};
use services::{qa, report};

#[derive(Parser)]
#[command(name = "locale-core")]
#[command(version)]
#[command(about = "Validate and machine-translate JSON locale files")]
struct Cli {
    /// Directory holding <code>.json locale files
    #[arg(long, global = true, value_name = "DIR")]
    locales_dir: Option<PathBuf>,

    /// JSON config file (all fields optional)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every target locale with the source locale
    Validate {
        /// Warnings also fail the run
        #[arg(long)]
        strict: bool,

        /// Only check this locale
        #[arg(long, value_name = "CODE")]
        locale: Option<String>,

        /// Where to write the JSON report
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Translate missing or untranslated keys with an LLM provider
    Translate {
        /// Only translate this locale
        #[arg(long, value_name = "CODE")]
        locale: Option<String>,

        #[arg(long, value_enum, default_value = "openai")]
        provider: ProviderArg,

        /// Override the provider's default model
        #[arg(long)]
        model: Option<String>,

        /// Show what would be translated without calling the provider
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Anthropic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Anthropic => ProviderKind::Anthropic,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ToolConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ToolConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ToolConfig::default(),
    };

    if let Some(dir) = &cli.locales_dir {
        cfg.locales_dir = dir.clone();
    }

    Ok(cfg)
}

fn run(cli: Cli) -> Result<bool> {
    let mut cfg = load_config(&cli)?;

    match cli.command {
        Commands::Validate {
            strict,
            locale,
            report: report_path,
        } => {
            if let Some(path) = report_path {
                cfg.report_path = path;
            }

            let validation = qa::run(&cfg, locale.as_deref(), strict).context("validation aborted")?;
            report::write(&validation, &cfg.report_path).context("writing validation report")?;
            report::print(&validation, &cfg);

            Ok(validation.is_success())
        }

        Commands::Translate {
            locale,
            provider,
            model,
            dry_run,
        } => {
            let opts = TranslateOptions {
                provider: provider.into(),
                model: model.as_deref(),
                locale: locale.as_deref(),
                dry_run,
            };

            let results = pipeline::run(&cfg, &opts).context("translation aborted")?;
            report::print_translation(&results, &cfg, dry_run);

            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
