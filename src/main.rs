// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::Arc;

use loctrans::app_config::{Config, LogLevel};
use loctrans::providers::openai::OpenAI;
use loctrans::providers::Provider;
use loctrans::{AppError, Orchestrator, RunOptions};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage, extract, translate and emit (default command)
    Run(RunArgs),

    /// Print record counts from the store
    Stats(CommonArgs),

    /// Mark translated records as pending so the next run translates them again
    Reset {
        #[command(flatten)]
        common: CommonArgs,

        /// Content ids to reset
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Send a minimal request to check the API key and endpoint
    Check(CommonArgs),

    /// Generate shell completions for loctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Game or mod root containing the Localization folder
    #[arg(short, long)]
    game_root: Option<String>,

    /// Output file path
    #[arg(short, long)]
    output: Option<String>,

    /// Maximum concurrent API requests
    #[arg(short, long)]
    workers: Option<usize>,

    /// Extract and emit without calling the API
    #[arg(long)]
    skip_translation: bool,

    /// Do not import translations from the reference language folder
    #[arg(long)]
    no_seed: bool,
}

/// loctrans - incremental translation of XML localization packs
///
/// Collects `<content contentuid="...">` strings from a language pack into a
/// local SQLite store, translates the new ones through an OpenAI-compatible
/// API and writes one merged translation file.
#[derive(Parser, Debug)]
#[command(name = "loctrans")]
#[command(version)]
#[command(about = "Incremental AI translation of XML localization packs")]
#[command(long_about = "loctrans collects localization strings into a local store, translates new ones and emits a merged file.

EXAMPLES:
    loctrans                                  # Run with conf.json
    loctrans run -g ./MyMod -w 8              # Override game root and worker count
    loctrans run --skip-translation           # Extract and emit only
    loctrans stats                            # Show pending and complete counts
    loctrans reset <ID> <ID>                  # Translate these records again next run
    loctrans check                            # Verify API key and endpoint
    loctrans completions bash > loctrans.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically. Re-running is safe: records that
    are already translated are never sent to the API again.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run_cli(CommandLineOptions::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_cli(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "loctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_pipeline(args).await,
        None => run_pipeline(cli.run).await,
        Some(Commands::Stats(common)) => {
            let config = load_config(&common)?;
            let store = Orchestrator::new(config).open_store()?;
            println!("{}", store.stats().await?);
            Ok(())
        }
        Some(Commands::Reset { common, ids }) => {
            let config = load_config(&common)?;
            let store = Orchestrator::new(config).open_store()?;

            let mut reset = 0;
            for id in &ids {
                if store.reset_translation(id).await? {
                    reset += 1;
                } else {
                    warn!("No translated record for {}", id);
                }
            }
            info!("Reset {} of {} records", reset, ids.len());
            Ok(())
        }
        Some(Commands::Check(common)) => {
            let config = load_config(&common)?;
            config.validate(true).context("Configuration validation failed")?;

            let provider = build_provider(&config);
            provider
                .test_connection()
                .await
                .map_err(AppError::from)
                .context("Connection check failed")?;
            info!(
                "Connected to {} using model {}",
                config.translation.base_url, config.translation.model
            );
            Ok(())
        }
    }
}

async fn run_pipeline(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;

    if let Some(game_root) = args.game_root {
        config.game_root = game_root;
    }
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if let Some(workers) = args.workers {
        config.translation.max_workers = workers;
    }

    let mut options = RunOptions::from_config(&config);
    options.skip_translation = args.skip_translation;
    if args.no_seed {
        options.seed = false;
    }

    config
        .validate(!options.skip_translation)
        .context("Configuration validation failed")?;

    let mut orchestrator = Orchestrator::new(config.clone());
    if !options.skip_translation {
        orchestrator = orchestrator.with_provider(build_provider(&config));
    }

    let summary = orchestrator.run(&options).await?;

    if let Some(dispatch) = &summary.dispatch {
        if !dispatch.failed.is_empty() {
            warn!(
                "{} records are still pending; run again to retry them",
                dispatch.failed.len()
            );
        }
    }

    Ok(())
}

/// Load the config file and apply the log level
fn load_config(args: &CommonArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&args.config)?;

    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

fn build_provider(config: &Config) -> Arc<dyn Provider> {
    let translation = &config.translation;
    Arc::new(
        OpenAI::new(
            translation.api_key.clone(),
            translation.base_url.clone(),
            translation.model.clone(),
            translation.timeout_secs,
        )
        .with_temperature(translation.temperature)
        .with_prompt_prefix(translation.prompt_prefix.clone()),
    )
}
