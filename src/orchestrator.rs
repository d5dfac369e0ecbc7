/*!
 * End-to-end run over a game or mod tree.
 *
 * One run stages the source-language files, extracts them into the store,
 * imports reference translations, translates what is still pending and
 * writes the merged output file. Every step only adds information to the
 * store, so running again after an interruption picks up where the last
 * run stopped.
 */

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::{ContentStore, StoreStats};
use crate::emitter;
use crate::errors::AppError;
use crate::extractor::{ExtractionReport, Extractor};
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::translation::{DispatchReport, TranslationDispatcher};

/// Per-run switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after extraction and seeding; emit what is already translated
    pub skip_translation: bool,
    /// Import the reference translation tree
    pub seed: bool,
    /// Draw a progress bar during dispatch
    pub show_progress: bool,
}

impl RunOptions {
    /// Options implied by the configuration file
    pub fn from_config(config: &Config) -> Self {
        Self {
            skip_translation: false,
            seed: config.seed_from_reference,
            show_progress: true,
        }
    }
}

/// Counts gathered over one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files moved into the input directory
    pub staged: usize,
    /// Source extraction counters
    pub extraction: ExtractionReport,
    /// Reference seeding counters, when seeding ran
    pub seeding: Option<ExtractionReport>,
    /// Dispatch outcome, when translation ran
    pub dispatch: Option<DispatchReport>,
    /// Entries written to the output file
    pub emitted: usize,
    /// Store totals after the run
    pub stats: StoreStats,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Staged files: {}", self.staged)?;
        writeln!(f, "Extraction: {}", self.extraction)?;
        match &self.seeding {
            Some(seeding) => writeln!(f, "Seeding: {}", seeding)?,
            None => writeln!(f, "Seeding: skipped")?,
        }
        match &self.dispatch {
            Some(dispatch) => writeln!(f, "Translation: {}", dispatch)?,
            None => writeln!(f, "Translation: skipped")?,
        }
        writeln!(f, "Emitted: {}", self.emitted)?;
        write!(f, "{}", self.stats)
    }
}

/// Drives a full run
pub struct Orchestrator {
    config: Config,
    provider: Option<Arc<dyn Provider>>,
}

impl Orchestrator {
    /// Create an orchestrator without a provider; only runs with
    /// `skip_translation` can succeed
    pub fn new(config: Config) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Use `provider` for the dispatch step
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ensure the working directories exist and open the store
    pub fn open_store(&self) -> Result<ContentStore> {
        FileManager::ensure_dir(&self.config.input_dir)?;

        ContentStore::open(&self.config.database_path)
            .with_context(|| format!("Failed to open store at {:?}", self.config.database_path))
    }

    /// Execute one run
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let store = self.open_store()?;
        let mut summary = RunSummary::default();

        // Stage
        summary.staged = FileManager::stage_language_files(
            self.config.localization_root(),
            &self.config.source_language,
            &self.config.input_dir,
        )?;
        info!("Staged {} {} files", summary.staged, self.config.source_language);

        let extractor = Extractor::new(store.clone());

        // Extract
        summary.extraction = extractor.extract_dir(&self.config.input_dir).await?;

        // Seed
        if options.seed {
            let reference_dir = self.config.reference_dir();
            if FileManager::dir_exists(&reference_dir) {
                summary.seeding = Some(extractor.seed_dir(&reference_dir).await?);
            } else {
                warn!("Reference folder not found, skipping seeding: {:?}", reference_dir);
                summary.seeding = Some(ExtractionReport::default());
            }
        }

        // Translate
        if !options.skip_translation {
            summary.dispatch = Some(self.dispatch(&store, options.show_progress).await?);
        }

        // Emit
        let complete = store.list_complete().await?;
        summary.emitted = emitter::write(Path::new(&self.config.output_file), &complete)?;

        summary.stats = store.stats().await?;

        info!(
            "Run finished in {:.1}s\n{}",
            start_time.elapsed().as_secs_f64(),
            summary
        );

        Ok(summary)
    }

    async fn dispatch(&self, store: &ContentStore, show_progress: bool) -> Result<DispatchReport> {
        let provider = self.provider.clone().ok_or_else(|| {
            AppError::Config("No translation provider configured".to_string())
        })?;

        let dispatcher = TranslationDispatcher::new(
            store.clone(),
            provider,
            self.config.translation.max_workers,
            Duration::from_secs(self.config.translation.timeout_secs),
        );

        let progress_bar = if show_progress {
            create_progress_bar()
        } else {
            ProgressBar::hidden()
        };

        let report = dispatcher
            .run(|done, total| {
                progress_bar.set_length(total as u64);
                progress_bar.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();
        report
    }
}

fn create_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} strings ({percent}%) {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}
