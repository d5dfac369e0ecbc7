/*!
 * Bounded-concurrency translation of pending records.
 *
 * A dispatch pass takes one snapshot of the pending records and runs at most
 * `max_workers` provider calls at a time. Every successful result is written
 * back immediately, so an interrupted pass keeps whatever finished. Failures
 * are collected per record and never abort the pass.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::database::ContentStore;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Why a single record was not translated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// The provider did not answer within the per-call timeout
    #[error("timed out")]
    Timeout,

    /// The provider returned an error
    #[error("{0}")]
    Provider(ProviderError),

    /// The provider answered with blank text
    #[error("empty response")]
    EmptyResponse,

    /// The translation could not be written back
    #[error("store error: {0}")]
    Store(String),
}

/// Outcome of one dispatch pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Records in the pending snapshot
    pub attempted: usize,
    /// Records whose translation was stored
    pub translated: usize,
    /// Records left pending, with the reason
    pub failed: Vec<(String, FailureKind)>,
}

impl std::fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} attempted, {} translated, {} failed",
            self.attempted,
            self.translated,
            self.failed.len()
        )
    }
}

/// Runs pending records through a provider with bounded concurrency
pub struct TranslationDispatcher {
    store: ContentStore,
    provider: Arc<dyn Provider>,
    max_workers: usize,
    timeout: Duration,
}

impl TranslationDispatcher {
    /// Create a dispatcher; `max_workers` below one is treated as one
    pub fn new(
        store: ContentStore,
        provider: Arc<dyn Provider>,
        max_workers: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            max_workers: max_workers.max(1),
            timeout,
        }
    }

    /// Concurrency bound in effect
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Translate every record that is pending when the pass starts
    ///
    /// `progress` is called with `(done, total)` after each record settles.
    /// Only a failure to take the pending snapshot is returned as an error.
    pub async fn run<F>(&self, progress: F) -> Result<DispatchReport>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let pending = self.store.list_pending().await?;
        let total = pending.len();

        let mut report = DispatchReport {
            attempted: total,
            ..DispatchReport::default()
        };

        if total == 0 {
            info!("No pending records to translate");
            return Ok(report);
        }

        info!(
            "Translating {} pending records with {} workers",
            total, self.max_workers
        );

        let start_time = Instant::now();
        let done = AtomicUsize::new(0);
        let progress = &progress;
        let done = &done;

        let results = stream::iter(pending)
            .map(|(id, source_text)| async move {
                let result = self.translate_one(&id, &source_text).await;

                let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                progress(current, total);

                (id, result)
            })
            .buffer_unordered(self.max_workers)
            .collect::<Vec<_>>()
            .await;

        for (id, result) in results {
            match result {
                Ok(()) => report.translated += 1,
                Err(kind) => report.failed.push((id, kind)),
            }
        }

        // Stable order for logs and callers
        report.failed.sort_by(|a, b| a.0.cmp(&b.0));

        info!(
            "Dispatch finished in {:.1}s: {}",
            start_time.elapsed().as_secs_f64(),
            report
        );

        Ok(report)
    }

    async fn translate_one(&self, id: &str, source_text: &str) -> Result<(), FailureKind> {
        let outcome = tokio::time::timeout(self.timeout, self.provider.translate(source_text)).await;

        let result = match outcome {
            Err(_) => Err(FailureKind::Timeout),
            Ok(Err(e)) => Err(FailureKind::Provider(e)),
            Ok(Ok(text)) if text.trim().is_empty() => Err(FailureKind::EmptyResponse),
            Ok(Ok(text)) => self
                .store
                .set_translation(id, text.trim())
                .await
                .map_err(|e| FailureKind::Store(format!("{:#}", e))),
        };

        match &result {
            Ok(()) => debug!("Translated {}", id),
            Err(kind) => error!("Translation failed for {}: {}", id, kind),
        }

        result
    }
}
