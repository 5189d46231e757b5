//! Batch trimming.
//!
//! Items are trimmed on the blocking thread pool, at most `concurrency` at a
//! time, and collected back in upload order. The batch is fail-fast: the
//! first failure in upload order aborts it and nothing partial is returned.

use crate::intake::UploadedItem;
use futures::stream::{self, StreamExt, TryStreamExt};
use pngtrim_core::naming::NamingPolicy;
use pngtrim_core::{Error, Result};
use pngtrim_image::{probe_dimensions, Trimmer};
use pngtrim_telemetry::{metrics, Timer};
use std::sync::Arc;
use tracing::{debug, warn};

/// One trimmed image, in the same position as its upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedItem {
    /// Output filename after the naming policy
    pub name: String,
    /// PNG bytes
    pub bytes: Vec<u8>,
}

/// Applies a [`Trimmer`] to every uploaded item.
#[derive(Clone)]
pub struct BatchProcessor {
    trimmer: Arc<dyn Trimmer>,
    concurrency: usize,
}

impl BatchProcessor {
    /// Create a processor running at most `concurrency` trims at once.
    pub fn new(trimmer: Arc<dyn Trimmer>, concurrency: usize) -> Self {
        Self {
            trimmer,
            concurrency: concurrency.max(1),
        }
    }

    /// Maximum trims in flight for one batch.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Trim every item, preserving order.
    pub async fn process(
        &self,
        items: Vec<UploadedItem>,
        naming: &NamingPolicy,
    ) -> Result<Vec<ProcessedItem>> {
        debug!(
            count = items.len(),
            concurrency = self.concurrency,
            ?naming,
            "Trimming batch"
        );

        let jobs = items.into_iter().enumerate().map(|(index, item)| {
            let output_name = naming.apply(&item.name);
            self.trim_one(index, item, output_name)
        });

        let processed: Vec<ProcessedItem> = stream::iter(jobs)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        metrics().increment_by("images_trimmed_total", processed.len() as u64);
        Ok(processed)
    }

    async fn trim_one(
        &self,
        index: usize,
        item: UploadedItem,
        output_name: String,
    ) -> Result<ProcessedItem> {
        let trimmer = Arc::clone(&self.trimmer);
        let UploadedItem { name, bytes } = item;
        let before = probe_dimensions(&bytes);

        let trimmed = tokio::task::spawn_blocking(move || {
            let timer = Timer::start("trim_duration_ms");
            let result = trimmer.trim(&bytes);
            timer.stop();
            result
        })
        .await
        .map_err(|e| Error::internal("Trim task did not complete").with_source(e))?;

        match trimmed {
            Ok(bytes) => {
                let after = probe_dimensions(&bytes);
                debug!(
                    index,
                    source = %name,
                    output = %output_name,
                    before = ?before.map(|i| (i.width, i.height)),
                    after = ?after.map(|i| (i.width, i.height)),
                    "Image trimmed"
                );
                Ok(ProcessedItem {
                    name: output_name,
                    bytes,
                })
            }
            Err(e) => {
                warn!(index, source = %name, error = %e, "Trim failed, aborting batch");
                Err(Error::from(e).with_context(format!("Item {} ({})", index + 1, name)))
            }
        }
    }
}
