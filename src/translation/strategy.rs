/*!
 * Three-tier translation strategy with graceful degradation.
 *
 * A batch of lines for one cue is translated by escalating through three
 * tiers, each wrapping the previous one's failure:
 *
 * 1. batch: the whole batch in one call, accepted only on matching length
 * 2. indexed: every line prefixed with a `[n]` marker to stop the model from
 *    merging or splitting lines, markers stripped afterwards
 * 3. per-line: each non-blank line individually, with bounded retries; a
 *    line that still fails keeps its original text
 *
 * Transport errors, parse errors and length mismatches are all the same
 * kind of tier failure. Only the final tier tolerates a failure permanently,
 * and only at line granularity.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::ProviderError;
use crate::providers::TranslationClient;

/// Tiered translator over a batch-translate capability.
#[derive(Debug, Clone)]
pub struct TieredTranslator {
    /// The client backing all tiers
    client: Arc<dyn TranslationClient>,

    /// Retry attempts per line in the final tier
    retry_count: u32,

    /// Delay between single-line retries
    retry_backoff_ms: u64,
}

impl TieredTranslator {
    /// Create a tiered translator with the given retry policy
    pub fn new(client: Arc<dyn TranslationClient>, retry_count: u32, retry_backoff_ms: u64) -> Self {
        Self {
            client,
            retry_count: retry_count.max(1),
            retry_backoff_ms,
        }
    }

    /// Translate the lines of one cue.
    ///
    /// Always returns a batch of the same length as the input. Blank lines
    /// pass through untouched; a batch with no translatable content
    /// short-circuits without any provider call.
    pub async fn translate_lines(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Vec<String> {
        if lines.is_empty() || lines.iter().all(|line| line.trim().is_empty()) {
            return lines.to_vec();
        }

        // Tier 1: whole batch in one call
        match self.translate_whole_batch(lines, source_language, target_language).await {
            Ok(translated) => return translated,
            Err(e) => debug!("Batch tier failed ({}), escalating to indexed tier", e),
        }

        // Tier 2: indexed markers
        match self.translate_indexed(lines, source_language, target_language).await {
            Ok(translated) => return translated,
            Err(e) => debug!("Indexed tier failed ({}), escalating to per-line tier", e),
        }

        // Tier 3: line by line, tolerating permanent per-line failure
        self.translate_line_by_line(lines, source_language, target_language).await
    }

    /// Tier 1: send the whole batch and accept only a same-length response
    async fn translate_whole_batch(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let translated = self
            .client
            .translate_batch(lines, source_language, target_language)
            .await?;

        if translated.len() != lines.len() {
            return Err(ProviderError::LineCountMismatch {
                sent: lines.len(),
                received: translated.len(),
            });
        }

        Ok(translated)
    }

    /// Tier 2: prefix positional markers, resend, strip the markers
    async fn translate_indexed(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let indexed: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("[{}] {}", i + 1, line))
            .collect();

        let translated = self
            .client
            .translate_batch(&indexed, source_language, target_language)
            .await?;

        if translated.len() != lines.len() {
            return Err(ProviderError::LineCountMismatch {
                sent: lines.len(),
                received: translated.len(),
            });
        }

        Ok(translated.into_iter().map(|line| strip_index_marker(&line)).collect())
    }

    /// Tier 3: translate each non-blank line individually with retries.
    /// A line that exhausts its attempts keeps its original text.
    async fn translate_line_by_line(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Vec<String> {
        let mut result = Vec::with_capacity(lines.len());

        for line in lines {
            if line.trim().is_empty() {
                result.push(line.clone());
                continue;
            }

            result.push(
                self.translate_single_line(line, source_language, target_language)
                    .await,
            );
        }

        result
    }

    /// Translate one line, falling back to the original text after the
    /// final failed attempt
    async fn translate_single_line(
        &self,
        line: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        let batch = vec![line.to_string()];

        for attempt in 1..=self.retry_count {
            match self
                .client
                .translate_batch(&batch, source_language, target_language)
                .await
            {
                Ok(translated) if translated.len() == 1 => {
                    return translated.into_iter().next().unwrap_or_else(|| line.to_string());
                }
                Ok(translated) => {
                    debug!(
                        "Single-line call returned {} lines instead of 1 (attempt {}/{})",
                        translated.len(),
                        attempt,
                        self.retry_count
                    );
                }
                Err(e) => {
                    debug!(
                        "Single-line translation failed (attempt {}/{}): {}",
                        attempt, self.retry_count, e
                    );
                }
            }

            if attempt < self.retry_count {
                tokio::time::sleep(Duration::from_millis(self.retry_backoff_ms)).await;
            }
        }

        // Keeping the untranslated line is preferable to losing the cue
        warn!(
            "Keeping original text after {} failed attempts: {}",
            self.retry_count, line
        );
        line.to_string()
    }
}

/// Strip a leading `[n] ` marker from a returned line.
/// Lines without a marker are kept unmodified.
fn strip_index_marker(line: &str) -> String {
    match line.find("] ") {
        Some(pos) => line[pos + 2..].to_string(),
        None => line.to_string(),
    }
}
