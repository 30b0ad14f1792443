/*!
 * Per-cue translation pipeline.
 *
 * One cue flows through: credits pass -> word removal -> placeholder
 * protection -> tiered translation -> restoration -> term substitution.
 * Timing and cue identity are never touched; only the text changes.
 */

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::app_config::{Config, CreditsConfig};
use crate::gap_finder;
use crate::preprocess::{CreditsDetector, WordRemover};
use crate::protection::{PlaceholderCodec, TermSet};
use crate::providers::{self, TranslationClient};
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};

use super::strategy::TieredTranslator;

/// Translates subtitle cues while preserving timing, count and markup.
#[derive(Debug)]
pub struct SubtitleTranslator {
    /// Tiered translation strategy
    strategy: TieredTranslator,

    /// Placeholder protection codec
    codec: PlaceholderCodec,

    /// Credit line detector
    credits_detector: CreditsDetector,

    /// Word remover
    word_remover: WordRemover,

    /// Credits handling settings
    credits: CreditsConfig,
}

impl SubtitleTranslator {
    /// Build a translator from the application config, selecting the
    /// provider client once here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = providers::create_client(&config.translation)?;

        let term_set = match &config.protection.matching_file {
            Some(path) if Path::new(path).exists() => {
                TermSet::from_file(path, config.protection.matching_case_insensitive)?
            }
            _ => TermSet::default(),
        };

        let word_remover = match &config.protection.removal_file {
            Some(path) if Path::new(path).exists() => WordRemover::from_file(path)?,
            _ => WordRemover::default(),
        };

        Ok(Self::new(
            client,
            config.translation.common.retry_count,
            config.translation.common.retry_backoff_ms,
            term_set,
            word_remover,
            config.credits.clone(),
        ))
    }

    /// Build a translator from its parts (used by tests and the job runner)
    pub fn new(
        client: Arc<dyn TranslationClient>,
        retry_count: u32,
        retry_backoff_ms: u64,
        term_set: TermSet,
        word_remover: WordRemover,
        credits: CreditsConfig,
    ) -> Self {
        Self {
            strategy: TieredTranslator::new(client, retry_count, retry_backoff_ms),
            codec: PlaceholderCodec::new(&term_set),
            credits_detector: CreditsDetector::new(&credits.translator_name),
            word_remover,
            credits,
        }
    }

    /// Canonical attribution text for inserted credit cues
    fn credit_text(&self) -> String {
        format!("Translated by {} with AI", self.credits.translator_name)
    }

    /// Translate a single cue while preserving its structure.
    ///
    /// The returned cue keeps the same sequence number and timing.
    pub async fn translate_entry(
        &self,
        entry: &SubtitleEntry,
        source_language: &str,
        target_language: &str,
    ) -> SubtitleEntry {
        let original_lines = entry.lines();

        // Preprocess: credits first, then word removal
        let lines = self
            .credits_detector
            .process_lines(&original_lines, self.credits.replace_credits);
        let lines = self.word_remover.process_lines(&lines);

        // Protect each line; the placeholder map lives for exactly one
        // line's protect/restore round trip
        let mut protected_lines = Vec::with_capacity(lines.len());
        let mut maps = Vec::with_capacity(lines.len());
        for line in &lines {
            let (protected, map) = self.codec.protect(line);
            protected_lines.push(protected);
            maps.push(map);
        }

        let translated = self
            .strategy
            .translate_lines(&protected_lines, source_language, target_language)
            .await;

        // Restore and apply the term substitution post-pass
        let final_lines: Vec<String> = translated
            .iter()
            .zip(maps.iter())
            .map(|(line, map)| {
                let restored = self.codec.restore(line, map);
                self.codec.apply_replacements(&restored)
            })
            .collect();

        let mut result = entry.clone();
        result.set_lines(&final_lines);
        result
    }

    /// Translate every cue of a parsed file sequentially.
    /// The job runner drives cues concurrently instead; this path serves the
    /// simple CLI flow.
    pub async fn translate_entries(
        &self,
        entries: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
    ) -> Vec<SubtitleEntry> {
        let mut translated = Vec::with_capacity(entries.len());
        for entry in entries {
            translated.push(self.translate_entry(entry, source_language, target_language).await);
        }
        translated
    }

    /// Apply credit insertion and write the finished cues to an SRT file
    pub fn finalize_entries(
        &self,
        mut entries: Vec<SubtitleEntry>,
        output_path: &Path,
    ) -> Result<()> {
        if self.credits.add_credits {
            if self.credits.append_credits_at_end {
                entries.push(gap_finder::end_credit_entry(&entries, &self.credit_text()));
            } else {
                entries = gap_finder::insert_credits(entries, &self.credit_text(), self.credits.min_gap_ms);
            }
        }

        let collection = SubtitleCollection {
            source_file: output_path.to_path_buf(),
            entries,
            source_language: String::new(),
        };
        collection.write_to_srt(output_path)
    }

    /// Translate one SRT file end to end
    pub async fn translate_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<()> {
        let collection = SubtitleCollection::from_srt_file(input_path, source_language)
            .with_context(|| format!("Failed to load subtitles from {}", input_path.display()))?;

        if collection.entries.is_empty() {
            return Err(anyhow!("No subtitles found in {}", input_path.display()));
        }

        info!(
            "Translating {} cues from {} to {}",
            collection.entries.len(),
            source_language,
            target_language
        );

        let translated = self
            .translate_entries(&collection.entries, source_language, target_language)
            .await;

        self.finalize_entries(translated, output_path)?;

        debug!("Translation completed: {}", output_path.display());
        Ok(())
    }
}
