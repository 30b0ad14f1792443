/*!
 * Complete removal of configured words and phrases from subtitle text.
 *
 * Plain alphanumeric terms are matched on word boundaries; terms containing
 * non-word characters (styling codes like `{\an8}`) are matched as literal
 * substrings. Removal is followed by whitespace and punctuation cleanup.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

// @const: Repeated whitespace runs
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// @const: Whitespace before punctuation
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.!?,:;])").unwrap());

// @const: Duplicate adjacent terminal punctuation
static DOUBLE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s*[.!?]").unwrap());

// @const: Non-word character, used to pick the matching mode per term
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Removes configured words and phrases from subtitle lines.
#[derive(Debug, Default)]
pub struct WordRemover {
    /// Compiled removal patterns
    patterns: Vec<Regex>,
}

impl WordRemover {
    /// Create a remover from a list of words/phrases
    pub fn new(words: &[String]) -> Self {
        let patterns = words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .filter_map(|word| Self::removal_pattern(word.trim()))
            .collect();

        Self { patterns }
    }

    /// Load removal words from a file, one per line
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read removal file: {}", path.display()))?;

        let words: Vec<String> = content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        info!("Loaded {} words for removal from {}", words.len(), path.display());
        Ok(Self::new(&words))
    }

    /// Whether any removal patterns are configured
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Compile a case-insensitive pattern for one removal term
    fn removal_pattern(word: &str) -> Option<Regex> {
        let escaped = regex::escape(word);

        // Styling codes and other non-word terms can't carry word boundaries,
        // so they are matched as plain substrings
        let pattern = if NON_WORD.is_match(word) {
            format!("(?i){}", escaped)
        } else {
            format!(r"(?i)\b{}\b", escaped)
        };

        Regex::new(&pattern).ok()
    }

    /// Remove configured words from a single line of text
    pub fn remove_words(&self, text: &str) -> String {
        if self.patterns.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let mut result = text.to_string();
        for pattern in &self.patterns {
            result = pattern.replace_all(&result, "").to_string();
        }

        // Clean up the holes left by removal
        let result = MULTI_SPACE.replace_all(&result, " ");
        let result = SPACE_BEFORE_PUNCT.replace_all(&result, "$1");
        let result = DOUBLE_PUNCT.replace_all(&result, "$1");
        result.trim().to_string()
    }

    /// Process the lines of one cue, dropping lines that empty out.
    /// If every line is removed, one empty line is kept so the cue's line
    /// structure is never fully erased.
    pub fn process_lines(&self, lines: &[String]) -> Vec<String> {
        if self.patterns.is_empty() {
            return lines.to_vec();
        }

        let mut processed: Vec<String> = lines
            .iter()
            .map(|line| self.remove_words(line))
            .filter(|line| !line.is_empty())
            .collect();

        if processed.is_empty() && !lines.is_empty() {
            processed.push(String::new());
        }

        processed
    }
}
