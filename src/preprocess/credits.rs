/*!
 * Detection and handling of translator credit lines.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Credit phrase patterns, English and Greek, case-insensitive
static CREDIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // English patterns
        r"(?i)\btranslated?\s+by\b",
        r"(?i)\bsubtitles?\s+by\b",
        r"(?i)\bsubs?\s+by\b",
        r"(?i)\btranslator\s*:",
        r"(?i)\btranslation\s*:",
        r"(?i)\bsubtitle\s*:",
        // Greek patterns
        r"(?i)\bμετάφραση\b",
        r"(?i)\bυπότιτλο[ιστ]\b",
        r"(?i)\bμεταφραστή[ςσ]\b",
        r"(?i)\bμετέφρασε\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Detects translator credit lines and replaces them with a canonical
/// attribution string.
#[derive(Debug, Clone)]
pub struct CreditsDetector {
    /// Canonical replacement text
    replacement_text: String,
}

impl CreditsDetector {
    /// Create a detector that credits the given translator name
    pub fn new(translator_name: &str) -> Self {
        Self {
            replacement_text: format!("Translated by {} with AI", translator_name),
        }
    }

    /// The canonical attribution string used for replacements
    pub fn replacement_text(&self) -> &str {
        &self.replacement_text
    }

    /// Check if a text line appears to be a translator credit
    pub fn is_credit_line(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        CREDIT_PATTERNS.iter().any(|pattern| pattern.is_match(text))
    }

    /// Replace a credit line with the canonical attribution.
    /// Idempotent: the canonical string itself is detected as a credit line
    /// and maps back to itself.
    pub fn replace_credit_line(&self, text: &str) -> String {
        if self.is_credit_line(text) {
            self.replacement_text.clone()
        } else {
            text.to_string()
        }
    }

    /// Process the lines of one cue, replacing credits when enabled
    pub fn process_lines(&self, lines: &[String], replace_credits: bool) -> Vec<String> {
        if !replace_credits {
            return lines.to_vec();
        }

        lines
            .iter()
            .map(|line| self.replace_credit_line(line))
            .collect()
    }
}
