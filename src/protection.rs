/*!
 * Placeholder protection for markup, entities and fixed terminology.
 *
 * Before a line is sent to a translation provider, every span that must
 * survive translation verbatim (HTML-like tags, character entities and
 * configured terms such as honorifics) is swapped for a placeholder token.
 * After translation the tokens are swapped back, so the provider never sees
 * the protected content.
 */

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Mapping from placeholder token to the original protected span.
/// Scoped to one line's protect/restore round trip; never persisted.
pub type PlaceholderMap = HashMap<String, String>;

// @const: HTML-like tag spans (<i>, </font>, <font color="...">)
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// @const: Character entity spans (&amp; &#39; &nbsp;)
static ENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap());

/// Shape of every token the codec can emit, used to catch leftovers
static PLACEHOLDER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:HTMLTAG|HTMLENTITY|TERM)_\d+").unwrap());

/// Honorifics protected by default in every term set
const DEFAULT_HONORIFICS: &[&str] = &[
    "-san", "-kun", "-chan", "-sama", "senpai", "sensei",
    "-senpai", "-sensei", "onii-chan", "onee-chan", "onii-san", "onee-san",
];

/// A set of literal terms to protect from translation, plus an ordered
/// source -> target substitution applied after restoration.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    /// Terms protected with placeholders before translation
    terms: Vec<String>,

    /// Whether term matching ignores case
    case_insensitive: bool,

    /// Ordered source -> target pairs applied to the final translated text
    replacements: Vec<(String, String)>,
}

impl TermSet {
    /// Create a term set from protected terms only
    pub fn new(terms: Vec<String>, case_insensitive: bool) -> Self {
        Self {
            terms,
            case_insensitive,
            replacements: Vec::new(),
        }
    }

    /// Create a term set from protected terms and replacement pairs.
    /// The source side of every pair is also protected.
    pub fn with_replacements(
        mut terms: Vec<String>,
        replacements: Vec<(String, String)>,
        case_insensitive: bool,
    ) -> Self {
        for (source, _) in &replacements {
            if !terms.iter().any(|t| t == source) {
                terms.push(source.clone());
            }
        }
        Self {
            terms,
            case_insensitive,
            replacements,
        }
    }

    /// Load a term set from a matching file.
    ///
    /// One entry per line: either a bare term to protect, or
    /// `source --> target` to protect `source` and substitute it with
    /// `target` in the final output. Lines starting with `#` are comments.
    pub fn from_file<P: AsRef<Path>>(path: P, case_insensitive: bool) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read matching file: {}", path.display()))?;

        let mut terms = Vec::new();
        let mut replacements = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((source, target)) = line.split_once("-->") {
                let source = source.trim();
                let target = target.trim();
                if source.is_empty() || target.is_empty() {
                    warn!("Skipping malformed matching entry: {}", line);
                    continue;
                }
                replacements.push((source.to_string(), target.to_string()));
            } else {
                terms.push(line.to_string());
            }
        }

        Ok(Self::with_replacements(terms, replacements, case_insensitive))
    }

    /// Whether term matching ignores case
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Protected terms, without the default honorifics
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Replacement pairs in their configured order
    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }
}

/// Protects non-translatable spans with placeholder tokens and restores them.
///
/// Placeholder tokens embed a counter that increases strictly over one
/// protect call, so the same input always yields the same token sequence.
#[derive(Debug)]
pub struct PlaceholderCodec {
    /// Compiled word-boundary patterns, one per protected term
    term_patterns: Vec<Regex>,

    /// Replacement pairs sorted longest source first, with compiled patterns
    replacement_patterns: Vec<(Regex, String)>,
}

impl PlaceholderCodec {
    /// Build a codec from a term set. Default honorifics are always protected.
    pub fn new(term_set: &TermSet) -> Self {
        let mut all_terms: Vec<String> = term_set.terms().to_vec();
        for honorific in DEFAULT_HONORIFICS {
            if !all_terms.iter().any(|t| t == honorific) {
                all_terms.push((*honorific).to_string());
            }
        }

        let term_patterns = all_terms
            .iter()
            .filter(|term| !term.trim().is_empty())
            .filter_map(|term| Self::term_pattern(term, term_set.case_insensitive()))
            .collect();

        // Substitute longest sources first so a short source never clobbers
        // part of a longer one
        let mut pairs: Vec<(String, String)> = term_set.replacements().to_vec();
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let replacement_patterns = pairs
            .into_iter()
            .filter_map(|(source, target)| {
                Self::term_pattern(&source, term_set.case_insensitive())
                    .map(|pattern| (pattern, target))
            })
            .collect();

        Self {
            term_patterns,
            replacement_patterns,
        }
    }

    /// Build a codec with no protected terms beyond the defaults
    pub fn without_terms() -> Self {
        Self::new(&TermSet::default())
    }

    /// Compile a word-boundary pattern for one literal term
    fn term_pattern(term: &str, case_insensitive: bool) -> Option<Regex> {
        let escaped = regex::escape(term);
        let pattern = if case_insensitive {
            format!(r"(?i)\b{}\b", escaped)
        } else {
            format!(r"\b{}\b", escaped)
        };
        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Skipping unprotectable term {:?}: {}", term, e);
                None
            }
        }
    }

    /// Protect markup tags, character entities and configured terms.
    ///
    /// Returns the protected line and the placeholder map needed to restore
    /// it. Empty and whitespace-only lines pass through unchanged.
    pub fn protect(&self, text: &str) -> (String, PlaceholderMap) {
        let mut protected = text.to_string();
        let mut replacements = PlaceholderMap::new();
        let mut counter = 0usize;

        // Markup tags first, scanned against the original text
        for m in TAG_PATTERN.find_iter(text) {
            let tag = m.as_str();
            let placeholder = format!("HTMLTAG_{}", counter);
            replacements.insert(placeholder.clone(), tag.to_string());
            protected = protected.replacen(tag, &placeholder, 1);
            counter += 1;
        }

        // Then character entities
        for m in ENTITY_PATTERN.find_iter(text) {
            let entity = m.as_str();
            let placeholder = format!("HTMLENTITY_{}", counter);
            replacements.insert(placeholder.clone(), entity.to_string());
            protected = protected.replacen(entity, &placeholder, 1);
            counter += 1;
        }

        // Finally configured terms, matched against the partially substituted
        // string and replaced rightmost-first so earlier offsets stay valid
        for pattern in &self.term_patterns {
            let matches: Vec<(usize, usize, String)> = pattern
                .find_iter(&protected)
                .map(|m| (m.start(), m.end(), m.as_str().to_string()))
                .collect();

            for (start, end, matched) in matches.into_iter().rev() {
                let placeholder = format!("TERM_{}", counter);
                replacements.insert(placeholder.clone(), matched);
                protected.replace_range(start..end, &placeholder);
                counter += 1;
            }
        }

        (protected, replacements)
    }

    /// Restore protected spans from their placeholder tokens.
    ///
    /// Longer tokens are restored first so that TERM_10 is never corrupted by
    /// the replacement of TERM_1.
    pub fn restore(&self, text: &str, replacements: &PlaceholderMap) -> String {
        let mut keys: Vec<&String> = replacements.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut restored = text.to_string();
        for key in keys {
            restored = restored.replace(key.as_str(), &replacements[key]);
        }

        // A surviving token means the model mangled or invented one; the
        // line still ships, but debug builds flag it
        debug_assert!(
            replacements.is_empty() || !PLACEHOLDER_TOKEN.is_match(&restored),
            "unrestored placeholder token in {:?}",
            restored
        );

        restored
    }

    /// Apply the source -> target substitution pairs to translated text.
    /// Runs only after restoration, on the final output.
    pub fn apply_replacements(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (pattern, target) in &self.replacement_patterns {
            result = pattern
                .replace_all(&result, regex::NoExpand(target))
                .to_string();
        }
        result
    }
}
