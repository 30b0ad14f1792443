/*!
 * Provider implementations for batch line translation.
 *
 * This module contains client implementations for the LLM providers that
 * back the translation strategy:
 * - OpenAI: chat-completions API
 * - Anthropic: messages API
 * - Mock: deterministic in-process client for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation clients.
///
/// A client translates an ordered batch of lines and returns a same-length
/// batch, or fails loudly. It must never silently truncate or pad; a length
/// mismatch is reported as an error by the caller.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Translate a batch of lines from the source to the target language.
    ///
    /// # Arguments
    /// * `lines` - Ordered lines to translate (placeholders already applied)
    /// * `source_language` - Source language code
    /// * `target_language` - Target language code
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - Translated lines in order, or an error
    async fn translate_batch(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is usable, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logging
    fn name(&self) -> &'static str;
}

/// Create the client backing the translation strategy.
///
/// The concrete implementation is selected once from the configuration at
/// job-configuration time; there is no per-call dispatch.
pub fn create_client(config: &TranslationConfig) -> Result<Arc<dyn TranslationClient>> {
    let client: Arc<dyn TranslationClient> = match config.provider {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            config.common.temperature,
            config.common.top_p,
            config.get_timeout_secs(),
        )),
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            config.common.temperature,
            config.common.top_p,
            config.get_timeout_secs(),
        )),
        TranslationProvider::Mock => Arc::new(mock::MockClient::working()),
    };

    Ok(client)
}

/// Extract the `lines_translated` array from a provider response body.
///
/// Models sometimes wrap the JSON object in markdown fences; those are
/// stripped before parsing. Any shape violation is a parse error, which the
/// strategy treats as a tier failure.
pub(crate) fn parse_lines_response(text: &str) -> Result<Vec<String>, ProviderError> {
    let mut cleaned = text.trim();

    if let Some(stripped) = cleaned.strip_prefix("```") {
        // Drop the opening fence line (```json or bare ```)
        cleaned = match stripped.find('\n') {
            Some(pos) => &stripped[pos + 1..],
            None => stripped,
        };
    }
    if let Some(stripped) = cleaned.strip_suffix("```") {
        cleaned = stripped.trim_end();
    }

    #[derive(serde::Deserialize)]
    struct LinesResponse {
        lines_translated: Vec<String>,
    }

    let parsed: LinesResponse = serde_json::from_str(cleaned)
        .map_err(|e| ProviderError::ParseError(format!("invalid lines response: {}", e)))?;

    Ok(parsed.lines_translated)
}

pub mod openai;
pub mod anthropic;
pub mod mock;
