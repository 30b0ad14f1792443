/*!
 * Deterministic in-process translation client for tests.
 *
 * The mock makes translation behavior observable without network access:
 * calls can be counted, failed a configurable number of times to exercise
 * tier fallback, and delayed per call to exercise ordering and cancellation
 * under concurrency.
 */

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;

use super::TranslationClient;

/// How the mock responds to translate calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Every call succeeds
    Working,
    /// The first `n` calls fail, later calls succeed
    FailFirst(u32),
    /// Every call fails
    Failing,
}

/// Scriptable translation client
#[derive(Debug)]
pub struct MockClient {
    /// Response behavior
    behavior: MockBehavior,

    /// Prefix prepended to each non-blank line on success.
    /// Must not contain "] " so indexed-tier marker stripping stays intact.
    prefix: String,

    /// Per-call delays, consumed front to back; missing entries mean no delay
    delays_ms: Mutex<VecDeque<u64>>,

    /// Number of translate calls observed
    call_count: AtomicU32,
}

impl MockClient {
    /// A client where every call succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// A client where every call fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A client whose first `n` calls fail
    pub fn fail_first(n: u32) -> Self {
        Self::new(MockBehavior::FailFirst(n))
    }

    fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prefix: "tr:".to_string(),
            delays_ms: Mutex::new(VecDeque::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Override the success prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Schedule per-call delays, consumed in call order
    pub fn with_delays(self, delays_ms: &[u64]) -> Self {
        *self.delays_ms.lock() = delays_ms.iter().copied().collect();
        self
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationClient for MockClient {
    async fn translate_batch(
        &self,
        lines: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays_ms.lock().pop_front();
        if let Some(ms) = delay {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }

        let fail = match self.behavior {
            MockBehavior::Working => false,
            MockBehavior::Failing => true,
            MockBehavior::FailFirst(n) => call < n,
        };

        if fail {
            return Err(ProviderError::RequestFailed(format!(
                "mock failure on call {}",
                call + 1
            )));
        }

        Ok(lines
            .iter()
            .map(|line| {
                if line.trim().is_empty() {
                    line.clone()
                } else {
                    format!("{}{}", self.prefix, line)
                }
            })
            .collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}
