/*!
 * Tests for the tiered translation strategy
 */

use std::sync::Arc;

use subtrans::providers::mock::MockClient;
use subtrans::translation::TieredTranslator;

fn lines(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

/// Happy path: the batch tier answers and its result is used as-is
#[tokio::test]
async fn test_translate_lines_withWorkingClient_shouldUseBatchTier() {
    let client = Arc::new(MockClient::working());
    let translator = TieredTranslator::new(client.clone(), 3, 0);

    let input = lines(&["Hello", "World"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, lines(&["tr:Hello", "tr:World"]));
    assert_eq!(client.call_count(), 1);
}

/// The output always has the same length as the input
#[tokio::test]
async fn test_translate_lines_withBlankLines_shouldPreserveLengthAndBlanks() {
    let client = Arc::new(MockClient::working());
    let translator = TieredTranslator::new(client, 3, 0);

    let input = lines(&["Hello", "", "  ", "World"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output.len(), input.len());
    assert_eq!(output[1], "");
    assert_eq!(output[2], "  ");
}

/// A batch with nothing to translate never reaches the provider
#[tokio::test]
async fn test_translate_lines_withAllBlankInput_shouldShortCircuit() {
    let client = Arc::new(MockClient::working());
    let translator = TieredTranslator::new(client.clone(), 3, 0);

    let input = lines(&["", "   ", "\t"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, input);
    assert_eq!(client.call_count(), 0);

    let empty: Vec<String> = Vec::new();
    assert!(translator.translate_lines(&empty, "en", "el").await.is_empty());
}

/// When the batch tier fails, the indexed tier answers and its positional
/// markers are stripped from the result
#[tokio::test]
async fn test_translate_lines_whenBatchFails_shouldEscalateToIndexedTier() {
    let client = Arc::new(MockClient::fail_first(1));
    let translator = TieredTranslator::new(client.clone(), 3, 0);

    let input = lines(&["Hello there", "General"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(client.call_count(), 2);
    assert_eq!(output.len(), 2);
    assert!(!output[0].contains("[1]"));
    assert!(!output[1].contains("[2]"));
}

/// When both batch tiers fail, each line is translated individually
#[tokio::test]
async fn test_translate_lines_whenBothBatchTiersFail_shouldTranslatePerLine() {
    let client = Arc::new(MockClient::fail_first(2));
    let translator = TieredTranslator::new(client.clone(), 3, 0);

    let input = lines(&["One", "Two", "Three"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, lines(&["tr:One", "tr:Two", "tr:Three"]));
    // 2 failed batch calls plus one call per line
    assert_eq!(client.call_count(), 5);
}

/// Blank lines never generate per-line calls
#[tokio::test]
async fn test_translate_lines_perLineTier_shouldSkipBlankLines() {
    let client = Arc::new(MockClient::fail_first(2));
    let translator = TieredTranslator::new(client.clone(), 3, 0);

    let input = lines(&["One", "", "Two"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, lines(&["tr:One", "", "tr:Two"]));
    assert_eq!(client.call_count(), 4);
}

/// A line whose retries are exhausted keeps its original text
#[tokio::test]
async fn test_translate_lines_whenEverythingFails_shouldKeepOriginalText() {
    let client = Arc::new(MockClient::failing());
    let translator = TieredTranslator::new(client.clone(), 2, 0);

    let input = lines(&["Stubborn line", "Another one"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, input);
    // 2 batch tiers plus 2 retries for each of the 2 lines
    assert_eq!(client.call_count(), 6);
}

/// retry_count of zero still makes one attempt per line
#[tokio::test]
async fn test_translate_lines_withZeroRetryCount_shouldAttemptOnce() {
    let client = Arc::new(MockClient::failing());
    let translator = TieredTranslator::new(client.clone(), 0, 0);

    let input = lines(&["Line"]);
    let output = translator.translate_lines(&input, "en", "el").await;

    assert_eq!(output, input);
    assert_eq!(client.call_count(), 3);
}
