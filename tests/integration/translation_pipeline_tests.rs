/*!
 * End-to-end tests for the translation pipeline
 */

use std::sync::Arc;

use subtrans::app_config::{Config, CreditsConfig, TranslationProvider};
use subtrans::app_controller::Controller;
use subtrans::preprocess::WordRemover;
use subtrans::protection::TermSet;
use subtrans::providers::mock::MockClient;
use subtrans::subtitle_processor::SubtitleCollection;
use subtrans::translation::SubtitleTranslator;

use crate::common;

fn mock_translator(term_set: TermSet, word_remover: WordRemover, credits: CreditsConfig) -> SubtitleTranslator {
    SubtitleTranslator::new(
        Arc::new(MockClient::working()),
        1,
        0,
        term_set,
        word_remover,
        credits,
    )
}

/// Full file translation: credits replaced, noise removed, markup and terms
/// preserved, attribution cue spliced into the large center gap
#[tokio::test]
async fn test_translate_file_endToEnd_shouldPreserveStructure() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();

    let content = "1\n00:00:00,000 --> 00:00:02,000\n<i>Hello Tanjiro</i>\n\n\
                   2\n00:00:05,000 --> 00:00:07,000\nSubtitles by OldGroup\n\n\
                   3\n00:00:20,000 --> 00:00:22,000\nnoise Goodbye &amp; good luck\n\n";
    let input = common::create_test_file(&input_dir, "movie.srt", content).unwrap();
    let output = input_dir.join("out").join("movie.srt");

    let term_set = TermSet::new(vec!["Tanjiro".to_string()], false);
    let word_remover = WordRemover::new(&["noise".to_string()]);
    let translator = mock_translator(term_set, word_remover, CreditsConfig::default());

    translator.translate_file(&input, &output, "en", "el").await.unwrap();

    let result = SubtitleCollection::from_srt_file(&output, "el").unwrap();
    // Three original cues plus the inserted attribution cue
    assert_eq!(result.entries.len(), 4);

    // Markup and the protected term survived the translation verbatim
    let first = &result.entries[0].text;
    assert!(first.contains("<i>"), "markup lost: {}", first);
    assert!(first.contains("</i>"), "markup lost: {}", first);
    assert!(first.contains("Tanjiro"), "term lost: {}", first);
    assert!(first.contains("tr:"), "not translated: {}", first);

    // The upstream credit was replaced before translation
    let second = &result.entries[1].text;
    assert!(second.contains("Translated by AI with AI"), "credit kept: {}", second);
    assert!(!second.contains("OldGroup"), "credit kept: {}", second);

    // The attribution cue landed in the 7s-20s gap
    let credit = &result.entries[2];
    assert_eq!(credit.start_time_ms, 12_000);
    assert_eq!(credit.end_time_ms, 15_000);
    assert_eq!(credit.text, "Translated by AI with AI");

    // Removal word gone, entity restored
    let last = &result.entries[3].text;
    assert!(!last.contains("noise"), "removal word kept: {}", last);
    assert!(last.contains("&amp;"), "entity lost: {}", last);

    // Renumbered sequentially after the splice
    let seqs: Vec<usize> = result.entries.iter().map(|e| e.seq_num).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);

    // Original cue timing untouched
    assert_eq!(result.entries[0].start_time_ms, 0);
    assert_eq!(result.entries[3].end_time_ms, 22_000);
}

#[tokio::test]
async fn test_translate_file_withCreditsAtEnd_shouldAppendAttribution() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let input = common::create_test_subtitle(&input_dir, "movie.srt").unwrap();
    let output = input_dir.join("movie.el.srt");

    let credits = CreditsConfig {
        append_credits_at_end: true,
        ..Default::default()
    };
    let translator = mock_translator(TermSet::default(), WordRemover::default(), credits);

    translator.translate_file(&input, &output, "en", "el").await.unwrap();

    let result = SubtitleCollection::from_srt_file(&output, "el").unwrap();
    assert_eq!(result.entries.len(), 4);

    let credit = result.entries.last().unwrap();
    // One second after the last cue's 14s end, three seconds long
    assert_eq!(credit.start_time_ms, 15_000);
    assert_eq!(credit.end_time_ms, 18_000);
    assert_eq!(credit.text, "Translated by AI with AI");
}

#[tokio::test]
async fn test_translate_file_withCreditsDisabled_shouldKeepCueCount() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let input = common::create_test_subtitle(&input_dir, "movie.srt").unwrap();
    let output = input_dir.join("movie.el.srt");

    let credits = CreditsConfig {
        add_credits: false,
        ..Default::default()
    };
    let translator = mock_translator(TermSet::default(), WordRemover::default(), credits);

    translator.translate_file(&input, &output, "en", "el").await.unwrap();

    let result = SubtitleCollection::from_srt_file(&output, "el").unwrap();
    assert_eq!(result.entries.len(), 3);
    assert!(result.entries.iter().all(|e| e.text.starts_with("tr:")));
}

#[tokio::test]
async fn test_translate_file_withEmptyInput_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let input = common::create_test_file(&input_dir, "empty.srt", "").unwrap();
    let output = input_dir.join("out.srt");

    let translator = mock_translator(TermSet::default(), WordRemover::default(), CreditsConfig::default());
    let result = translator.translate_file(&input, &output, "en", "el").await;
    assert!(result.is_err());
}

/// The controller wires discovery, job creation and progress consumption
#[tokio::test]
async fn test_controller_run_withDirectory_shouldTranslateAllFiles() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().join("subs");
    let output_dir = temp_dir.path().join("translated");
    std::fs::create_dir_all(&input_dir).unwrap();
    common::create_test_subtitle(&input_dir.to_path_buf(), "a.srt").unwrap();
    common::create_test_subtitle(&input_dir.to_path_buf(), "b.srt").unwrap();

    let controller = Controller::new_for_test().unwrap();
    let snapshot = controller.run(&input_dir, &output_dir).await.unwrap();

    assert_eq!(snapshot.completed.len(), 2);
    assert!(snapshot.errors.is_empty());
    assert!(output_dir.join("a.srt").exists());
    assert!(output_dir.join("b.srt").exists());
}

#[tokio::test]
async fn test_controller_run_withSingleFile_shouldTranslateIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let input = common::create_test_subtitle(&input_dir, "single.srt").unwrap();
    let output_dir = temp_dir.path().join("out");

    let controller = Controller::new_for_test().unwrap();
    let snapshot = controller.run(&input, &output_dir).await.unwrap();

    assert_eq!(snapshot.completed, vec!["single.srt".to_string()]);
    assert!(output_dir.join("single.srt").exists());
}

/// from_config builds the whole pipeline from configuration alone
#[tokio::test]
async fn test_translator_from_config_withMockProvider_shouldTranslate() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let input = common::create_test_subtitle(&input_dir, "movie.srt").unwrap();
    let output = input_dir.join("movie.out.srt");

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config.credits.add_credits = false;

    let translator = SubtitleTranslator::from_config(&config).unwrap();
    translator.translate_file(&input, &output, "en", "el").await.unwrap();

    let result = SubtitleCollection::from_srt_file(&output, "el").unwrap();
    assert_eq!(result.entries.len(), 3);
}
