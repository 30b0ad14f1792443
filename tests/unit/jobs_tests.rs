/*!
 * Tests for the job registry and runner
 */

use std::path::PathBuf;
use std::sync::Arc;

use subtrans::app_config::{
    CreditsConfig, ProtectionConfig, ProviderConfig, TranslationConfig, TranslationProvider,
};
use subtrans::jobs::{JobRegistry, JobSettings, JobStatus, ProgressEvent};
use subtrans::preprocess::WordRemover;
use subtrans::protection::TermSet;
use subtrans::providers::mock::MockClient;
use subtrans::subtitle_processor::SubtitleCollection;
use subtrans::translation::SubtitleTranslator;
use tokio::sync::mpsc;

use crate::common;

/// Job settings backed by the mock provider, without credit insertion so
/// cue counts stay comparable
fn mock_settings() -> JobSettings {
    let mut translation = TranslationConfig::default();
    translation.provider = TranslationProvider::Mock;
    translation.common.retry_backoff_ms = 0;

    JobSettings {
        translation,
        credits: CreditsConfig {
            add_credits: false,
            ..Default::default()
        },
        protection: ProtectionConfig::default(),
        source_language: "en".to_string(),
        target_language: "el".to_string(),
    }
}

/// Translator over a scripted client, mirroring what the runner builds
fn translator_with_client(client: Arc<MockClient>) -> Arc<SubtitleTranslator> {
    Arc::new(SubtitleTranslator::new(
        client,
        1,
        0,
        TermSet::default(),
        WordRemover::default(),
        CreditsConfig {
            add_credits: false,
            ..Default::default()
        },
    ))
}

fn drain_events(receiver: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

/// A subtitle file with a configurable number of single-line cues
fn create_numbered_subtitle(dir: &PathBuf, filename: &str, cues: usize) -> PathBuf {
    let mut content = String::new();
    for i in 0..cues {
        let start = i as u64 * 2_000;
        content.push_str(&format!(
            "{}\n00:00:{:02},000 --> 00:00:{:02},500\nCue number {}\n\n",
            i + 1,
            start / 1000,
            start / 1000 + 1,
            i + 1
        ));
    }
    common::create_test_file(dir, filename, &content).unwrap()
}

#[test]
fn test_registry_createAndSnapshot_shouldStartPending() {
    let registry = JobRegistry::new();
    assert!(registry.is_empty());

    let id = registry.create_job(
        vec!["a.srt".to_string(), "b.srt".to_string()],
        mock_settings(),
        None,
        None,
    );

    assert_eq!(registry.len(), 1);
    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Pending);
    assert_eq!(snapshot.files, vec!["a.srt".to_string(), "b.srt".to_string()]);
    assert!(snapshot.completed.is_empty());
    assert!(snapshot.errors.is_empty());
}

#[test]
fn test_registry_withUnknownId_shouldReturnNoneAndFalse() {
    let registry = JobRegistry::new();
    assert!(registry.get_job("nope").is_none());
    assert!(registry.snapshot("nope").is_none());
    assert!(!registry.cancel_job("nope"));
}

#[test]
fn test_cancel_job_beforeRun_shouldMoveToCancelling() {
    let registry = JobRegistry::new();
    let id = registry.create_job(vec!["a.srt".to_string()], mock_settings(), None, None);

    assert!(registry.cancel_job(&id));
    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Cancelling);
}

#[tokio::test]
async fn test_run_job_withCancelledJob_shouldResolveCancelledWithoutWork() {
    let temp_dir = common::create_temp_dir().unwrap();
    let registry = JobRegistry::new();
    let id = registry.create_job(vec!["a.srt".to_string()], mock_settings(), None, None);
    registry.cancel_job(&id);

    let (sender, mut receiver) = mpsc::unbounded_channel();
    registry
        .run_job(&id, temp_dir.path(), temp_dir.path(), Some(sender))
        .await
        .unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Cancelled);
    assert!(snapshot.progress.is_empty());

    let events = drain_events(&mut receiver);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::Cancelled { file: None, .. }));
}

#[tokio::test]
async fn test_run_job_withTwoFiles_shouldCompleteBoth() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    common::create_test_subtitle(&input_dir, "one.srt").unwrap();
    common::create_test_subtitle(&input_dir, "two.srt").unwrap();

    let registry = JobRegistry::new();
    let id = registry.create_job(
        vec!["one.srt".to_string(), "two.srt".to_string()],
        mock_settings(),
        None,
        None,
    );

    let (sender, mut receiver) = mpsc::unbounded_channel();
    registry
        .run_job(&id, &input_dir, &output_dir, Some(sender))
        .await
        .unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.completed, vec!["one.srt".to_string(), "two.srt".to_string()]);
    assert!(snapshot.errors.is_empty());
    assert_eq!(snapshot.progress["one.srt"].current, 3);
    assert_eq!(snapshot.progress["one.srt"].total, 3);

    // Both outputs written and translated by the mock
    let translated = SubtitleCollection::from_srt_file(output_dir.join("one.srt"), "el").unwrap();
    assert_eq!(translated.entries.len(), 3);
    assert!(translated.entries[0].text.starts_with("tr:"));

    let events = drain_events(&mut receiver);
    let progress_count = events.iter()
        .filter(|e| matches!(e, ProgressEvent::Progress { .. }))
        .count();
    assert_eq!(progress_count, 6);

    let completes: Vec<&ProgressEvent> = events.iter()
        .filter(|e| matches!(e, ProgressEvent::FileComplete { .. }))
        .collect();
    assert_eq!(completes.len(), 2);

    match events.last().unwrap() {
        ProgressEvent::AllComplete { files } => assert_eq!(files.len(), 2),
        other => panic!("expected AllComplete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_run_job_withMissingFile_shouldRecordErrorAndContinue() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    common::create_test_subtitle(&input_dir, "real.srt").unwrap();

    let registry = JobRegistry::new();
    let id = registry.create_job(
        vec!["missing.srt".to_string(), "real.srt".to_string()],
        mock_settings(),
        None,
        None,
    );

    let (sender, mut receiver) = mpsc::unbounded_channel();
    registry
        .run_job(&id, &input_dir, &output_dir, Some(sender))
        .await
        .unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.completed, vec!["real.srt".to_string()]);
    assert!(snapshot.errors.contains_key("missing.srt"));

    let events = drain_events(&mut receiver);
    assert!(matches!(events[0], ProgressEvent::Error { ref file, .. } if file == "missing.srt"));
    match events.last().unwrap() {
        ProgressEvent::AllComplete { files } => {
            assert_eq!(files, &vec!["real.srt".to_string()])
        }
        other => panic!("expected AllComplete, got {:?}", other),
    }
}

/// Output order equals input order even when later cues resolve first
#[tokio::test]
async fn test_run_job_withFasterLaterCues_shouldPreserveCueOrder() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    create_numbered_subtitle(&input_dir, "ordered.srt", 5);

    let registry = JobRegistry::new();
    let id = registry.create_job(vec!["ordered.srt".to_string()], mock_settings(), None, None);

    // Earlier cues take longer than later ones
    let client = Arc::new(MockClient::working().with_delays(&[250, 200, 150, 100, 50]));
    registry
        .run_job_with_translator(&id, &input_dir, &output_dir, None, translator_with_client(client))
        .await
        .unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);

    let translated = SubtitleCollection::from_srt_file(output_dir.join("ordered.srt"), "el").unwrap();
    let texts: Vec<String> = translated.entries.iter().map(|e| e.text.clone()).collect();
    let expected: Vec<String> = (1..=5).map(|i| format!("tr:Cue number {}", i)).collect();
    assert_eq!(texts, expected);
}

/// Progress counts up one at a time, in the events and in the stored state,
/// even when cues finish out of order
#[tokio::test]
async fn test_run_job_withOutOfOrderCompletion_shouldEmitMonotonicProgress() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    create_numbered_subtitle(&input_dir, "steady.srt", 5);

    let registry = JobRegistry::new();
    let id = registry.create_job(vec!["steady.srt".to_string()], mock_settings(), None, None);

    // Earlier cues take longer, so completion order is reversed
    let client = Arc::new(MockClient::working().with_delays(&[250, 200, 150, 100, 50]));
    let (sender, mut receiver) = mpsc::unbounded_channel();
    registry
        .run_job_with_translator(
            &id,
            &input_dir,
            &output_dir,
            Some(sender),
            translator_with_client(client),
        )
        .await
        .unwrap();

    let currents: Vec<usize> = drain_events(&mut receiver)
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { current, .. } => Some(*current),
            _ => None,
        })
        .collect();
    assert_eq!(currents, vec![1, 2, 3, 4, 5]);

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.progress["steady.srt"].current, 5);
}

/// A zero concurrency cap in the config must not stall the job
#[tokio::test]
async fn test_run_job_withZeroConcurrencyConfigured_shouldStillComplete() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    common::create_test_subtitle(&input_dir, "capped.srt").unwrap();

    let mut settings = mock_settings();
    let mut provider_config = ProviderConfig::new(TranslationProvider::Mock);
    provider_config.concurrent_requests = 0;
    settings.translation.available_providers.push(provider_config);

    let registry = JobRegistry::new();
    let id = registry.create_job(vec!["capped.srt".to_string()], settings, None, None);

    registry
        .run_job(&id, &input_dir, &output_dir, None)
        .await
        .unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.completed, vec!["capped.srt".to_string()]);
    assert!(output_dir.join("capped.srt").exists());
}

/// Cancellation mid-file lets in-flight cues settle, then stops the job
/// without writing output
#[tokio::test]
async fn test_run_job_whenCancelledMidFile_shouldStopWithCancelledStatus() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input_dir = temp_dir.path().to_path_buf();
    let output_dir = temp_dir.path().join("out");
    create_numbered_subtitle(&input_dir, "long.srt", 10);

    let registry = Arc::new(JobRegistry::new());
    let id = registry.create_job(vec!["long.srt".to_string()], mock_settings(), None, None);

    let client = Arc::new(MockClient::working().with_delays(&[300; 10]));
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let run_registry = Arc::clone(&registry);
    let run_id = id.clone();
    let run_input = input_dir.clone();
    let run_output = output_dir.clone();
    let translator = translator_with_client(client);
    let handle = tokio::spawn(async move {
        run_registry
            .run_job_with_translator(&run_id, &run_input, &run_output, Some(sender), translator)
            .await
    });

    // Cancel while the first wave of cues is still in flight
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(registry.cancel_job(&id));
    handle.await.unwrap().unwrap();

    let snapshot = registry.snapshot(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Cancelled);
    assert!(snapshot.completed.is_empty());

    // At most the concurrency cap of cues finished; undispatched ones never ran
    let progress = snapshot.progress["long.srt"];
    assert!(progress.current <= 4, "completed {} cues after cancel", progress.current);
    assert_eq!(progress.total, 10);

    // No output was written for the cancelled file
    assert!(!output_dir.join("long.srt").exists());

    let events = drain_events(&mut receiver);
    match events.last().unwrap() {
        ProgressEvent::Cancelled { file, .. } => {
            assert_eq!(file.as_deref(), Some("long.srt"))
        }
        other => panic!("expected Cancelled, got {:?}", other),
    }
}
