/*!
 * Job execution.
 *
 * Files of a job are processed strictly in order; cues inside one file are
 * translated concurrently under a semaphore cap. Output order never depends
 * on completion order: each worker writes its result into the slot for its
 * original position.
 */

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{error, info, warn};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;

use crate::errors::JobError;
use crate::preprocess::WordRemover;
use crate::protection::TermSet;
use crate::providers;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::SubtitleTranslator;

use super::{Job, JobRegistry, JobStatus, ProgressEvent};

/// Send an event if a sink is attached. A dropped receiver never stops a job.
fn emit(sink: &Option<UnboundedSender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(sender) = sink {
        let _ = sender.send(event);
    }
}

/// Write a word list to a run-scoped temp file.
///
/// The file is removed when the returned handle drops, on every exit path.
fn write_word_list(words: &[String]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("Failed to create temporary word list")?;
    for word in words {
        writeln!(file, "{}", word).context("Failed to write temporary word list")?;
    }
    file.flush().context("Failed to flush temporary word list")?;
    Ok(file)
}

/// Build the translator for a job from its settings and overrides
fn build_translator(job: &Job) -> Result<SubtitleTranslator> {
    let client = providers::create_client(&job.settings.translation)?;

    let case_insensitive = job.settings.protection.matching_case_insensitive;
    let term_set = match &job.matching_words {
        Some(words) => {
            let tmp = write_word_list(words)?;
            TermSet::from_file(tmp.path(), case_insensitive)?
        }
        None => match &job.settings.protection.matching_file {
            Some(path) if Path::new(path).exists() => TermSet::from_file(path, case_insensitive)?,
            _ => TermSet::default(),
        },
    };

    let word_remover = match &job.removal_words {
        Some(words) => {
            let tmp = write_word_list(words)?;
            WordRemover::from_file(tmp.path())?
        }
        None => match &job.settings.protection.removal_file {
            Some(path) if Path::new(path).exists() => WordRemover::from_file(path)?,
            _ => WordRemover::default(),
        },
    };

    Ok(SubtitleTranslator::new(
        client,
        job.settings.translation.common.retry_count,
        job.settings.translation.common.retry_backoff_ms,
        term_set,
        word_remover,
        job.settings.credits.clone(),
    ))
}

impl JobRegistry {
    /// Run a job to completion.
    ///
    /// Files are read from `input_dir` and written under the same name to
    /// `output_dir`. Per-file failures are recorded and skipped; the job
    /// keeps going. Cancellation stops the job at the next cue boundary and
    /// resolves it with `Cancelled` status, which is not an error.
    pub async fn run_job(
        &self,
        id: &str,
        input_dir: &Path,
        output_dir: &Path,
        sink: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<(), JobError> {
        let job = self.get_job(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;

        let translator = match build_translator(&job) {
            Ok(translator) => Arc::new(translator),
            Err(e) => {
                error!("Job {}: failed to build translator: {}", job.id, e);
                for file in job.files() {
                    job.record_error(file, e.to_string());
                    emit(&sink, ProgressEvent::Error {
                        file: file.clone(),
                        message: e.to_string(),
                    });
                }
                job.set_status(JobStatus::Completed);
                emit(&sink, ProgressEvent::AllComplete { files: Vec::new() });
                return Ok(());
            }
        };

        self.run_job_with_translator(id, input_dir, output_dir, sink, translator).await
    }

    /// Run a job with an explicitly provided translator.
    ///
    /// Used by `run_job` after building the translator from the job's
    /// settings, and by tests that need a scripted client behind it.
    pub async fn run_job_with_translator(
        &self,
        id: &str,
        input_dir: &Path,
        output_dir: &Path,
        sink: Option<UnboundedSender<ProgressEvent>>,
        translator: Arc<SubtitleTranslator>,
    ) -> Result<(), JobError> {
        let job = self.get_job(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if job.is_cancelled() {
            job.set_status(JobStatus::Cancelled);
            emit(&sink, ProgressEvent::Cancelled {
                file: None,
                message: "Job cancelled before start".to_string(),
            });
            return Ok(());
        }

        job.set_status(JobStatus::Running);
        let concurrency = job.settings.translation.optimal_concurrent_requests();
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let source_language = job.settings.source_language.clone();
        let target_language = job.settings.target_language.clone();

        info!(
            "Job {}: translating {} files ({} -> {}), {} concurrent cues",
            job.id,
            job.files().len(),
            source_language,
            target_language,
            concurrency
        );

        for file in job.files().to_vec() {
            if job.is_cancelled() {
                job.set_status(JobStatus::Cancelled);
                emit(&sink, ProgressEvent::Cancelled {
                    file: None,
                    message: "Job cancelled".to_string(),
                });
                return Ok(());
            }

            let input_path = input_dir.join(&file);
            if !input_path.exists() {
                let message = format!("File not found: {}", input_path.display());
                warn!("Job {}: {}", job.id, message);
                job.record_error(&file, message.clone());
                emit(&sink, ProgressEvent::Error { file: file.clone(), message });
                continue;
            }

            let collection = match SubtitleCollection::from_srt_file(&input_path, &source_language) {
                Ok(collection) => collection,
                Err(e) => {
                    let message = e.to_string();
                    warn!("Job {}: failed to parse {}: {}", job.id, file, message);
                    job.record_error(&file, message.clone());
                    emit(&sink, ProgressEvent::Error { file: file.clone(), message });
                    continue;
                }
            };

            let total = collection.entries.len();
            job.init_progress(&file, total);

            let done_counter = Arc::new(Mutex::new(0usize));
            let mut workers = Vec::with_capacity(total);

            for (idx, entry) in collection.entries.into_iter().enumerate() {
                let job = Arc::clone(&job);
                let translator = Arc::clone(&translator);
                let semaphore = Arc::clone(&semaphore);
                let done_counter = Arc::clone(&done_counter);
                let sink = sink.clone();
                let file = file.clone();
                let source_language = source_language.clone();
                let target_language = target_language.clone();

                workers.push(tokio::spawn(async move {
                    if job.is_cancelled() {
                        return None;
                    }
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    if job.is_cancelled() {
                        return None;
                    }

                    let translated = translator
                        .translate_entry(&entry, &source_language, &target_language)
                        .await;

                    // Count, record and emit as one step so the stored
                    // progress and the event stream stay monotonic
                    {
                        let mut done = done_counter.lock();
                        *done += 1;
                        job.set_progress(&file, *done, total);
                        emit(&sink, ProgressEvent::Progress {
                            file: file.clone(),
                            current: *done,
                            total,
                        });
                    }

                    Some((idx, translated))
                }));
            }

            let mut slots: Vec<Option<SubtitleEntry>> = (0..total).map(|_| None).collect();
            for outcome in join_all(workers).await {
                match outcome {
                    Ok(Some((idx, entry))) => slots[idx] = Some(entry),
                    Ok(None) => {}
                    Err(e) => warn!("Job {}: worker panicked: {}", job.id, e),
                }
            }

            if job.is_cancelled() {
                job.set_status(JobStatus::Cancelled);
                emit(&sink, ProgressEvent::Cancelled {
                    file: Some(file.clone()),
                    message: "Job cancelled".to_string(),
                });
                return Ok(());
            }

            let entries: Vec<SubtitleEntry> = slots.into_iter().flatten().collect();
            if entries.len() != total {
                let message = format!(
                    "Translated {} of {} cues",
                    entries.len(),
                    total
                );
                warn!("Job {}: {}: {}", job.id, file, message);
                job.record_error(&file, message.clone());
                emit(&sink, ProgressEvent::Error { file: file.clone(), message });
                continue;
            }

            let output_path = output_dir.join(&file);
            if let Err(e) = translator.finalize_entries(entries, &output_path) {
                let message = e.to_string();
                warn!("Job {}: failed to write {}: {}", job.id, file, message);
                job.record_error(&file, message.clone());
                emit(&sink, ProgressEvent::Error { file: file.clone(), message });
                continue;
            }

            job.record_completed(&file);
            emit(&sink, ProgressEvent::FileComplete { file: file.clone() });
            info!("Job {}: completed {}", job.id, file);
        }

        job.set_status(JobStatus::Completed);
        emit(&sink, ProgressEvent::AllComplete { files: job.completed_files() });
        Ok(())
    }
}
