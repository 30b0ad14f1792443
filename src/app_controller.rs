/*!
 * Application controller.
 *
 * Wires the configuration to the job registry for the CLI: discovers the
 * input files, creates a job over them, runs it, and renders its progress
 * events as an indicatif progress bar.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::app_config::{Config, TranslationProvider};
use crate::file_utils::FileManager;
use crate::jobs::{JobRegistry, JobSettings, JobSnapshot, ProgressEvent};
use crate::language_utils;

/// Main application controller
pub struct Controller {
    /// Application configuration
    config: Config,

    /// Registry holding the jobs created by this controller
    registry: Arc<JobRegistry>,
}

impl Controller {
    /// Create a controller with the provided configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Controller {
            config,
            registry: Arc::new(JobRegistry::new()),
        })
    }

    /// Create a controller backed by the mock provider, for tests
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.translation.provider = TranslationProvider::Mock;
        Self::with_config(config)
    }

    /// The registry holding this controller's jobs
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Translate a single file or every subtitle file under a directory.
    ///
    /// Returns the finished job's snapshot so callers can inspect per-file
    /// results.
    pub async fn run(&self, input_path: &Path, output_dir: &Path) -> Result<JobSnapshot> {
        let (input_dir, files) = Self::discover_files(input_path)?;

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found at {}", input_path.display()));
        }

        FileManager::ensure_dir(output_dir)?;

        info!(
            "Translating {} file(s): {} -> {}",
            files.len(),
            language_utils::get_language_name(&self.config.source_language),
            language_utils::get_language_name(&self.config.target_language),
        );
        info!(
            "Provider: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        let settings = JobSettings {
            translation: self.config.translation.clone(),
            credits: self.config.credits.clone(),
            protection: self.config.protection.clone(),
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
        };

        let job_id = self.registry.create_job(files, settings, None, None);

        let (sender, mut receiver) = mpsc::unbounded_channel::<ProgressEvent>();
        let progress_bar = Self::build_progress_bar();
        let pb = progress_bar.clone();

        let consumer = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                match event {
                    ProgressEvent::Progress { file, current, total } => {
                        pb.set_length(total as u64);
                        pb.set_position(current as u64);
                        pb.set_message(file);
                    }
                    ProgressEvent::FileComplete { file } => {
                        pb.set_position(0);
                        info!("Completed: {}", file);
                    }
                    ProgressEvent::Error { file, message } => {
                        error!("Failed: {}: {}", file, message);
                    }
                    ProgressEvent::Cancelled { file, message } => match file {
                        Some(file) => warn!("Cancelled during {}: {}", file, message),
                        None => warn!("Cancelled: {}", message),
                    },
                    ProgressEvent::AllComplete { files } => {
                        info!("All done: {} file(s) translated", files.len());
                    }
                }
            }
        });

        self.registry
            .run_job(&job_id, &input_dir, output_dir, Some(sender))
            .await?;

        let _ = consumer.await;
        progress_bar.finish_and_clear();

        let snapshot = self
            .registry
            .snapshot(&job_id)
            .ok_or_else(|| anyhow!("Job disappeared from registry: {}", job_id))?;

        if !snapshot.errors.is_empty() {
            warn!(
                "{} of {} file(s) failed",
                snapshot.errors.len(),
                snapshot.files.len()
            );
        }

        Ok(snapshot)
    }

    /// Resolve the input path into a base directory and relative file names
    fn discover_files(input_path: &Path) -> Result<(PathBuf, Vec<String>)> {
        if input_path.is_file() {
            let dir = input_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = input_path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid input path: {}", input_path.display()))?
                .to_string_lossy()
                .to_string();
            Ok((dir, vec![name]))
        } else if input_path.is_dir() {
            let files = FileManager::find_srt_files(input_path)?
                .iter()
                .filter_map(|path| {
                    path.strip_prefix(input_path)
                        .ok()
                        .map(|rel| rel.to_string_lossy().to_string())
                })
                .collect();
            Ok((input_path.to_path_buf(), files))
        } else {
            Err(anyhow!("Input path does not exist: {}", input_path.display()))
        }
    }

    fn build_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
