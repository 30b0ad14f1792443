/*!
 * In-process translation job orchestration.
 *
 * A job translates an ordered list of subtitle files with per-cue
 * concurrency inside each file. Jobs live in a registry for their whole
 * lifetime and are never persisted; a process restart forgets them.
 *
 * Synchronization is per job. The registry lock only guards the id map, so
 * concurrent jobs never contend with each other.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use uuid::Uuid;

use crate::app_config::{CreditsConfig, ProtectionConfig, TranslationConfig};

pub mod events;
pub mod runner;

pub use events::ProgressEvent;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, not yet started
    Pending,
    /// Actively translating
    Running,
    /// Cancellation requested, waiting for in-flight work to settle
    Cancelling,
    /// Stopped on a cancellation request
    Cancelled,
    /// All files processed (possibly with per-file errors)
    Completed,
}

/// Per-file cue completion counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileProgress {
    /// Cues completed so far
    pub current: usize,
    /// Total cue count
    pub total: usize,
}

/// Everything a job needs to build its translator
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Provider selection and parameters
    pub translation: TranslationConfig,

    /// Credits handling
    pub credits: CreditsConfig,

    /// Default term files, used when the job carries no overrides
    pub protection: ProtectionConfig,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,
}

/// Mutable job state, guarded by the job's own mutex
#[derive(Debug)]
struct JobState {
    status: JobStatus,
    progress: HashMap<String, FileProgress>,
    completed: Vec<String>,
    errors: HashMap<String, String>,
}

/// A single translation job
#[derive(Debug)]
pub struct Job {
    /// Unique job id
    pub id: String,

    /// Files to translate, in order
    files: Vec<String>,

    /// Translator settings for this job
    settings: JobSettings,

    /// Per-job protected-term override (replaces the configured matching file)
    matching_words: Option<Vec<String>>,

    /// Per-job removal-word override (replaces the configured removal file)
    removal_words: Option<Vec<String>>,

    /// Mutable state
    state: Mutex<JobState>,

    /// Cooperative cancellation flag, checked at cue boundaries
    cancel: AtomicBool,
}

/// Read-only copy of a job's state at one instant
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    /// Job id
    pub id: String,
    /// Current status
    pub status: JobStatus,
    /// Files of the job, in order
    pub files: Vec<String>,
    /// Per-file progress counters
    pub progress: HashMap<String, FileProgress>,
    /// Files completed so far, in processing order
    pub completed: Vec<String>,
    /// Per-file error messages for skipped files
    pub errors: HashMap<String, String>,
}

impl Job {
    fn new(
        files: Vec<String>,
        settings: JobSettings,
        matching_words: Option<Vec<String>>,
        removal_words: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            files,
            settings,
            matching_words,
            removal_words,
            state: Mutex::new(JobState {
                status: JobStatus::Pending,
                progress: HashMap::new(),
                completed: Vec::new(),
                errors: HashMap::new(),
            }),
            cancel: AtomicBool::new(false),
        }
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Request cooperative cancellation
    fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
        let mut state = self.state.lock();
        if matches!(state.status, JobStatus::Pending | JobStatus::Running) {
            state.status = JobStatus::Cancelling;
        }
    }

    /// Current state as an owned snapshot
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.state.lock();
        JobSnapshot {
            id: self.id.clone(),
            status: state.status,
            files: self.files.clone(),
            progress: state.progress.clone(),
            completed: state.completed.clone(),
            errors: state.errors.clone(),
        }
    }

    /// Files of the job, in order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn set_status(&self, status: JobStatus) {
        self.state.lock().status = status;
    }

    fn init_progress(&self, file: &str, total: usize) {
        self.state.lock().progress.insert(
            file.to_string(),
            FileProgress { current: 0, total },
        );
    }

    fn set_progress(&self, file: &str, current: usize, total: usize) {
        self.state.lock().progress.insert(
            file.to_string(),
            FileProgress { current, total },
        );
    }

    fn record_completed(&self, file: &str) {
        self.state.lock().completed.push(file.to_string());
    }

    fn record_error(&self, file: &str, message: String) {
        self.state.lock().errors.insert(file.to_string(), message);
    }

    fn completed_files(&self) -> Vec<String> {
        self.state.lock().completed.clone()
    }
}

/// Registry of all jobs created in this process
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Arc<Job>>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job over `files` and return its id. No work starts here.
    pub fn create_job(
        &self,
        files: Vec<String>,
        settings: JobSettings,
        matching_words: Option<Vec<String>>,
        removal_words: Option<Vec<String>>,
    ) -> String {
        let job = Arc::new(Job::new(files, settings, matching_words, removal_words));
        let id = job.id.clone();
        self.jobs.write().insert(id.clone(), job);
        id
    }

    /// Look up a job by id
    pub fn get_job(&self, id: &str) -> Option<Arc<Job>> {
        self.jobs.read().get(id).cloned()
    }

    /// Snapshot a job's state by id
    pub fn snapshot(&self, id: &str) -> Option<JobSnapshot> {
        self.get_job(id).map(|job| job.snapshot())
    }

    /// Request cancellation of a job. Returns false for unknown ids.
    ///
    /// The flag takes effect at the next cue boundary; cues already
    /// dispatched to the provider run to completion.
    pub fn cancel_job(&self, id: &str) -> bool {
        match self.get_job(id) {
            Some(job) => {
                job.request_cancel();
                true
            }
            None => false,
        }
    }

    /// Number of jobs in the registry
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    /// Whether the registry holds no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
