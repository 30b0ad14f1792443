use serde::Serialize;

/// Progress event emitted by a running job.
///
/// Events serialize with a `type` discriminant so downstream consumers can
/// stream them as JSON without knowing the Rust enum.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// One more cue of `file` finished translating
    Progress {
        /// Filename being translated
        file: String,
        /// Cues completed so far
        current: usize,
        /// Total cue count for the file
        total: usize,
    },

    /// `file` was translated and written successfully
    FileComplete {
        /// Filename that completed
        file: String,
    },

    /// `file` failed and was skipped; the job continues with the next file
    Error {
        /// Filename the error belongs to
        file: String,
        /// Error description
        message: String,
    },

    /// The job stopped on a cancellation request (terminal)
    Cancelled {
        /// File that was in flight when the job stopped, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        /// Human-readable cancellation note
        message: String,
    },

    /// Every file was processed (terminal)
    AllComplete {
        /// Files that completed successfully, in processing order
        files: Vec<String>,
    },
}
