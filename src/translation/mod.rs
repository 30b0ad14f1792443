/*!
 * Translation orchestration for subtitle cues.
 *
 * This module contains the tiered translation strategy and the per-cue
 * pipeline built on top of it. It is split into several submodules:
 *
 * - `strategy`: Three-tier batch/indexed/per-line translation with fallback
 * - `pipeline`: Per-cue protect/translate/restore pipeline and file handling
 * - `prompts`: Prompt templates shared by the wire clients
 */

// Re-export main types for easier usage
pub use self::pipeline::SubtitleTranslator;
pub use self::strategy::TieredTranslator;

// Submodules
pub mod pipeline;
pub mod prompts;
pub mod strategy;
