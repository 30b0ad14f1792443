/*!
 * Line-level text transforms applied before placeholder protection.
 *
 * - `credits`: detection and replacement of translator credit lines
 * - `word_removal`: deletion of configured words and phrases
 */

pub use self::credits::CreditsDetector;
pub use self::word_removal::WordRemover;

pub mod credits;
pub mod word_removal;
