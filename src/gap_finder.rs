/*!
 * Heuristic placement of the attribution cue inside an existing timeline.
 *
 * The finder looks for a gap between adjacent cues wide enough to hold a
 * fixed-length attribution window, preferring gaps whose midpoint falls in
 * the middle third of the timeline so the credit is likely to be seen.
 */

use log::info;

use crate::subtitle_processor::SubtitleEntry;

/// Length of the attribution window in milliseconds
pub const CREDIT_DURATION_MS: u64 = 3_000;

/// Default minimum usable gap length in milliseconds
pub const DEFAULT_MIN_GAP_MS: u64 = 3_000;

/// Delay before an appended attribution cue when no gap is usable
const APPEND_DELAY_MS: u64 = 1_000;

/// A candidate slot for the attribution cue, derived from the timeline and
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GapCandidate {
    /// Position of the earlier cue of the pair in the timeline sequence
    pub after_position: usize,

    /// Width of the gap in milliseconds
    pub gap_ms: u64,

    /// Proposed start of the attribution window
    pub credit_start_ms: u64,

    /// Proposed end of the attribution window
    pub credit_end_ms: u64,
}

/// Find the best gap for the attribution cue.
///
/// The timeline span runs from the first cue's start to the last cue's end;
/// the center zone is its middle third. Gaps shorter than `min_gap_ms` are
/// discarded, as are candidates whose centered window would overlap a
/// neighboring cue. Among the survivors, candidates inside the center zone
/// win, closest midpoint to the exact timeline center first; without any
/// in-zone candidate the closest candidate anywhere is used. `None` means
/// the caller should append the credit after the last cue instead.
pub fn find_best_gap(entries: &[SubtitleEntry], min_gap_ms: u64) -> Option<GapCandidate> {
    if entries.len() < 2 {
        return None;
    }

    let timeline_start = entries[0].start_time_ms;
    let timeline_end = entries[entries.len() - 1].end_time_ms;
    if timeline_end <= timeline_start {
        return None;
    }

    let total_ms = timeline_end - timeline_start;
    let center_ms = timeline_start + total_ms / 2;
    let zone_start = timeline_start + total_ms / 3;
    let zone_end = timeline_start + 2 * total_ms / 3;

    // (candidate, distance to center, inside center zone)
    let mut candidates: Vec<(GapCandidate, u64, bool)> = Vec::new();

    for i in 0..entries.len() - 1 {
        let current_end = entries[i].end_time_ms;
        let next_start = entries[i + 1].start_time_ms;

        let gap_ms = next_start.saturating_sub(current_end);
        if gap_ms < min_gap_ms {
            continue;
        }

        // Center the fixed-width window inside the gap
        let gap_midpoint = current_end + gap_ms / 2;
        let credit_start_ms = gap_midpoint - CREDIT_DURATION_MS / 2;
        let credit_end_ms = gap_midpoint + CREDIT_DURATION_MS / 2;

        // A gap can clear the minimum width yet still be too tight for the
        // window once rounding margins are accounted for
        if credit_start_ms < current_end || credit_end_ms > next_start {
            continue;
        }

        let distance = gap_midpoint.abs_diff(center_ms);
        let in_zone = gap_midpoint >= zone_start && gap_midpoint <= zone_end;

        candidates.push((
            GapCandidate {
                after_position: i,
                gap_ms,
                credit_start_ms,
                credit_end_ms,
            },
            distance,
            in_zone,
        ));
    }

    if candidates.is_empty() {
        return None;
    }

    let best = candidates
        .iter()
        .filter(|(_, _, in_zone)| *in_zone)
        .min_by_key(|(_, distance, _)| *distance)
        .or_else(|| candidates.iter().min_by_key(|(_, distance, _)| *distance))?;

    Some(best.0.clone())
}

/// Build the attribution cue appended after the last existing cue
pub fn end_credit_entry(entries: &[SubtitleEntry], credit_text: &str) -> SubtitleEntry {
    let latest_end = entries.iter().map(|e| e.end_time_ms).max().unwrap_or(0);
    let max_seq = entries.iter().map(|e| e.seq_num).max().unwrap_or(0);

    let start = latest_end + APPEND_DELAY_MS;
    SubtitleEntry::new(max_seq + 1, start, start + CREDIT_DURATION_MS, credit_text.to_string())
}

/// Insert the attribution cue into the timeline, splicing it into the best
/// gap or appending it at the end, then renumber every cue sequentially
/// starting at 1.
pub fn insert_credits(
    mut entries: Vec<SubtitleEntry>,
    credit_text: &str,
    min_gap_ms: u64,
) -> Vec<SubtitleEntry> {
    if entries.is_empty() {
        return entries;
    }

    match find_best_gap(&entries, min_gap_ms) {
        Some(gap) => {
            let credit = SubtitleEntry::new(
                0, // renumbered below
                gap.credit_start_ms,
                gap.credit_end_ms,
                credit_text.to_string(),
            );
            entries.insert(gap.after_position + 1, credit);

            info!(
                "Credits inserted at {:.1}min (in {:.1}s gap after cue {})",
                gap.credit_start_ms as f64 / 60_000.0,
                gap.gap_ms as f64 / 1_000.0,
                gap.after_position + 1
            );
        }
        None => {
            entries.push(end_credit_entry(&entries, credit_text));
            info!("Credits appended at the end (no suitable gap found)");
        }
    }

    // Keep display indices contiguous after the splice
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.seq_num = i + 1;
    }

    entries
}
