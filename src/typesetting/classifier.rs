/*!
 * Typesetting classification and deduplication.
 *
 * Walks dialogue events in chronological order, flags the ones whose
 * override-tag score reaches the threshold, and keeps only the first event of
 * each dense run of flagged lines so the editor gets one bookmark per sign.
 */

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::bookmarks::BookmarkEntry;
use super::events::DialogueEvent;
use super::scoring::OverrideTagWeightTable;

/// Forward offset applied to bookmark timestamps so the editor seeks into the line
pub const SEEK_OFFSET_MS: u64 = 100;

/// Whether a non-empty effect field flags an event on its own
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectPolicy {
    /// Only the tag score decides
    #[default]
    Ignore,
    /// A non-empty effect field qualifies the event regardless of score
    Qualifies,
}

/// Thresholds for one classification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionParams {
    /// Minimum score for an event to count as typesetting
    pub score_threshold: u32,
    /// Minimum distance in milliseconds between two bookmarks
    pub time_gap_ms: u64,
    /// Minimum distance in dialogue lines since the last flagged line
    pub line_gap: usize,
    pub effect_policy: EffectPolicy,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            score_threshold: 5,
            time_gap_ms: 2_000,
            line_gap: 2,
            effect_policy: EffectPolicy::default(),
        }
    }
}

/// Classify events and return deduplicated bookmarks in ascending order.
///
/// `events` must already be sorted by start time, as returned by
/// [`super::events::parse`]. Only dialogue events are examined and numbered.
pub fn classify(events: &[DialogueEvent], table: &OverrideTagWeightTable, params: &DetectionParams) -> Vec<BookmarkEntry> {
    let mut bookmarks = Vec::new();
    let mut last_detected_time: Option<u64> = None;
    let mut last_detected_line: Option<usize> = None;

    for (line_number, event) in events.iter().filter(|event| event.is_dialogue()).enumerate() {
        let ts_score = table.score(&event.text);
        let effect_flag = params.effect_policy == EffectPolicy::Qualifies && !event.effect.is_empty();

        if ts_score < params.score_threshold && !effect_flag {
            continue;
        }

        let time_ok = last_detected_time
            .is_none_or(|last| event.start_time_ms.saturating_sub(last) >= params.time_gap_ms);
        let line_ok = last_detected_line.is_none_or(|last| line_number - last >= params.line_gap);

        if time_ok && line_ok {
            trace!("Line {} flagged with score {}", line_number, ts_score);
            bookmarks.push(BookmarkEntry::new(line_number, event.start_time_ms.saturating_add(SEEK_OFFSET_MS)));
            last_detected_time = Some(event.start_time_ms);
        } else {
            trace!("Line {} flagged with score {} but suppressed", line_number, ts_score);
        }

        // Suppressed lines still count, so a dense run only bookmarks its first line
        last_detected_line = Some(line_number);
    }

    debug!("Detected {} typesetting bookmark(s)", bookmarks.len());
    bookmarks
}
