/*!
 * Tests for typesetting classification and deduplication
 */

use subprep::typesetting::events::parse;
use subprep::typesetting::{
    classify, BookmarkEntry, DetectionParams, DialogueEvent, EffectPolicy, OverrideTagWeightTable, TypesettingDetector,
};
use crate::common::{self, dialogue};

/// Scores 6 with the default table (move 5 + pos 1)
const SCORE_SIX: &str = r"{\move(0,0,10,10)\pos(1,1)}sign";

fn run(events: &[DialogueEvent], params: &DetectionParams) -> Vec<BookmarkEntry> {
    classify(events, &OverrideTagWeightTable::default(), params)
}

#[test]
fn test_classify_withSampleDocument_shouldBookmarkSigns() {
    let events = parse(common::SAMPLE_ASS);
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(1, 4_100), BookmarkEntry::new(4, 15_100)]);
}

#[test]
fn test_classify_withSameInputTwice_shouldBeDeterministic() {
    let detector = TypesettingDetector::default();
    assert_eq!(detector.params(), &DetectionParams::default());

    let first = detector.detect(common::SAMPLE_ASS);
    let second = detector.detect(common::SAMPLE_ASS);

    assert_eq!(first, second);
}

#[test]
fn test_classify_withFirstEventAtZero_shouldNotBeSuppressed() {
    let events = vec![dialogue(0, 0, SCORE_SIX)];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, 100)]);
}

#[test]
fn test_classify_withScoreAtThreshold_shouldQualify() {
    let events = vec![
        dialogue(0, 0, r"{\k50}exactly five"),
        dialogue(1, 10_000, "plain"),
        dialogue(2, 20_000, r"{\fs20\bord2}four"),
        dialogue(3, 30_000, "plain"),
        dialogue(4, 40_000, r"{\clip(0,0,1,1)}five again"),
    ];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, 100), BookmarkEntry::new(4, 40_100)]);
}

#[test]
fn test_classify_withDenseQualifyingRun_shouldBookmarkOnlyFirstLine() {
    // Line-gap rule as recorded in DESIGN.md under "Suppressed qualifying events".
    // The suppressed second line still moves the line-gap reference, so the
    // third line is only one line past it.
    let events = vec![
        dialogue(0, 0, SCORE_SIX),
        dialogue(1, 1_000, SCORE_SIX),
        dialogue(2, 5_000, SCORE_SIX),
    ];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, 100)]);
}

#[test]
fn test_classify_withRunBrokenByDialogue_shouldBookmarkAfterGap() {
    let events = vec![
        dialogue(0, 0, SCORE_SIX),
        dialogue(1, 1_000, SCORE_SIX),
        dialogue(2, 3_000, "plain dialogue"),
        dialogue(3, 5_000, SCORE_SIX),
    ];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, 100), BookmarkEntry::new(3, 5_100)]);
}

#[test]
fn test_classify_withinTimeGap_shouldSuppress() {
    let events = vec![
        dialogue(0, 0, SCORE_SIX),
        dialogue(1, 500, "plain"),
        dialogue(2, 1_500, SCORE_SIX),
    ];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, 100)]);
}

#[test]
fn test_classify_withLargerLineGap_shouldSuppressCloseLines() {
    let events = vec![
        dialogue(0, 0, SCORE_SIX),
        dialogue(1, 10_000, "plain"),
        dialogue(2, 20_000, "plain"),
        dialogue(3, 30_000, SCORE_SIX),
    ];

    let default_gap = run(&events, &DetectionParams::default());
    assert_eq!(default_gap.len(), 2);

    let params = DetectionParams { line_gap: 4, ..DetectionParams::default() };
    let wide_gap = run(&events, &params);
    assert_eq!(wide_gap, vec![BookmarkEntry::new(0, 100)]);
}

#[test]
fn test_classify_withNonDialogueEvents_shouldNeverEmitOrCountThem() {
    let mut comment = dialogue(1, 1_000, SCORE_SIX);
    comment.line_type = "Comment".to_string();
    let events = vec![
        dialogue(0, 0, "plain"),
        comment,
        dialogue(2, 5_000, "plain"),
        dialogue(3, 9_000, SCORE_SIX),
    ];
    let bookmarks = run(&events, &DetectionParams::default());

    // The comment is skipped in numbering: the sign is dialogue line 2
    assert_eq!(bookmarks, vec![BookmarkEntry::new(2, 9_100)]);
}

#[test]
fn test_classify_withEffectField_shouldFollowPolicy() {
    let mut banner = dialogue(0, 2_000, "no tags at all");
    banner.effect = "Banner;10;0".to_string();
    let events = vec![banner];

    let ignored = run(&events, &DetectionParams::default());
    assert!(ignored.is_empty());

    let params = DetectionParams { effect_policy: EffectPolicy::Qualifies, ..DetectionParams::default() };
    let qualified = run(&events, &params);
    assert_eq!(qualified, vec![BookmarkEntry::new(0, 2_100)]);
}

#[test]
fn test_classify_withNoDialogue_shouldReturnEmpty() {
    let events = parse(common::EMPTY_EVENTS_ASS);
    assert_eq!(events.len(), 1);
    assert!(run(&events, &DetectionParams::default()).is_empty());
    assert!(run(&[], &DetectionParams::default()).is_empty());
}

#[test]
fn test_classify_withLongEpisode_shouldKeepOrderingInvariant() {
    let params = DetectionParams::default();
    let events: Vec<DialogueEvent> = (0..500usize)
        .map(|i| {
            let start = (i as u64) * 700 + (i as u64 % 7) * 90;
            let text = match i % 5 {
                0 | 3 => SCORE_SIX,
                2 if i % 3 == 0 => r"{\k20}ka",
                _ => "dialogue",
            };
            dialogue(i, start, text)
        })
        .collect();

    let bookmarks = run(&events, &params);
    assert!(bookmarks.len() > 10);

    for pair in bookmarks.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        assert!(second.timestamp_ms > first.timestamp_ms);
        assert!(second.line_number - first.line_number >= params.line_gap);
        assert!(second.timestamp_ms - first.timestamp_ms >= params.time_gap_ms);
    }
}

#[test]
fn test_classify_withLatestPossibleStartTime_shouldSaturateBookmarkTime() {
    let events = vec![dialogue(0, u64::MAX - 10, SCORE_SIX)];
    let bookmarks = run(&events, &DetectionParams::default());

    assert_eq!(bookmarks, vec![BookmarkEntry::new(0, u64::MAX)]);
}
