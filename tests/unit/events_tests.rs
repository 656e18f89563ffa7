/*!
 * Tests for dialogue event parsing
 */

use subprep::typesetting::events::{parse, DialogueEvent, ScriptSections};
use crate::common;

#[test]
fn test_parse_withSampleDocument_shouldReturnAllEventsSorted() {
    let events = parse(common::SAMPLE_ASS);

    assert_eq!(events.len(), 6);
    let starts: Vec<u64> = events.iter().map(|event| event.start_time_ms).collect();
    assert_eq!(starts, vec![1_000, 4_000, 5_000, 7_000, 10_000, 15_000]);
    assert_eq!(events.iter().filter(|event| event.is_dialogue()).count(), 5);
    assert_eq!(events[2].line_type, "Comment");
}

#[test]
fn test_parse_withCommaInText_shouldKeepWholeText() {
    let events = parse(common::SAMPLE_ASS);

    assert_eq!(events[4].text, "Somewhere, I guess.");
    assert_eq!(events[1].text, r"{\pos(320,50)\fnImpact\fs60\frz10\bord3}Station");
}

#[test]
fn test_parse_withOutOfOrderEvents_shouldSortStablyByStartTime() {
    let document = "[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,late
Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,first tie
Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,second tie
";
    let events = parse(document);

    let texts: Vec<&str> = events.iter().map(|event| event.text.as_str()).collect();
    assert_eq!(texts, vec!["first tie", "second tie", "late"]);
    let indexes: Vec<usize> = events.iter().map(|event| event.original_index).collect();
    assert_eq!(indexes, vec![1, 2, 0]);
}

#[test]
fn test_parse_withMalformedLines_shouldSkipThem() {
    let document = "[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,kept
Dialogue: 0,bad-time,0:00:02.00,Default,,0,0,0,,bad timestamp
Dialogue: 0,0:00:03.00,0:00:04.00
this line has no type
Dialogue: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,also kept
";
    let events = parse(document);

    let texts: Vec<&str> = events.iter().map(|event| event.text.as_str()).collect();
    assert_eq!(texts, vec!["kept", "also kept"]);
}

#[test]
fn test_parse_withoutFormatLine_shouldUseDefaultLayout() {
    let document = "[Events]
Dialogue: 0,0:01:02.34,0:01:03.00,Default,,0,0,0,Scroll up;10,{\\pos(1,1)}text
";
    let events = parse(document);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_time_ms, 62_340);
    assert_eq!(events[0].effect, "Scroll up;10");
    assert_eq!(events[0].text, "{\\pos(1,1)}text");
}

#[test]
fn test_parse_withCustomFormatLine_shouldFollowFieldPositions() {
    let document = "[Events]
Format: Start, End, Style, Text
Dialogue: 0:00:02.50,0:00:03.00,Default,short layout
";
    let events = parse(document);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_time_ms, 2_500);
    assert_eq!(events[0].effect, "");
    assert_eq!(events[0].text, "short layout");
}

#[test]
fn test_parse_withSsaMarkedField_shouldReadStartTime() {
    let document = "[Events]
Format: Marked, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: Marked=0,0:00:07.00,0:00:08.00,Default,,0000,0000,0000,,ssa line
";
    let events = parse(document);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_time_ms, 7_000);
}

#[test]
fn test_parse_withoutEventsSection_shouldReturnEmpty() {
    let document = "[Script Info]
Title: Nothing here
Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,outside events
";
    assert!(parse(document).is_empty());
    assert!(parse("").is_empty());
}

#[test]
fn test_parse_withByteOrderMarkAndCrlf_shouldParseEvents() {
    let document = "\u{feff}[Events]\r\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\r\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,windows\r\n";
    let events = parse(document);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].text, "windows");
}

#[test]
fn test_scriptSections_split_shouldSeparateKnownSections() {
    let sections = ScriptSections::split(common::SAMPLE_ASS);

    assert_eq!(sections.script_info.len(), 4);
    assert_eq!(sections.styles.len(), 3);
    assert_eq!(sections.events.len(), 7);
}

#[test]
fn test_parseTimestamp_withHoursAboveNine_shouldConvertToMilliseconds() {
    assert_eq!(DialogueEvent::parse_timestamp("10:00:00.01"), Some(36_000_010));
    assert_eq!(DialogueEvent::parse_timestamp("0:00:00.00"), Some(0));
    assert_eq!(DialogueEvent::parse_timestamp(""), None);
}

#[test]
fn test_parse_withOversizedTimestampFields_shouldSkipLine() {
    let document = "[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,99999999999999999:00:00.00,0:00:02.00,Default,,0,0,0,,huge hours
Dialogue: 0,99999999999999999999999:00:00.00,0:00:02.00,Default,,0,0,0,,beyond u64
Dialogue: 0,0:75:00.00,0:00:02.00,Default,,0,0,0,,minutes out of range
Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,ok
";
    let events = parse(document);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].text, "ok");
    assert_eq!(events[0].start_time_ms, 1_000);
    assert_eq!(events[0].original_index, 0);
}

#[test]
fn test_parseTimestamp_withOverflowingHours_shouldReturnNone() {
    assert_eq!(DialogueEvent::parse_timestamp("5124095576030431:00:00.00"), None);
    assert_eq!(DialogueEvent::parse_timestamp("5124095576:00:00.00"), Some(18_446_744_073_600_000));
}
