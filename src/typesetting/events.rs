/*!
 * Dialogue event parsing for ASS/SSA subtitle documents.
 *
 * The document is split into its script-info, styles and events sections.
 * Only the events section is parsed further: every `Kind: fields` line is
 * turned into a [`DialogueEvent`] according to the section's `Format:` line.
 * Lines that do not fit the schema are skipped, since subtitle files are
 * routinely edited by hand.
 */

use log::{debug, trace, warn};
use std::fmt;

/// Event category that participates in typesetting detection
pub const DIALOGUE: &str = "Dialogue";

const SCRIPT_INFO_HEADER: &str = "[script info]";
const EVENTS_HEADER: &str = "[events]";

/// Field layout used when the events section has no `Format:` line (ASS v4+)
const DEFAULT_FORMAT: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// One parsed line of the events section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    /// Event category, e.g. `Dialogue` or `Comment`
    pub line_type: String,

    /// Start time in milliseconds (centisecond precision)
    pub start_time_ms: u64,

    /// Free-text effect field
    pub effect: String,

    /// Payload text including override blocks
    pub text: String,

    /// Position among the successfully parsed events, in file order.
    /// Skipped lines and `Format:` lines are not counted.
    pub original_index: usize,
}

impl DialogueEvent {
    /// Whether this event belongs to the dialogue category
    pub fn is_dialogue(&self) -> bool {
        self.line_type == DIALOGUE
    }

    /// Parse an ASS timestamp (`H:MM:SS.CC`) into milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
        let (hours, rest) = timestamp.trim().split_once(':')?;
        let (minutes, rest) = rest.split_once(':')?;
        let (seconds, centis) = rest.split_once('.')?;

        if minutes.len() != 2 || seconds.len() != 2 || centis.len() != 2 {
            return None;
        }

        let hours: u64 = parse_digits(hours)?;
        let minutes: u64 = parse_digits(minutes)?;
        let seconds: u64 = parse_digits(seconds)?;
        let centis: u64 = parse_digits(centis)?;

        if minutes >= 60 || seconds >= 60 {
            return None;
        }

        hours
            .checked_mul(3600)?
            .checked_add(minutes * 60 + seconds)?
            .checked_mul(1000)?
            .checked_add(centis * 10)
    }
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl fmt::Display for DialogueEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {} @{}ms: {}", self.original_index, self.line_type, self.start_time_ms, self.text)
    }
}

/// Raw section bodies of a subtitle document
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptSections<'a> {
    pub script_info: Vec<&'a str>,
    pub styles: Vec<&'a str>,
    pub events: Vec<&'a str>,
}

impl<'a> ScriptSections<'a> {
    /// Split a document into its sections by their header lines.
    ///
    /// Lines of unrelated sections (`[Fonts]`, `[Aegisub Project Garbage]`, ...)
    /// are dropped.
    pub fn split(document: &'a str) -> Self {
        #[derive(Clone, Copy)]
        enum Section {
            None,
            ScriptInfo,
            Styles,
            Events,
        }

        let mut sections = ScriptSections::default();
        let mut current = Section::None;

        for line in document.trim_start_matches('\u{feff}').lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                let header = trimmed.to_ascii_lowercase();
                current = if header == SCRIPT_INFO_HEADER {
                    Section::ScriptInfo
                } else if header.contains("styles") {
                    Section::Styles
                } else if header == EVENTS_HEADER {
                    Section::Events
                } else {
                    Section::None
                };
                continue;
            }

            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            match current {
                Section::ScriptInfo => sections.script_info.push(trimmed),
                Section::Styles => sections.styles.push(trimmed),
                Section::Events => sections.events.push(trimmed),
                Section::None => {}
            }
        }

        sections
    }
}

/// Column positions of the fields the parser reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFormat {
    start: usize,
    effect: Option<usize>,
    field_count: usize,
}

impl EventFormat {
    /// Build a layout from the field names of a `Format:` line.
    ///
    /// `Text` must be the last field because it may contain commas.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        let position = |name: &str| {
            fields.iter().position(|field| field.as_ref().trim().eq_ignore_ascii_case(name))
        };

        let start = position("Start")?;
        let text = position("Text")?;
        if text + 1 != fields.len() {
            return None;
        }

        Some(Self {
            start,
            effect: position("Effect"),
            field_count: fields.len(),
        })
    }
}

impl Default for EventFormat {
    fn default() -> Self {
        // DEFAULT_FORMAT always contains Start and ends with Text
        Self {
            start: 1,
            effect: Some(8),
            field_count: DEFAULT_FORMAT.len(),
        }
    }
}

/// Parse a subtitle document into events sorted by start time.
///
/// Ties keep file order. Malformed lines are skipped.
pub fn parse(document: &str) -> Vec<DialogueEvent> {
    let sections = ScriptSections::split(document);
    let mut format = EventFormat::default();
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for line in sections.events {
        let Some((kind, body)) = line.split_once(':') else {
            skipped += 1;
            debug!("Skipping event line without a type: {}", line);
            continue;
        };
        let kind = kind.trim();

        if kind.eq_ignore_ascii_case("Format") {
            let fields: Vec<&str> = body.split(',').collect();
            match EventFormat::from_fields(fields.as_slice()) {
                Some(parsed) => format = parsed,
                None => warn!("Unusable events Format line, keeping previous layout: {}", line),
            }
            continue;
        }

        match parse_event_line(kind, body, &format, events.len()) {
            Some(event) => {
                trace!("Parsed event {}", event);
                events.push(event);
            }
            None => {
                skipped += 1;
                debug!("Skipping malformed event line: {}", line);
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed event line(s)", skipped);
    }

    // Stable sort: equal start times keep their file order
    events.sort_by_key(|event| event.start_time_ms);
    events
}

fn parse_event_line(kind: &str, body: &str, format: &EventFormat, original_index: usize) -> Option<DialogueEvent> {
    if kind.is_empty() || kind.contains(char::is_whitespace) {
        return None;
    }

    let fields: Vec<&str> = body.trim_start().splitn(format.field_count, ',').collect();
    if fields.len() != format.field_count {
        return None;
    }

    let start_time_ms = DialogueEvent::parse_timestamp(fields[format.start])?;
    let effect = format
        .effect
        .map(|index| fields[index].trim().to_string())
        .unwrap_or_default();
    let text = fields[format.field_count - 1].to_string();

    Some(DialogueEvent {
        line_type: kind.to_string(),
        start_time_ms,
        effect,
        text,
        original_index,
    })
}
