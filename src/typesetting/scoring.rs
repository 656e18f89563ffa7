/*!
 * Override-tag scoring.
 *
 * Inline override blocks (`{\pos(10,20)\fs40}`) are tokenized into tag names,
 * each tag is mapped to a [`TagFamily`], and the weighted family counts are
 * summed into a typesetting score. Tags nested inside `\t(...)` count too.
 */

use std::collections::HashMap;
use std::fmt;

/// Families of override tags that hint at typesetting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
    /// `\pos`
    Position,
    /// `\fscx`, `\fscy`
    Scale,
    /// `\bord`, `\xbord`, `\ybord`
    Border,
    /// `\fn`
    FontName,
    /// `\fs`
    FontSize,
    /// `\c`, `\1c` .. `\4c`
    Color,
    /// `\fr`, `\frx`, `\fry`, `\frz`
    Rotation,
    /// `\fax`, `\fay`
    Shear,
    /// `\alpha`, `\1a` .. `\4a`
    Alpha,
    /// `\move`
    Movement,
    /// `\org`
    Origin,
    /// `\t`
    Transform,
    /// `\clip`, `\iclip`
    Clip,
    /// `\k`, `\K`, `\kf`, `\ko`
    Karaoke,
}

impl TagFamily {
    /// Classify a tag name as written after the backslash
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "pos" => Some(Self::Position),
            "fscx" | "fscy" => Some(Self::Scale),
            "bord" | "xbord" | "ybord" => Some(Self::Border),
            "fn" => Some(Self::FontName),
            "fs" => Some(Self::FontSize),
            "c" | "1c" | "2c" | "3c" | "4c" => Some(Self::Color),
            "fr" | "frx" | "fry" | "frz" => Some(Self::Rotation),
            "fax" | "fay" => Some(Self::Shear),
            "alpha" | "1a" | "2a" | "3a" | "4a" => Some(Self::Alpha),
            "move" => Some(Self::Movement),
            "org" => Some(Self::Origin),
            "t" => Some(Self::Transform),
            "clip" | "iclip" => Some(Self::Clip),
            "k" | "K" | "kf" | "ko" => Some(Self::Karaoke),
            _ => None,
        }
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tag names that can appear after a backslash, longest first so that
/// `\fscx` is not read as `\fs` and `\kf` is not read as `\k`.
/// Unscored tags are listed so they are not mistaken for a scored prefix.
const KNOWN_TAGS: &[&str] = &[
    "alpha", "iclip", "xbord", "ybord", "xshad", "yshad", "bord", "blur", "clip", "fscx", "fscy",
    "move", "shad", "fade", "fad", "fax", "fay", "frx", "fry", "frz", "fsp", "org", "pos", "an",
    "be", "fe", "fn", "fr", "fs", "kf", "ko", "b", "c", "i", "k", "K", "p", "q", "r", "s", "t", "u",
    "a",
];

/// Split the override blocks of a line into tag names.
///
/// Text outside `{...}` is ignored, so line breaks like `\N` never count.
/// Digit-prefixed colour and alpha tags (`\1c`, `\3a`) keep their digit.
pub fn override_tags(text: &str) -> Vec<&str> {
    let mut tags = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let (block, remainder) = match after.find('}') {
            Some(close) => (&after[..close], &after[close + 1..]),
            None => (after, ""),
        };
        collect_block_tags(block, &mut tags);
        rest = remainder;
    }

    tags
}

fn collect_block_tags<'a>(block: &'a str, tags: &mut Vec<&'a str>) {
    for segment in block.split('\\').skip(1) {
        if let Some(name) = tag_name(segment) {
            tags.push(name);
        }
    }
}

fn tag_name(segment: &str) -> Option<&str> {
    let bytes = segment.as_bytes();
    if bytes.len() >= 2 && matches!(bytes[0], b'1'..=b'4') && matches!(bytes[1], b'c' | b'a') {
        return Some(&segment[..2]);
    }

    KNOWN_TAGS
        .iter()
        .find(|tag| segment.starts_with(**tag))
        .map(|tag| &segment[..tag.len()])
}

/// One row of the weight table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagWeight {
    pub family: TagFamily,
    pub weight: u32,
}

/// Ordered mapping from tag family to weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideTagWeightTable {
    entries: Vec<TagWeight>,
}

impl OverrideTagWeightTable {
    /// Build a table from explicit rows. Later rows for the same family add up.
    pub fn new(entries: Vec<TagWeight>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TagWeight] {
        &self.entries
    }

    /// Typesetting score of a line: the sum of `count * weight` over the table
    pub fn score(&self, text: &str) -> u32 {
        let mut counts: HashMap<TagFamily, u32> = HashMap::new();
        for family in override_tags(text).into_iter().filter_map(TagFamily::from_tag) {
            *counts.entry(family).or_default() += 1;
        }

        self.entries
            .iter()
            .map(|entry| counts.get(&entry.family).copied().unwrap_or(0).saturating_mul(entry.weight))
            .fold(0, u32::saturating_add)
    }
}

impl Default for OverrideTagWeightTable {
    /// Position and scale weigh least, then styling, then rotation/shear/alpha,
    /// with movement, origin, transforms, clips and karaoke weighing most.
    fn default() -> Self {
        use TagFamily::*;

        let rows = [
            (Position, 1),
            (Scale, 1),
            (Border, 2),
            (FontName, 2),
            (FontSize, 2),
            (Color, 2),
            (Rotation, 3),
            (Shear, 3),
            (Alpha, 3),
            (Movement, 5),
            (Origin, 5),
            (Transform, 5),
            (Clip, 5),
            (Karaoke, 5),
        ];

        Self::new(
            rows.into_iter()
                .map(|(family, weight)| TagWeight { family, weight })
                .collect(),
        )
    }
}

/// Score a line against a weight table
pub fn score(text: &str, table: &OverrideTagWeightTable) -> u32 {
    table.score(text)
}
