/*!
 * Container introspection.
 *
 * Parses the JSON identification output of `mkvmerge -J` into the handful of
 * facts the workflow needs: video resolution, subtitle tracks and attachments.
 */

use serde::Deserialize;
use std::path::Path;

use crate::errors::ToolError;

/// Codec identifiers of text subtitle tracks in the ASS/SSA family
const ASS_CODECS: &[&str] = &["S_TEXT/ASS", "S_TEXT/SSA", "S_ASS", "S_SSA", "SubStationAlpha"];

/// Font file extensions recognised among attachments
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

/// The video track of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTrack {
    pub id: u64,
    pub codec: String,
    pub width: u32,
    pub height: u32,
}

/// A subtitle track of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub id: u64,
    pub codec: String,
    pub codec_id: Option<String>,
    pub language: Option<String>,
    pub name: Option<String>,
}

impl SubtitleTrack {
    /// Whether the track holds ASS/SSA text subtitles
    pub fn is_ass(&self) -> bool {
        ASS_CODECS.contains(&self.codec.as_str())
            || self.codec_id.as_deref().is_some_and(|id| ASS_CODECS.contains(&id))
    }

    /// File extension for the extracted track
    pub fn file_extension(&self) -> &'static str {
        let ids = [Some(self.codec.as_str()), self.codec_id.as_deref()];
        if ids.iter().flatten().any(|id| id.contains("SSA") && !id.contains("ASS") && *id != "SubStationAlpha") {
            "ssa"
        } else if self.is_ass() {
            "ass"
        } else if ids.iter().flatten().any(|id| id.contains("UTF8") || id.contains("SubRip")) {
            "srt"
        } else {
            "sub"
        }
    }
}

/// A file attached to a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: u64,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

impl Attachment {
    /// Whether the attachment is a font, by MIME type or extension
    pub fn is_font(&self) -> bool {
        let mime_is_font = self.content_type.as_deref().is_some_and(|mime| {
            let mime = mime.to_ascii_lowercase();
            mime.starts_with("font/")
                || mime.contains("truetype")
                || mime.contains("opentype")
                || mime == "application/vnd.ms-opentype"
        });

        mime_is_font
            || Path::new(&self.file_name)
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// What the workflow needs to know about a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub video: Option<VideoTrack>,
    pub subtitles: Vec<SubtitleTrack>,
    pub attachments: Vec<Attachment>,
}

impl ContainerInfo {
    /// Parse `mkvmerge -J` output
    pub fn from_mkvmerge_json(json: &str) -> Result<Self, ToolError> {
        let raw: Identification = serde_json::from_str(json).map_err(|e| ToolError::InvalidOutput {
            tool: "mkvmerge".to_string(),
            message: format!("invalid identification JSON: {}", e),
        })?;

        if raw.container.as_ref().is_some_and(|container| !container.recognized) {
            return Err(ToolError::InvalidOutput {
                tool: "mkvmerge".to_string(),
                message: "container format not recognized".to_string(),
            });
        }

        let mut info = ContainerInfo::default();
        for track in raw.tracks {
            match track.track_type.as_str() {
                "video" if info.video.is_none() => {
                    let (width, height) = track
                        .properties
                        .pixel_dimensions
                        .as_deref()
                        .and_then(parse_dimensions)
                        .unwrap_or((0, 0));
                    info.video = Some(VideoTrack { id: track.id, codec: track.codec, width, height });
                }
                "subtitles" => info.subtitles.push(SubtitleTrack {
                    id: track.id,
                    codec: track.codec,
                    codec_id: track.properties.codec_id,
                    language: track.properties.language,
                    name: track.properties.track_name,
                }),
                _ => {}
            }
        }

        info.attachments = raw
            .attachments
            .into_iter()
            .map(|attachment| Attachment {
                id: attachment.id,
                file_name: attachment.file_name,
                content_type: attachment.content_type,
                size: attachment.size,
            })
            .collect();

        Ok(info)
    }

    /// The first ASS/SSA track, or the first subtitle track of any kind
    pub fn preferred_subtitle(&self) -> Option<&SubtitleTrack> {
        self.subtitles
            .iter()
            .find(|track| track.is_ass())
            .or_else(|| self.subtitles.first())
    }

    /// Attachments that are fonts
    pub fn font_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|attachment| attachment.is_font())
    }
}

/// Parse `"1920x1080"` into `(1920, 1080)`
pub fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}

#[derive(Debug, Deserialize)]
struct Identification {
    #[serde(default)]
    container: Option<RawContainer>,
    #[serde(default)]
    tracks: Vec<RawTrack>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    #[serde(default = "default_recognized")]
    recognized: bool,
}

fn default_recognized() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: u64,
    #[serde(rename = "type")]
    track_type: String,
    #[serde(default)]
    codec: String,
    #[serde(default)]
    properties: RawTrackProperties,
}

#[derive(Debug, Default, Deserialize)]
struct RawTrackProperties {
    codec_id: Option<String>,
    language: Option<String>,
    track_name: Option<String>,
    pixel_dimensions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAttachment {
    id: u64,
    file_name: String,
    content_type: Option<String>,
    #[serde(default)]
    size: u64,
}
