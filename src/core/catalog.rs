use std::fmt;

use crate::core::probe::RawStream;

pub const PLACEHOLDER: &str = "???";

pub const IMAGE_SUBTITLE_CODECS: [&str; 4] =
    ["dvb_subtitle", "dvd_subtitle", "hdmv_pgs_subtitle", "xsub"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

impl StreamKind {
    pub const ALL: [StreamKind; 3] = [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle];

    pub fn from_codec_type(codec_type: &str) -> Option<Self> {
        match codec_type {
            "video" => Some(StreamKind::Video),
            "audio" => Some(StreamKind::Audio),
            "subtitle" => Some(StreamKind::Subtitle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            StreamKind::Video => "--video-stream",
            StreamKind::Audio => "--audio-stream",
            StreamKind::Subtitle => "--subtitle-stream",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStream {
    pub codec: String,
    pub language: String,
    pub resolution: String,
    pub frame_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub codec: String,
    pub language: String,
    pub channel_layout: String,
    pub sample_rate: String,
    pub bit_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStream {
    pub codec: String,
    pub language: String,
    pub title: String,
    pub image: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamDescriptor {
    Video(VideoStream),
    Audio(AudioStream),
    Subtitle(SubtitleStream),
}

impl StreamDescriptor {
    pub fn from_raw(raw: &RawStream) -> Option<Self> {
        let kind = StreamKind::from_codec_type(raw.codec_type.as_deref()?)?;
        let codec = or_placeholder(raw.codec_long_name.as_deref());
        let language = or_placeholder(raw.tags.language.as_deref());

        let descriptor = match kind {
            StreamKind::Video => StreamDescriptor::Video(VideoStream {
                codec,
                language,
                resolution: match (raw.width, raw.height) {
                    (Some(width), Some(height)) => format!("{width}:{height}"),
                    _ => PLACEHOLDER.to_string(),
                },
                frame_rate: raw
                    .r_frame_rate
                    .as_deref()
                    .and_then(parse_frame_rate)
                    .map(|fps| format!("{fps:.3}"))
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
            }),
            StreamKind::Audio => StreamDescriptor::Audio(AudioStream {
                codec,
                language,
                channel_layout: or_placeholder(raw.channel_layout.as_deref()),
                sample_rate: or_placeholder(raw.sample_rate.as_deref()),
                bit_rate: or_placeholder(raw.bit_rate.as_deref()),
            }),
            StreamKind::Subtitle => StreamDescriptor::Subtitle(SubtitleStream {
                codec,
                language,
                title: or_placeholder(raw.tags.title.as_deref()),
                image: raw
                    .codec_name
                    .as_deref()
                    .is_some_and(|name| IMAGE_SUBTITLE_CODECS.contains(&name)),
            }),
        };

        Some(descriptor)
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            StreamDescriptor::Video(_) => StreamKind::Video,
            StreamDescriptor::Audio(_) => StreamKind::Audio,
            StreamDescriptor::Subtitle(_) => StreamKind::Subtitle,
        }
    }

    pub fn is_image_subtitle(&self) -> bool {
        matches!(self, StreamDescriptor::Subtitle(sub) if sub.image)
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

pub fn parse_frame_rate(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/')?;
    let num = num.trim().parse::<i64>().ok()?;
    let den = den.trim().parse::<i64>().ok()?;
    if den == 0 {
        return None;
    }
    Some(num as f64 / den as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCatalog {
    video: Vec<StreamDescriptor>,
    audio: Vec<StreamDescriptor>,
    subtitle: Vec<StreamDescriptor>,
}

impl StreamCatalog {
    pub fn from_raw(streams: &[RawStream]) -> Self {
        let mut catalog = Self::default();
        for descriptor in streams.iter().filter_map(StreamDescriptor::from_raw) {
            catalog.list_mut(descriptor.kind()).push(descriptor);
        }
        catalog
    }

    pub fn streams(&self, kind: StreamKind) -> &[StreamDescriptor] {
        match kind {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
            StreamKind::Subtitle => &self.subtitle,
        }
    }

    pub fn count(&self, kind: StreamKind) -> usize {
        self.streams(kind).len()
    }

    pub fn get(&self, kind: StreamKind, index: usize) -> Option<&StreamDescriptor> {
        index
            .checked_sub(1)
            .and_then(|i| self.streams(kind).get(i))
    }

    pub fn with_subtitles_from(mut self, other: StreamCatalog) -> Self {
        self.subtitle = other.subtitle;
        self
    }

    fn list_mut(&mut self, kind: StreamKind) -> &mut Vec<StreamDescriptor> {
        match kind {
            StreamKind::Video => &mut self.video,
            StreamKind::Audio => &mut self.audio,
            StreamKind::Subtitle => &mut self.subtitle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::RawTags;

    fn raw(codec_type: &str) -> RawStream {
        RawStream {
            codec_type: Some(codec_type.to_string()),
            ..RawStream::default()
        }
    }

    #[test]
    fn bare_records_render_placeholders() {
        let video = StreamDescriptor::from_raw(&raw("video")).unwrap();
        assert_eq!(
            video,
            StreamDescriptor::Video(VideoStream {
                codec: "???".to_string(),
                language: "???".to_string(),
                resolution: "???".to_string(),
                frame_rate: "???".to_string(),
            })
        );

        let audio = StreamDescriptor::from_raw(&raw("audio")).unwrap();
        assert_eq!(
            audio,
            StreamDescriptor::Audio(AudioStream {
                codec: "???".to_string(),
                language: "???".to_string(),
                channel_layout: "???".to_string(),
                sample_rate: "???".to_string(),
                bit_rate: "???".to_string(),
            })
        );

        let subtitle = StreamDescriptor::from_raw(&raw("subtitle")).unwrap();
        assert_eq!(
            subtitle,
            StreamDescriptor::Subtitle(SubtitleStream {
                codec: "???".to_string(),
                language: "???".to_string(),
                title: "???".to_string(),
                image: false,
            })
        );
    }

    #[test]
    fn video_fields_are_normalized() {
        let record = RawStream {
            codec_long_name: Some("H.264 / AVC".to_string()),
            width: Some(1920),
            height: Some(1080),
            r_frame_rate: Some("24000/1001".to_string()),
            tags: RawTags {
                language: Some("jpn".to_string()),
                title: None,
            },
            ..raw("video")
        };
        let StreamDescriptor::Video(video) = StreamDescriptor::from_raw(&record).unwrap() else {
            panic!("expected a video descriptor");
        };
        assert_eq!(video.resolution, "1920:1080");
        assert_eq!(video.frame_rate, "23.976");
        assert_eq!(video.language, "jpn");
        assert_eq!(video.codec, "H.264 / AVC");
    }

    #[test]
    fn half_a_resolution_is_unknown() {
        let record = RawStream {
            width: Some(640),
            r_frame_rate: Some("30/0".to_string()),
            ..raw("video")
        };
        let StreamDescriptor::Video(video) = StreamDescriptor::from_raw(&record).unwrap() else {
            panic!("expected a video descriptor");
        };
        assert_eq!(video.resolution, PLACEHOLDER);
        assert_eq!(video.frame_rate, PLACEHOLDER);
    }

    #[test]
    fn image_subtitles_are_flagged_by_codec_name() {
        let pgs = RawStream {
            codec_name: Some("hdmv_pgs_subtitle".to_string()),
            ..raw("subtitle")
        };
        let srt = RawStream {
            codec_name: Some("subrip".to_string()),
            ..raw("subtitle")
        };
        assert!(StreamDescriptor::from_raw(&pgs).unwrap().is_image_subtitle());
        assert!(!StreamDescriptor::from_raw(&srt).unwrap().is_image_subtitle());
    }

    #[test]
    fn catalog_groups_in_probe_order_and_skips_unknown_types() {
        let streams = vec![
            RawStream {
                codec_long_name: Some("first".to_string()),
                ..raw("audio")
            },
            raw("video"),
            raw("data"),
            RawStream::default(),
            raw("attachment"),
            RawStream {
                codec_long_name: Some("second".to_string()),
                ..raw("audio")
            },
        ];
        let catalog = StreamCatalog::from_raw(&streams);

        assert_eq!(catalog.count(StreamKind::Video), 1);
        assert_eq!(catalog.count(StreamKind::Audio), 2);
        assert_eq!(catalog.count(StreamKind::Subtitle), 0);

        let StreamDescriptor::Audio(first) = catalog.get(StreamKind::Audio, 1).unwrap() else {
            panic!("expected audio");
        };
        assert_eq!(first.codec, "first");
        assert!(catalog.get(StreamKind::Audio, 0).is_none());
        assert!(catalog.get(StreamKind::Audio, 3).is_none());
    }

    #[test]
    fn external_subtitles_replace_embedded_ones() {
        let input = StreamCatalog::from_raw(&[raw("video"), raw("subtitle"), raw("subtitle")]);
        let external = StreamCatalog::from_raw(&[raw("subtitle")]);
        let merged = input.with_subtitles_from(external);
        assert_eq!(merged.count(StreamKind::Video), 1);
        assert_eq!(merged.count(StreamKind::Subtitle), 1);
    }
}
