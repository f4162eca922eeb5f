use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::core::error::ConvError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r_frame_rate: Option<String>,
    pub bits_per_raw_sample: Option<String>,
    pub channel_layout: Option<String>,
    pub sample_rate: Option<String>,
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: RawTags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTags {
    pub language: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    streams: Vec<RawStream>,
}

pub trait StreamProber {
    fn probe_streams(&self, path: &Path) -> Result<Vec<RawStream>, ConvError>;

    fn list_decoders(&self) -> Result<String, ConvError>;
}

#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
}

impl Ffprobe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], path: Option<&Path>) -> Result<Output, ConvError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(path) = path {
            cmd.arg(path);
        }
        debug!(program = %self.program, ?args, ?path, "running prober");

        cmd.output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConvError::ToolUnavailable {
                    tool: self.program.clone(),
                }
            } else {
                ConvError::ProbeFailed {
                    tool: self.program.clone(),
                    path: path.map(Path::to_path_buf).unwrap_or_default(),
                    code: None,
                }
            }
        })
    }
}

impl StreamProber for Ffprobe {
    fn probe_streams(&self, path: &Path) -> Result<Vec<RawStream>, ConvError> {
        let output = self.run(
            &["-v", "quiet", "-print_format", "json", "-show_streams"],
            Some(path),
        )?;

        if !output.status.success() {
            return Err(ConvError::ProbeFailed {
                tool: self.program.clone(),
                path: path.to_path_buf(),
                code: output.status.code(),
            });
        }

        let streams = parse_probe_output(&self.program, &String::from_utf8_lossy(&output.stdout))?;
        debug!(count = streams.len(), path = %path.display(), "probed streams");
        Ok(streams)
    }

    fn list_decoders(&self) -> Result<String, ConvError> {
        let output = self.run(&["-v", "quiet", "-decoders"], None)?;
        if !output.status.success() {
            return Err(ConvError::ProbeFailed {
                tool: self.program.clone(),
                path: Default::default(),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub fn parse_probe_output(tool: &str, json: &str) -> Result<Vec<RawStream>, ConvError> {
    serde_json::from_str::<ProbeOutput>(json)
        .map(|output| output.streams)
        .map_err(|e| ConvError::MalformedProbeOutput {
            tool: tool.to_string(),
            reason: e.to_string(),
        })
}

static RE_H264_DECODER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"V[A-Z.]{4}D ([a-zA-Z0-9_]*h264[a-zA-Z0-9_]*)").unwrap());

pub fn h264_decoders(listing: &str) -> Vec<String> {
    RE_H264_DECODER
        .captures_iter(listing)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

// ffprobe only sometimes fills `bits_per_raw_sample`.
pub fn is_10bit_h264(stream: &RawStream) -> bool {
    stream.codec_type.as_deref() == Some("video")
        && stream.codec_name.as_deref() == Some("h264")
        && (stream
            .codec_long_name
            .as_deref()
            .is_some_and(|name| name.contains("10"))
            || stream.bits_per_raw_sample.as_deref() == Some("10"))
}
