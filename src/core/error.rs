use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::catalog::StreamKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    Inspect,
    NoVideo,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Inspect => write!(f, "with --inspect"),
            Conflict::NoVideo => write!(f, "because no video stream is selected"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvError {
    #[error("{tool} not found")]
    ToolUnavailable { tool: String },
    #[error("{tool} returned code {} while probing {}", display_code(.code), .path.display())]
    ProbeFailed {
        tool: String,
        path: PathBuf,
        code: Option<i32>,
    },
    #[error("unable to parse JSON from {tool}: {reason}")]
    MalformedProbeOutput { tool: String, reason: String },
    #[error("invalid {kind} selection: {reason}")]
    InvalidSelection { kind: StreamKind, reason: String },
    #[error("cannot find requested {kind} stream {value} ({available} available)")]
    OutOfRangeSelection {
        kind: StreamKind,
        value: i64,
        available: usize,
    },
    #[error("cannot use argument {argument} {conflict}")]
    IncompatibleArgument {
        argument: &'static str,
        conflict: Conflict,
    },
    #[error("{what} {} not found", .path.display())]
    InputNotFound { what: &'static str, path: PathBuf },
    #[error("output file {} does not end in .mp4", .path.display())]
    OutputExtensionInvalid { path: PathBuf },
    #[error("{tool} returned code {}", display_code(.code))]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        input: PathBuf,
    },
    #[error("canceled by user")]
    UserCancelled,
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none (terminated by signal)".to_string())
}

impl ConvError {
    pub fn hint(&self) -> Option<String> {
        match self {
            ConvError::ToolUnavailable { tool } => Some(format!(
                "Check if {tool} is installed correctly and on PATH"
            )),
            ConvError::ProbeFailed { path, .. } => Some(format!(
                "Check if {} is malformed",
                path.display()
            )),
            ConvError::MalformedProbeOutput { .. } => {
                Some("Check if ffmpeg is installed correctly".to_string())
            }
            ConvError::InvalidSelection { kind, .. } => Some(format!(
                "Enter a stream number, or pass {} explicitly",
                kind.flag()
            )),
            ConvError::OutOfRangeSelection { available, .. } => Some(format!(
                "Pick a stream between 0 and {available} (0 skips it)"
            )),
            ConvError::IncompatibleArgument { conflict, .. } => match conflict {
                Conflict::Inspect => Some(
                    "--inspect only accepts the input file and --subtitle-file".to_string(),
                ),
                Conflict::NoVideo => Some(
                    "Subtitles, scaling and frame rate all need a video stream".to_string(),
                ),
            },
            ConvError::InputNotFound { .. } => None,
            ConvError::OutputExtensionInvalid { .. } => Some(
                "VRChat videos should use the .mp4 extension for best compatibility with Unity video players"
                    .to_string(),
            ),
            ConvError::NonZeroExit { input, .. } => Some(format!(
                "Check if input file {} is malformed",
                input.display()
            )),
            ConvError::UserCancelled => None,
        }
    }
}
