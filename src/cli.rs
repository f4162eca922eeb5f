use std::path::PathBuf;

use clap::Parser;

use crate::core::error::{Conflict, ConvError};
use crate::core::selection::Requests;
use crate::util::{default_output_path, has_extension, OUTPUT_EXTENSION};

#[derive(Debug, Parser)]
#[command(
    name = "vrconv",
    version,
    about = "Convert media into VRChat-friendly MP4 files with ffmpeg"
)]
pub struct Cli {
    /// Input file to convert with ffmpeg
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file [defaults to the input name with a .vrc.mp4 extension]
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output video resolution, passed to ffmpeg's scale filter
    #[arg(short = 'r', long = "resolution")]
    pub resolution: Option<String>,

    /// Output video frame rate
    #[arg(short = 'f', long = "framerate", value_parser = parse_frame_rate)]
    pub framerate: Option<f64>,

    /// Select video stream (0 to skip video)
    #[arg(
        long = "video-stream",
        visible_alias = "vs",
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub video_stream: Option<i64>,

    /// Select audio stream (0 to skip audio)
    #[arg(
        long = "audio-stream",
        visible_alias = "as",
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub audio_stream: Option<i64>,

    /// Select subtitle stream (0 to skip subtitles)
    #[arg(
        long = "subtitle-stream",
        visible_alias = "ss",
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub subtitle_stream: Option<i64>,

    /// Burn subtitles from this file instead of the input's own streams
    #[arg(long = "subtitle-file", visible_alias = "sf", value_name = "FILE")]
    pub subtitle_file: Option<PathBuf>,

    /// List the input's streams without converting
    #[arg(long = "inspect")]
    pub inspect: bool,

    /// Fail instead of asking when a stream cannot be chosen automatically
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,

    /// Log subprocess invocations and selections to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(long = "ffmpeg", env = "VRCONV_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,

    #[arg(long = "ffprobe", env = "VRCONV_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: String,
}

/// Validated arguments for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub input: PathBuf,
    pub output: PathBuf,
    pub resolution: Option<String>,
    pub frame_rate: Option<f64>,
    pub subtitle_file: Option<PathBuf>,
    pub requests: Requests,
    pub inspect: bool,
    pub interactive: bool,
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Cli {
    pub fn into_invocation(self) -> Result<Invocation, ConvError> {
        if self.inspect {
            if let Some(argument) = self.first_selection_argument() {
                return Err(ConvError::IncompatibleArgument {
                    argument,
                    conflict: Conflict::Inspect,
                });
            }
        }

        if !self.input.exists() {
            return Err(ConvError::InputNotFound {
                what: "input file",
                path: self.input,
            });
        }

        if let Some(file) = &self.subtitle_file {
            if !file.exists() {
                return Err(ConvError::InputNotFound {
                    what: "subtitle file",
                    path: file.clone(),
                });
            }
        }

        let output = match self.output {
            Some(output) if !has_extension(&output, OUTPUT_EXTENSION) => {
                return Err(ConvError::OutputExtensionInvalid { path: output });
            }
            Some(output) => output,
            None => default_output_path(&self.input),
        };

        let requests = Requests {
            video: self.video_stream,
            audio: self.audio_stream,
            subtitle: self.subtitle_stream,
            resolution: self.resolution.is_some(),
            frame_rate: self.framerate.is_some(),
            subtitle_file: self.subtitle_file.is_some(),
        };

        Ok(Invocation {
            input: self.input,
            output,
            resolution: self.resolution,
            frame_rate: self.framerate,
            subtitle_file: self.subtitle_file,
            requests,
            inspect: self.inspect,
            interactive: !self.no_prompt,
            ffmpeg: self.ffmpeg,
            ffprobe: self.ffprobe,
        })
    }

    /// `--inspect` only takes the input and `--subtitle-file`.
    fn first_selection_argument(&self) -> Option<&'static str> {
        [
            ("--output", self.output.is_some()),
            ("--resolution", self.resolution.is_some()),
            ("--framerate", self.framerate.is_some()),
            ("--video-stream", self.video_stream.is_some()),
            ("--audio-stream", self.audio_stream.is_some()),
            ("--subtitle-stream", self.subtitle_stream.is_some()),
        ]
        .into_iter()
        .find_map(|(name, given)| given.then_some(name))
    }
}

fn parse_frame_rate(value: &str) -> Result<f64, String> {
    let rate = value
        .parse::<f64>()
        .map_err(|_| format!("{value} is not a number"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("{value} is not a positive frame rate"))
    }
}
