use std::path::{Path, PathBuf};

use crate::core::selection::Selections;
use crate::util::has_extension;

pub const VIDEO_CODEC: &str = "h264";
pub const VIDEO_PRESET: &str = "veryslow";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "320k";
pub const STATS_PERIOD_SECS: u32 = 60;

const VIDEO_OUT: &str = "[vout]";

#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub program: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub selections: Selections,
    pub subtitle_file: Option<PathBuf>,
    pub resolution: Option<String>,
    pub frame_rate: Option<f64>,
}

impl FfmpegCommand {
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".to_string(),
            "-v".to_string(),
            "quiet".to_string(),
            "-stats".to_string(),
            "-stats_period".to_string(),
            STATS_PERIOD_SECS.to_string(),
            "-strict".to_string(),
            "2".to_string(),
            "-i".to_string(),
            path_arg(&self.input),
        ];

        if let Some(file) = self.overlay_file() {
            args.push("-i".to_string());
            args.push(path_arg(file));
        }

        let filter_graph = self.filter_graph();
        if let Some(graph) = &filter_graph {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }

        if self.selections.video == 0 {
            args.push("-vn".to_string());
        } else {
            let source = if filter_graph.is_some() {
                VIDEO_OUT.to_string()
            } else {
                format!("0:v:{}", self.selections.video - 1)
            };
            args.extend([
                "-map".to_string(),
                source,
                "-c:v".to_string(),
                VIDEO_CODEC.to_string(),
                "-preset".to_string(),
                VIDEO_PRESET.to_string(),
                "-movflags".to_string(),
                "+faststart".to_string(),
            ]);
        }

        if self.selections.audio == 0 {
            args.push("-an".to_string());
        } else {
            args.extend([
                "-map".to_string(),
                format!("0:a:{}", self.selections.audio - 1),
                "-c:a".to_string(),
                AUDIO_CODEC.to_string(),
                "-ab".to_string(),
                AUDIO_BITRATE.to_string(),
            ]);
        }

        // ffmpeg ignores options that follow the output path.
        args.push(path_arg(&self.output));

        args
    }

    pub fn to_command_line(&self) -> Vec<String> {
        let mut line = vec![self.program.clone()];
        line.extend(self.to_args());
        line
    }

    fn overlay_file(&self) -> Option<&Path> {
        if self.selections.image_subtitles && self.selections.subtitle > 0 {
            self.subtitle_file.as_deref()
        } else {
            None
        }
    }

    pub fn video_filters(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if self.selections.video == 0 {
            return filters;
        }

        let subtitle = self.selections.subtitle;
        if subtitle > 0 {
            if self.selections.image_subtitles {
                filters.push("overlay".to_string());
            } else if let Some(file) = &self.subtitle_file {
                if has_extension(file, "ass") {
                    filters.push(format!("ass={}", quote_filter_path(file)));
                } else if subtitle > 1 {
                    filters.push(format!(
                        "subtitles={}:si={}",
                        quote_filter_path(file),
                        subtitle - 1
                    ));
                } else {
                    filters.push(format!("subtitles={}", quote_filter_path(file)));
                }
            } else {
                filters.push(format!(
                    "subtitles={}:si={}",
                    quote_filter_path(&self.input),
                    subtitle - 1
                ));
            }
        }

        if let Some(resolution) = &self.resolution {
            filters.push(format!("scale={resolution}"));
        }
        if let Some(frame_rate) = self.frame_rate {
            filters.push(format!("fps={frame_rate}"));
        }

        filters
    }

    // Plain `-vf` cannot be mixed with the two-input overlay.
    pub fn filter_graph(&self) -> Option<String> {
        let filters = self.video_filters();
        if filters.is_empty() {
            return None;
        }

        let mut sources = format!("[0:v:{}]", self.selections.video - 1);
        if self.selections.image_subtitles && self.selections.subtitle > 0 {
            let input = if self.overlay_file().is_some() { 1 } else { 0 };
            sources.push_str(&format!("[{input}:s:{}]", self.selections.subtitle - 1));
        }

        Some(format!("{sources}{}{VIDEO_OUT}", filters.join(",")))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ffmpeg unescapes filter arguments twice: once for the option value and
// once for the whole graph.
fn quote_filter_path(path: &Path) -> String {
    let value = escape_chars(&path.to_string_lossy(), &['\\', '\'', ':']);
    escape_chars(&value, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
