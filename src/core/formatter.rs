use std::time::Duration;

use crossterm::style::{Color, Stylize};

use crate::core::catalog::{StreamDescriptor, StreamKind, PLACEHOLDER};
use crate::core::error::ConvError;

const GRAY: Color = Color::Rgb { r: 0xcc, g: 0xcc, b: 0xcc };
const MAGENTA: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0xff };
const VIOLET: Color = Color::Rgb { r: 0xcc, g: 0x66, b: 0xff };
const BLUE: Color = Color::Rgb { r: 0x44, g: 0xaa, b: 0xdd };
const AQUA: Color = Color::Rgb { r: 0x1a, g: 0xba, b: 0x97 };
const GREEN: Color = Color::Rgb { r: 0x44, g: 0xdd, b: 0x44 };
const ORANGE: Color = Color::Rgb { r: 0xec, g: 0xb6, b: 0x4a };
const RED: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0x00 };

pub fn format_category_header(kind: StreamKind, count: usize) -> String {
    format!(
        "Found {count} {} stream(s)",
        kind.as_str().with(AQUA).bold()
    )
}

pub fn format_stream_line(index: usize, stream: &StreamDescriptor) -> String {
    let fields = match stream {
        StreamDescriptor::Video(video) => vec![
            video.language.as_str().with(BLUE).bold().to_string(),
            fit(&video.codec, 50).with(ORANGE).to_string(),
            video.resolution.as_str().with(GREEN).to_string(),
            "@".with(GRAY).to_string(),
            format!("{} fps", video.frame_rate).with(VIOLET).to_string(),
        ],
        StreamDescriptor::Audio(audio) => vec![
            audio.language.as_str().with(BLUE).bold().to_string(),
            fit(&audio.codec, 30).with(ORANGE).to_string(),
            format!("{} Hz", audio.sample_rate).with(VIOLET).to_string(),
            format!("{} kbps", format_kbps(&audio.bit_rate)).with(BLUE).to_string(),
            audio.channel_layout.as_str().with(GREEN).to_string(),
        ],
        StreamDescriptor::Subtitle(subtitle) => vec![
            subtitle.language.as_str().with(BLUE).bold().to_string(),
            fit(&subtitle.title, 30).with(AQUA).to_string(),
            fit(&subtitle.codec, 30).with(ORANGE).to_string(),
        ],
    };
    format!("{} - {}", format!("[{index:2}]").bold(), fields.join(" "))
}

pub fn format_auto_selection(index: usize) -> String {
    let value = if index == 0 {
        "none".to_string()
    } else {
        index.to_string()
    };
    format!(
        "{} {}",
        "Automatically selected stream:".with(GRAY),
        value.with(MAGENTA).bold()
    )
}

pub fn format_error(err: &ConvError) -> String {
    let mut text = format!("{} {err}", "Error:".with(RED).bold());
    if let Some(hint) = err.hint() {
        text.push_str("\n  ");
        text.push_str(&hint);
    }
    text
}

pub fn format_warning(message: &str) -> String {
    format!("{} {message}", "Warning:".with(MAGENTA).bold())
}

pub fn format_command(command_line: &[String]) -> String {
    shell_words::join(command_line).with(ORANGE).to_string()
}

pub fn format_start_banner(program: &str) -> String {
    format!(
        "Starting {} (progress will update once per minute)...",
        program.with(ORANGE).bold()
    )
}

// ffprobe reports bits per second.
pub fn format_kbps(bit_rate: &str) -> String {
    match bit_rate.parse::<u64>() {
        Ok(bps) => (bps / 1000).to_string(),
        Err(_) => PLACEHOLDER.to_string(),
    }
}

pub fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return format!("{text:width$}");
    }
    let dots = width.min(3);
    let kept: String = text.chars().take(width - dots).collect();
    format!("{kept}{}", ".".repeat(dots))
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{AudioStream, SubtitleStream};

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("aac", 6), "aac   ");
        assert_eq!(fit("exactly", 7), "exactly");
        assert_eq!(fit("Advanced Audio Coding", 10), "Advance...");
        assert_eq!(fit("abcdef", 2), "..");
        assert_eq!(fit("äöüäöü", 5), "äö...");
    }

    #[test]
    fn bit_rate_is_shown_in_kbps() {
        assert_eq!(format_kbps("320000"), "320");
        assert_eq!(format_kbps("???"), "???");
    }

    #[test]
    fn duration_is_clock_formatted() {
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
        assert_eq!(format_duration(Duration::from_millis(999)), "00:00:00");
    }

    #[test]
    fn stream_lines_carry_every_field() {
        let audio = StreamDescriptor::Audio(AudioStream {
            codec: "AAC (Advanced Audio Coding)".to_string(),
            language: "eng".to_string(),
            channel_layout: "5.1(side)".to_string(),
            sample_rate: "48000".to_string(),
            bit_rate: "384000".to_string(),
        });
        let line = format_stream_line(2, &audio);
        for needle in ["[ 2]", "eng", "AAC (Advanced Audio Coding)", "48000 Hz", "384 kbps", "5.1(side)"] {
            assert!(line.contains(needle), "{needle} missing from {line}");
        }

        let subtitle = StreamDescriptor::Subtitle(SubtitleStream {
            codec: "???".to_string(),
            language: "???".to_string(),
            title: "Signs & Songs".to_string(),
            image: false,
        });
        assert!(format_stream_line(10, &subtitle).contains("[10]"));
    }

    #[test]
    fn auto_selection_names_skips() {
        assert!(format_auto_selection(0).contains("none"));
        assert!(format_auto_selection(1).contains('1'));
    }

    #[test]
    fn errors_include_hint() {
        let err = ConvError::ToolUnavailable {
            tool: "ffprobe".to_string(),
        };
        let text = format_error(&err);
        assert!(text.contains("ffprobe not found"));
        assert!(text.contains("\n  Check if ffprobe is installed"));
        assert!(!format_error(&ConvError::UserCancelled).contains('\n'));
    }

    #[test]
    fn command_is_shell_quoted() {
        let line = vec![
            "ffmpeg".to_string(),
            "-filter_complex".to_string(),
            "[0:v:0]scale=1280:720[vout]".to_string(),
            "my movie.mp4".to_string(),
        ];
        let text = format_command(&line);
        assert!(text.contains("'[0:v:0]scale=1280:720[vout]'"));
        assert!(text.contains("'my movie.mp4'"));
    }
}
