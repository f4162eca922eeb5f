use tracing::{debug, info};

pub mod catalog;
pub mod command;
pub mod error;
pub mod formatter;
pub mod job;
pub mod probe;
pub mod runner;
pub mod selection;

use crate::cli::Invocation;
use crate::util::is_text_subtitle_file;
use catalog::{StreamCatalog, StreamKind};
use command::FfmpegCommand;
use error::ConvError;
use formatter::{
    format_auto_selection, format_category_header, format_command, format_start_banner,
    format_stream_line, format_warning,
};
use job::Job;
use probe::{h264_decoders, is_10bit_h264, Ffprobe, RawStream, StreamProber};
use selection::{NoPrompt, Resolver, SelectionPrompt, Selections, TerminalPrompt};

#[derive(Debug)]
pub enum Outcome {
    Inspected,
    Converted(Job),
}

pub fn run(invocation: &Invocation) -> Result<Outcome, ConvError> {
    let prober = Ffprobe::new(invocation.ffprobe.as_str());
    let mut prompt: Box<dyn SelectionPrompt> = if invocation.interactive {
        Box::new(TerminalPrompt)
    } else {
        Box::new(NoPrompt)
    };

    let Some(command) = plan(invocation, &prober, prompt.as_mut())? else {
        return Ok(Outcome::Inspected);
    };

    println!("{}", format_start_banner(&command.program));
    println!("{}", format_command(&command.to_command_line()));

    let job = runner::run(&command)?;
    info!(output = %command.output.display(), "conversion finished");
    Ok(Outcome::Converted(job))
}

pub fn plan(
    invocation: &Invocation,
    prober: &dyn StreamProber,
    prompt: &mut dyn SelectionPrompt,
) -> Result<Option<FfmpegCommand>, ConvError> {
    if let Some(file) = &invocation.subtitle_file {
        if !is_text_subtitle_file(file) {
            eprintln!(
                "{}\n",
                format_warning("Subtitle files other than .srt and .ass may not be handled correctly")
            );
        }
    }

    let catalog = load_catalog(invocation, prober)?;
    let resolver = Resolver::new(&catalog, &invocation.requests);
    let mut selections = Selections::default();

    for kind in StreamKind::ALL {
        let streams = catalog.streams(kind);
        println!("{}", format_category_header(kind, streams.len()));
        for (i, stream) in streams.iter().enumerate() {
            println!("{}", format_stream_line(i + 1, stream));
        }

        if invocation.inspect {
            println!();
            continue;
        }

        let (next, step) = resolver.resolve(selections, kind, prompt)?;
        if step.automatic {
            println!("{}", format_auto_selection(next.get(kind)));
        }
        selections = next;
        println!();
    }

    if invocation.inspect {
        return Ok(None);
    }

    debug!(?selections, "all streams resolved");
    Ok(Some(FfmpegCommand {
        program: invocation.ffmpeg.clone(),
        input: invocation.input.clone(),
        output: invocation.output.clone(),
        selections,
        subtitle_file: invocation.subtitle_file.clone(),
        resolution: invocation.resolution.clone(),
        frame_rate: invocation.frame_rate,
    }))
}

fn load_catalog(
    invocation: &Invocation,
    prober: &dyn StreamProber,
) -> Result<StreamCatalog, ConvError> {
    let streams = prober.probe_streams(&invocation.input)?;
    warn_on_10bit_h264(&streams, prober)?;
    let catalog = StreamCatalog::from_raw(&streams);

    match &invocation.subtitle_file {
        Some(file) => {
            let external = StreamCatalog::from_raw(&prober.probe_streams(file)?);
            Ok(catalog.with_subtitles_from(external))
        }
        None => Ok(catalog),
    }
}

// Other H.264 decoders tend to crash on 10-bit input.
fn warn_on_10bit_h264(streams: &[RawStream], prober: &dyn StreamProber) -> Result<(), ConvError> {
    if !streams.iter().any(is_10bit_h264) {
        return Ok(());
    }

    let decoders = h264_decoders(&prober.list_decoders()?);
    debug!(?decoders, "h264 decoders available");
    if !decoders.iter().any(|name| name == "h264") {
        eprintln!(
            "{}\n  Found decoders: {}\n  Attempting to convert the video anyway...\n",
            format_warning(
                "This appears to be a 10-bit H.264 video, and the standard H.264 decoder does not \
                 appear to be present. Other H.264 decoders frequently crash on 10-bit video. If \
                 this is a FOSS-only build of ffmpeg, consider getting a full build."
            ),
            decoders.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::core::probe::parse_probe_output;
    use crate::core::selection::Requests;

    struct FakeProber {
        files: HashMap<PathBuf, String>,
        decoders: String,
        decoder_calls: Cell<usize>,
    }

    impl FakeProber {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, json)| (PathBuf::from(path), json.to_string()))
                    .collect(),
                decoders: String::new(),
                decoder_calls: Cell::new(0),
            }
        }
    }

    impl StreamProber for FakeProber {
        fn probe_streams(&self, path: &Path) -> Result<Vec<RawStream>, ConvError> {
            match self.files.get(path) {
                Some(json) => parse_probe_output("fake", json),
                None => Err(ConvError::ProbeFailed {
                    tool: "fake".to_string(),
                    path: path.to_path_buf(),
                    code: Some(1),
                }),
            }
        }

        fn list_decoders(&self) -> Result<String, ConvError> {
            self.decoder_calls.set(self.decoder_calls.get() + 1);
            Ok(self.decoders.clone())
        }
    }

    const MOVIE: &str = r#"{"streams": [
        {"codec_type": "video", "codec_name": "hevc", "width": 1920, "height": 1080},
        {"codec_type": "audio", "codec_name": "aac"},
        {"codec_type": "data"}
    ]}"#;

    const ANIME: &str = r#"{"streams": [
        {"codec_type": "video", "codec_name": "h264", "codec_long_name": "H.264 High 10", "bits_per_raw_sample": "10"},
        {"codec_type": "audio", "codec_name": "flac"},
        {"codec_type": "audio", "codec_name": "aac"},
        {"codec_type": "subtitle", "codec_name": "ass"},
        {"codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle"}
    ]}"#;

    const SUBS: &str = r#"{"streams": [{"codec_type": "subtitle", "codec_name": "subrip"}]}"#;

    fn invocation(input: &str) -> Invocation {
        Invocation {
            input: PathBuf::from(input),
            output: PathBuf::from("out.mp4"),
            resolution: None,
            frame_rate: None,
            subtitle_file: None,
            requests: Requests::default(),
            inspect: false,
            interactive: false,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }

    #[test]
    fn single_streams_plan_without_prompting() {
        let prober = FakeProber::new(&[("movie.mkv", MOVIE)]);
        let command = plan(&invocation("movie.mkv"), &prober, &mut NoPrompt)
            .unwrap()
            .unwrap();
        assert_eq!(
            command.selections,
            Selections {
                video: 1,
                audio: 1,
                subtitle: 0,
                image_subtitles: false,
            }
        );
        assert_eq!(command.output, PathBuf::from("out.mp4"));
        assert_eq!(prober.decoder_calls.get(), 0);
    }

    #[test]
    fn inspect_lists_without_resolving() {
        let prober = FakeProber::new(&[("anime.mkv", ANIME)]);
        let mut inspect = invocation("anime.mkv");
        inspect.inspect = true;
        // Two audio streams would need a prompt, which NoPrompt refuses.
        assert!(plan(&inspect, &prober, &mut NoPrompt).unwrap().is_none());
    }

    #[test]
    fn explicit_choices_reach_the_command() {
        let prober = FakeProber::new(&[("anime.mkv", ANIME)]);
        let mut inv = invocation("anime.mkv");
        inv.requests.audio = Some(2);
        inv.requests.subtitle = Some(2);
        let command = plan(&inv, &prober, &mut NoPrompt).unwrap().unwrap();
        assert_eq!(command.selections.audio, 2);
        assert!(command.selections.image_subtitles);
        assert_eq!(
            command.filter_graph().as_deref(),
            Some("[0:v:0][0:s:1]overlay[vout]")
        );
        assert_eq!(prober.decoder_calls.get(), 1);
    }

    #[test]
    fn subtitle_file_replaces_embedded_subtitles() {
        let prober = FakeProber::new(&[("anime.mkv", ANIME), ("anime.en.srt", SUBS)]);
        let mut inv = invocation("anime.mkv");
        inv.requests.audio = Some(1);
        inv.requests.subtitle_file = true;
        inv.subtitle_file = Some(PathBuf::from("anime.en.srt"));
        let command = plan(&inv, &prober, &mut NoPrompt).unwrap().unwrap();
        assert_eq!(command.selections.subtitle, 1);
        assert!(!command.selections.image_subtitles);
        assert_eq!(
            command.video_filters(),
            vec!["subtitles=anime.en.srt".to_string()]
        );
    }

    #[test]
    fn probe_failures_propagate() {
        let prober = FakeProber::new(&[]);
        let err = plan(&invocation("gone.mkv"), &prober, &mut NoPrompt).unwrap_err();
        assert!(matches!(err, ConvError::ProbeFailed { code: Some(1), .. }));
    }
}
