use std::path::{Path, PathBuf};

pub mod logging;

pub const OUTPUT_EXTENSION: &str = "mp4";

pub const DEFAULT_OUTPUT_SUFFIX: &str = "vrc.mp4";

pub const TEXT_SUBTITLE_EXTENSIONS: [&str; 2] = ["srt", "ass"];

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(DEFAULT_OUTPUT_SUFFIX)
}

pub fn is_text_subtitle_file(path: &Path) -> bool {
    TEXT_SUBTITLE_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
}
