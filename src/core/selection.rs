use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::core::catalog::{StreamCatalog, StreamKind};
use crate::core::error::{Conflict, ConvError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selections {
    pub video: usize,
    pub audio: usize,
    pub subtitle: usize,
    pub image_subtitles: bool,
}

impl Selections {
    pub fn get(&self, kind: StreamKind) -> usize {
        match kind {
            StreamKind::Video => self.video,
            StreamKind::Audio => self.audio,
            StreamKind::Subtitle => self.subtitle,
        }
    }

    pub fn with(self, kind: StreamKind, index: usize, image_subtitles: bool) -> Self {
        match kind {
            StreamKind::Video => Self { video: index, ..self },
            StreamKind::Audio => Self { audio: index, ..self },
            StreamKind::Subtitle => Self {
                subtitle: index,
                image_subtitles,
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requests {
    pub video: Option<i64>,
    pub audio: Option<i64>,
    pub subtitle: Option<i64>,
    pub resolution: bool,
    pub frame_rate: bool,
    pub subtitle_file: bool,
}

impl Requests {
    pub fn explicit(&self, kind: StreamKind) -> Option<i64> {
        match kind {
            StreamKind::Video => self.video,
            StreamKind::Audio => self.audio,
            StreamKind::Subtitle => self.subtitle,
        }
    }

    fn needs_video(&self) -> Option<&'static str> {
        if self.resolution {
            Some("--resolution")
        } else if self.frame_rate {
            Some("--framerate")
        } else if self.subtitle.is_some_and(|n| n != 0) {
            Some("--subtitle-stream")
        } else if self.subtitle_file {
            Some("--subtitle-file")
        } else {
            None
        }
    }
}

pub trait SelectionPrompt {
    fn ask(&mut self, kind: StreamKind, count: usize) -> Result<String, ConvError>;
}

pub struct TerminalPrompt;

impl SelectionPrompt for TerminalPrompt {
    fn ask(&mut self, kind: StreamKind, _count: usize) -> Result<String, ConvError> {
        let mut stdout = io::stdout();
        print!("Select stream (0 for none): ");
        let read_error = |e: io::Error| ConvError::InvalidSelection {
            kind,
            reason: e.to_string(),
        };
        stdout.flush().map_err(read_error)?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map_err(read_error)?;
        Ok(line)
    }
}

pub struct NoPrompt;

impl SelectionPrompt for NoPrompt {
    fn ask(&mut self, kind: StreamKind, count: usize) -> Result<String, ConvError> {
        Err(ConvError::InvalidSelection {
            kind,
            reason: format!("{count} streams found and prompting is disabled"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub automatic: bool,
}

pub struct Resolver<'a> {
    catalog: &'a StreamCatalog,
    requests: &'a Requests,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a StreamCatalog, requests: &'a Requests) -> Self {
        Self { catalog, requests }
    }

    pub fn resolve(
        &self,
        current: Selections,
        kind: StreamKind,
        prompt: &mut dyn SelectionPrompt,
    ) -> Result<(Selections, Step), ConvError> {
        let count = self.catalog.count(kind);

        let mut choice = self.requests.explicit(kind);
        if kind == StreamKind::Subtitle && current.video == 0 {
            choice = Some(0);
        }
        if choice.is_none() && count <= 1 {
            choice = Some(count as i64);
        }

        let step = match choice {
            Some(index) => Step {
                index: check_range(kind, index, count)?,
                automatic: true,
            },
            None => {
                let answer = prompt.ask(kind, count)?;
                Step {
                    index: parse_answer(kind, &answer, count)?,
                    automatic: false,
                }
            }
        };

        if kind == StreamKind::Video && step.index == 0 {
            if let Some(argument) = self.requests.needs_video() {
                return Err(ConvError::IncompatibleArgument {
                    argument,
                    conflict: Conflict::NoVideo,
                });
            }
        }

        let image = kind == StreamKind::Subtitle
            && self
                .catalog
                .get(kind, step.index)
                .is_some_and(|stream| stream.is_image_subtitle());

        debug!(%kind, index = step.index, automatic = step.automatic, image, "resolved stream");
        Ok((current.with(kind, step.index, image), step))
    }
}

fn parse_answer(kind: StreamKind, answer: &str, count: usize) -> Result<usize, ConvError> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(ConvError::InvalidSelection {
            kind,
            reason: "no value entered".to_string(),
        });
    }
    let value = trimmed.parse::<i64>().map_err(|_| ConvError::InvalidSelection {
        kind,
        reason: format!("{trimmed} is not a valid integer"),
    })?;
    check_range(kind, value, count)
}

fn check_range(kind: StreamKind, value: i64, count: usize) -> Result<usize, ConvError> {
    usize::try_from(value)
        .ok()
        .filter(|index| *index <= count)
        .ok_or(ConvError::OutOfRangeSelection {
            kind,
            value,
            available: count,
        })
}
