use std::path::{Path, PathBuf};

use chunksplit_core::{AudioSplitError, Config, ErrorKind, SplitReport};

use crate::cli::{parse_duration, SplitSettings};

/// Discrete user actions the window can produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SelectInput(PathBuf),
    SelectOutput(PathBuf),
    EditDuration(String),
    Split,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message the window shows in a native dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: "Attention",
            message: message.into(),
        }
    }
}

/// Everything the splitter window knows. Widgets only read it; changes go
/// through [`SplitterState::apply`].
#[derive(Clone, Debug)]
pub struct SplitterState {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    duration_text: String,
    bitrate_kbps: u32,
    notice: Option<Notice>,
}

impl SplitterState {
    pub fn new(settings: SplitSettings) -> Self {
        Self {
            input: None,
            output: None,
            duration_text: format_seconds(settings.chunk_length.as_millis()),
            bitrate_kbps: settings.bitrate_kbps,
            notice: None,
        }
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    /// Remove the pending notice so it is shown exactly once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// The job the split button would run, or the warning explaining why it
    /// cannot run yet.
    pub fn split_request(&self) -> Result<Config, Notice> {
        let (Some(input), Some(output)) = (&self.input, &self.output) else {
            return Err(Notice::warning(
                "Please select the input file and the output folder.",
            ));
        };

        let chunk_length = parse_duration(&self.duration_text)
            .map_err(|err| Notice::warning(format!("Invalid chunk duration: {err}.")))?;

        Config::builder(input, output, chunk_length)
            .bitrate(self.bitrate_kbps)
            .build()
            .map_err(|err| Notice::warning(format!("Invalid settings: {err}.")))
    }

    /// Apply `action`. A split that passes [`SplitterState::split_request`] is
    /// handed to `split`, and its outcome becomes the pending notice.
    pub fn apply<F>(&mut self, action: Action, split: F)
    where
        F: FnOnce(Config) -> Result<SplitReport, AudioSplitError>,
    {
        match action {
            Action::SelectInput(path) => self.input = Some(path),
            Action::SelectOutput(path) => self.output = Some(path),
            Action::EditDuration(text) => self.duration_text = text,
            Action::Split => {
                let notice = match self.split_request() {
                    Ok(config) => split_notice(split(config)),
                    Err(warning) => warning,
                };
                self.notice = Some(notice);
            }
        }
    }
}

fn split_notice(result: Result<SplitReport, AudioSplitError>) -> Notice {
    match result {
        Ok(report) if report.chunks.is_empty() => Notice::warning(
            "The audio file is empty; no chunks were written.",
        ),
        Ok(report) => Notice {
            level: NoticeLevel::Info,
            title: "Success",
            message: format!(
                "Audio split into {} file(s) successfully!",
                report.chunks.len()
            ),
        },
        Err(err) => Notice {
            level: NoticeLevel::Error,
            title: match err.kind() {
                ErrorKind::InputNotFound => "File not found",
                ErrorKind::Processing => "Error",
            },
            message: format!("Failed to split the audio file: {err}"),
        },
    }
}

fn format_seconds(millis: u128) -> String {
    if millis % 1_000 == 0 {
        format!("{}", millis / 1_000)
    } else {
        format!("{millis}ms")
    }
}
