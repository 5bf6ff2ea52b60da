// src/parse/state.rs

use super::lines::{is_marker, marker_name, split_fields};
use super::{OverflowPolicy, ParseOptions, PreamblePolicy, Section};

/// Where the line-classification pass currently is.
///
/// An `@` line always moves to `CollectingHeaders`, whatever the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    SeekingSection,
    CollectingHeaders(Section),
    CollectingRows(Section),
}

/// What a single transition hands back to the driver, besides the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    Nothing,
    /// A section closed by the next `@` marker.
    Section(Section),
    /// A line seen before any marker, kept under `PreamblePolicy::Capture`.
    Preamble(String),
}

impl State {
    /// Feed one trimmed, non-empty line.
    pub fn advance(self, line: &str, opts: &ParseOptions) -> (State, Emit) {
        if is_marker(line) {
            let next = State::CollectingHeaders(Section::new(marker_name(line)));
            let emit = match self.into_open_section() {
                Some(done) => Emit::Section(done),
                None => Emit::Nothing,
            };
            return (next, emit);
        }

        match self {
            State::SeekingSection => {
                let emit = match opts.preamble {
                    PreamblePolicy::Discard => Emit::Nothing,
                    PreamblePolicy::Capture => Emit::Preamble(line.to_string()),
                };
                (State::SeekingSection, emit)
            }
            State::CollectingHeaders(mut section) => {
                section.headers = split_fields(line);
                (State::CollectingRows(section), Emit::Nothing)
            }
            State::CollectingRows(mut section) => {
                let row = normalize_row(split_fields(line), section.headers.len(), opts);
                section.rows.push(row);
                (State::CollectingRows(section), Emit::Nothing)
            }
        }
    }

    /// Close the pass, returning the section still open at end of input.
    pub fn finish(self) -> Option<Section> {
        self.into_open_section()
    }

    fn into_open_section(self) -> Option<Section> {
        match self {
            State::SeekingSection => None,
            State::CollectingHeaders(s) | State::CollectingRows(s) => Some(s),
        }
    }
}

/// Pad a row with the filler up to `width`; cut it down only under `OverflowPolicy::Truncate`.
pub fn normalize_row(mut row: Vec<String>, width: usize, opts: &ParseOptions) -> Vec<String> {
    if row.len() < width {
        row.resize(width, opts.filler.clone());
    } else if opts.overflow == OverflowPolicy::Truncate {
        row.truncate(width);
    }
    row
}
