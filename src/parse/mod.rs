// src/parse/mod.rs

//! Parser for `@section` message bodies.
//!
//! ```text
//! @User
//! name,age
//! Alice,30
//! Bob,
//! ```
//!
//! Each `@name` line opens a section, the next non-blank line is its header
//! row and every line after that (until the next `@`) is a data row. The
//! parse is total: any input yields a (possibly empty) list of sections.

pub mod lines;
pub mod state;

use serde::{Deserialize, Serialize};

use lines::{content_lines, from_first_marker};
use state::{Emit, State};

/// One `@name` block with its header row and data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Text after the `@`, trimmed. Not unique across a parse.
    pub name: String,
    /// Fields of the first line after the marker; empty if none came before the next marker.
    pub headers: Vec<String>,
    /// Data lines, each at least `headers.len()` long.
    pub rows: Vec<Vec<String>>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Widest of the header row and every data row.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// What happens to lines that come before the first `@` marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreamblePolicy {
    /// Drop everything before the first `@` character.
    #[default]
    Discard,
    /// Keep non-blank lines before the first marker line in `Parsed::preamble`.
    Capture,
}

/// What happens to rows with more fields than the section has headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    Keep,
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub preamble: PreamblePolicy,
    /// Value appended to short rows. Display placeholders are a renderer concern.
    pub filler: String,
    pub overflow: OverflowPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preamble: PreamblePolicy::Discard,
            filler: String::new(),
            overflow: OverflowPolicy::Keep,
        }
    }
}

/// Sections plus whatever preamble was captured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parsed {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<String>,
    pub sections: Vec<Section>,
}

/// Parse with the default policies: discard the preamble, pad with `""`, keep long rows.
pub fn parse(raw: &str) -> Vec<Section> {
    parse_with(raw, &ParseOptions::default()).sections
}

pub fn parse_with(raw: &str, opts: &ParseOptions) -> Parsed {
    let mut parsed = Parsed::default();

    let body = match opts.preamble {
        PreamblePolicy::Discard => match from_first_marker(raw) {
            Some(body) => body,
            None => return parsed,
        },
        PreamblePolicy::Capture => raw,
    };

    let mut state = State::SeekingSection;
    for line in content_lines(body) {
        let (next, emit) = state.advance(line, opts);
        state = next;
        match emit {
            Emit::Nothing => {}
            Emit::Section(section) => parsed.sections.push(section),
            Emit::Preamble(line) => parsed.preamble.push(line),
        }
    }
    if let Some(section) = state.finish() {
        parsed.sections.push(section);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    const SAMPLES: &[&str] = &[
        "",
        "@Only",
        "no markers at all\njust text",
        "@User\nname,age\nAlice,30\nBob,",
        "hello\n@X\na,b\n1,2",
        "@A\n\n@B\nh1\nv1",
        "@T\na,b,c\n1\n1,2\n1,2,3,4,5\n,,",
        "  intro  \n\n @ S1 \r\n x , y \r\n 1 \r\n@S1\nz\n@\n,\n",
        "@@\n@,\n,,,\n@ a @ b\nk\nv",
    ];

    #[test]
    fn scenario_user_with_short_row() {
        let sections = parse("@User\nname,age\nAlice,30\nBob,");
        assert_eq!(
            sections,
            vec![Section {
                name: "User".into(),
                headers: strings(&["name", "age"]),
                rows: vec![strings(&["Alice", "30"]), strings(&["Bob", ""])],
            }]
        );
    }

    #[test]
    fn scenario_preamble_discarded() {
        let sections = parse("hello\n@X\na,b\n1,2");
        assert_eq!(
            sections,
            vec![Section {
                name: "X".into(),
                headers: strings(&["a", "b"]),
                rows: vec![strings(&["1", "2"])],
            }]
        );
    }

    #[test]
    fn scenario_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n\t").is_empty());
        assert!(parse("plain text, with commas\nand more").is_empty());
    }

    #[test]
    fn scenario_consecutive_markers() {
        let sections = parse("@A\n\n@B\nh1\nv1");
        assert_eq!(
            sections,
            vec![
                Section::new("A"),
                Section {
                    name: "B".into(),
                    headers: strings(&["h1"]),
                    rows: vec![strings(&["v1"])],
                },
            ]
        );
    }

    #[test]
    fn scenario_marker_only() {
        assert_eq!(parse("@Only"), vec![Section::new("Only")]);
    }

    #[test]
    fn header_only_section_has_no_rows() {
        let sections = parse("@S\na,b");
        assert_eq!(sections[0].headers, strings(&["a", "b"]));
        assert!(sections[0].rows.is_empty());
    }

    #[test]
    fn long_rows_kept_by_default() {
        let sections = parse("@S\na\n1,2,3");
        assert_eq!(sections[0].rows, vec![strings(&["1", "2", "3"])]);
        assert_eq!(sections[0].width(), 3);
    }

    #[test]
    fn long_rows_truncated_on_request() {
        let opts = ParseOptions {
            overflow: OverflowPolicy::Truncate,
            ..ParseOptions::default()
        };
        let parsed = parse_with("@S\na,b\n1,2,3\n4", &opts);
        assert_eq!(
            parsed.sections[0].rows,
            vec![strings(&["1", "2"]), strings(&["4", ""])]
        );
    }

    #[test]
    fn custom_filler_is_used_for_padding() {
        let opts = ParseOptions {
            filler: "-".into(),
            ..ParseOptions::default()
        };
        let parsed = parse_with("@S\na,b,c\n1", &opts);
        assert_eq!(parsed.sections[0].rows, vec![strings(&["1", "-", "-"])]);
    }

    #[test]
    fn marker_mid_line_cuts_preamble_at_character() {
        let sections = parse("note @X\nh\nv");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "X");
    }

    #[test]
    fn capture_keeps_preamble_lines() {
        let opts = ParseOptions {
            preamble: PreamblePolicy::Capture,
            ..ParseOptions::default()
        };
        let parsed = parse_with("  hello \n\nworld,1\n@X\na,b\n1,2", &opts);
        assert_eq!(parsed.preamble, strings(&["hello", "world,1"]));
        assert_eq!(parsed.sections, parse("hello\n@X\na,b\n1,2"));
    }

    #[test]
    fn capture_without_markers_returns_only_preamble() {
        let opts = ParseOptions {
            preamble: PreamblePolicy::Capture,
            ..ParseOptions::default()
        };
        let parsed = parse_with("a\nb", &opts);
        assert_eq!(parsed.preamble, strings(&["a", "b"]));
        assert!(parsed.sections.is_empty());
    }

    #[test]
    fn capture_treats_mid_line_marker_as_preamble() {
        let opts = ParseOptions {
            preamble: PreamblePolicy::Capture,
            ..ParseOptions::default()
        };
        let parsed = parse_with("note @X\nh\nv", &opts);
        assert_eq!(parsed.preamble, strings(&["note @X", "h", "v"]));
        assert!(parsed.sections.is_empty());

        let parsed = parse_with("note @X", &opts);
        assert_eq!(parsed.preamble, strings(&["note @X"]));
        assert!(parsed.sections.is_empty());
    }

    #[test]
    fn discard_never_reports_preamble() {
        for raw in SAMPLES {
            assert!(parse_with(raw, &ParseOptions::default()).preamble.is_empty());
        }
    }

    #[test]
    fn duplicate_names_are_kept_in_order() {
        let names: Vec<String> = parse("@A\n@B\n@A\n@ B ")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, strings(&["A", "B", "A", "B"]));
    }

    #[test]
    fn empty_marker_name_is_allowed() {
        let sections = parse("@\nh\nv");
        assert_eq!(sections[0].name, "");
        assert_eq!(sections[0].headers, strings(&["h"]));
    }

    #[test]
    fn crlf_input_is_handled() {
        assert_eq!(
            parse("@User\r\nname,age\r\nAlice,30\r\n"),
            parse("@User\nname,age\nAlice,30\n")
        );
    }

    #[test]
    fn rows_are_never_shorter_than_headers() {
        for raw in SAMPLES {
            for section in parse(raw) {
                for row in &section.rows {
                    assert!(row.len() >= section.headers.len(), "{raw:?}: {row:?}");
                }
            }
        }
    }

    #[test]
    fn padded_suffix_is_all_filler() {
        let sections = parse("@T\na,b,c,d\nx\nx,y\n,");
        let raw_lens = [1usize, 2, 2];
        for (row, raw_len) in sections[0].rows.iter().zip(raw_lens) {
            assert!(row[raw_len..].iter().all(String::is_empty));
        }
    }

    #[test]
    fn sections_follow_marker_order() {
        let raw = "@3\n@1\nx\n@2\ny\nz\n@1";
        let names: Vec<String> = parse(raw).into_iter().map(|s| s.name).collect();
        let expected: Vec<String> = raw
            .lines()
            .filter_map(|l| l.strip_prefix('@'))
            .map(|n| n.trim().to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn parsing_is_idempotent() {
        for raw in SAMPLES {
            assert_eq!(parse(raw), parse(raw));
        }
    }

    #[test]
    fn blank_lines_do_not_change_result() {
        for raw in SAMPLES {
            let spaced: String = raw
                .split('\n')
                .flat_map(|l| [l, "", "   "])
                .collect::<Vec<_>>()
                .join("\n");
            assert_eq!(parse(raw), parse(&spaced), "{raw:?}");

            let squeezed: String = raw
                .split('\n')
                .filter(|l| !l.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            assert_eq!(parse(raw), parse(&squeezed), "{raw:?}");
        }
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: ParseOptions = serde_json::from_str(r#"{"overflow":"truncate"}"#).unwrap();
        assert_eq!(opts.overflow, OverflowPolicy::Truncate);
        assert_eq!(opts.preamble, PreamblePolicy::Discard);
        assert_eq!(opts.filler, "");
    }
}
