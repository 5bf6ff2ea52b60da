// src/output/mod.rs

//! Renderings of parsed sections for the command-line tools.
//!
//! The parser leaves absent values as the filler (normally `""`); swapping in
//! a visible placeholder happens only here, in the text renderer.

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::parse::{Parsed, Section};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(anyhow!("unknown output format {:?} (json, yaml, text)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Shown in text output wherever a header or value is empty.
    pub placeholder: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            placeholder: "-".to_string(),
        }
    }
}

/// Render in the configured format. JSON and YAML carry values verbatim.
pub fn render(parsed: &Parsed, cfg: &OutputConfig) -> Result<String> {
    match cfg.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(parsed)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(parsed)?),
        OutputFormat::Text => Ok(render_text(parsed, &cfg.placeholder)),
    }
}

/// One `@name` heading per section, then one `header: value` block per row.
pub fn render_text(parsed: &Parsed, placeholder: &str) -> String {
    let mut out = String::new();

    for line in &parsed.preamble {
        out.push_str(line);
        out.push('\n');
    }
    if !parsed.preamble.is_empty() {
        out.push('\n');
    }

    if parsed.sections.is_empty() {
        out.push_str("No sections found.\n");
        return out;
    }

    let shown = |s: &str| -> String {
        if s.is_empty() {
            placeholder.to_string()
        } else {
            s.to_string()
        }
    };

    for (i, section) in parsed.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("@{}\n", section.name));

        for row in &section.rows {
            out.push('\n');
            let width = row.len().max(section.headers.len());
            for idx in 0..width {
                let header = section.headers.get(idx).map(String::as_str).unwrap_or("");
                let value = row.get(idx).map(String::as_str).unwrap_or("");
                out.push_str(&format!("  {}: {}\n", shown(header), shown(value)));
            }
        }
    }

    out
}

/// Keep only sections whose name matches `pattern`.
pub fn select_sections(sections: Vec<Section>, pattern: &Regex) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|s| pattern.is_match(&s.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn parsed(raw: &str) -> Parsed {
        Parsed {
            preamble: Vec::new(),
            sections: parse(raw),
        }
    }

    #[test]
    fn text_uses_placeholder_for_empty_values() {
        let text = render_text(&parsed("@User\nname,age\nAlice,30\nBob,"), "-");
        assert_eq!(
            text,
            "@User\n\n  name: Alice\n  age: 30\n\n  name: Bob\n  age: -\n"
        );
    }

    #[test]
    fn text_shows_overflow_under_placeholder_header() {
        let text = render_text(&parsed("@S\na\n1,2"), "?");
        assert_eq!(text, "@S\n\n  a: 1\n  ?: 2\n");
    }

    #[test]
    fn text_for_empty_input() {
        assert_eq!(render_text(&parsed(""), "-"), "No sections found.\n");
    }

    #[test]
    fn text_lists_preamble_first() {
        let p = Parsed {
            preamble: vec!["hello".into()],
            sections: parse("@X"),
        };
        assert_eq!(render_text(&p, "-"), "hello\n\n@X\n");
    }

    #[test]
    fn json_keeps_values_verbatim() -> Result<()> {
        let cfg = OutputConfig {
            format: OutputFormat::Json,
            ..OutputConfig::default()
        };
        let out = render(&parsed("@User\nname,age\nBob,"), &cfg)?;
        let value: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(value["sections"][0]["name"], "User");
        assert_eq!(value["sections"][0]["rows"][0][1], "");
        assert!(value.get("preamble").is_none());
        Ok(())
    }

    #[test]
    fn yaml_round_trips_through_parsed() -> Result<()> {
        let cfg = OutputConfig {
            format: OutputFormat::Yaml,
            ..OutputConfig::default()
        };
        let original = parsed("@A\nx,y\n1\n@B");
        let back: Parsed = serde_yaml::from_str(&render(&original, &cfg)?)?;
        assert_eq!(back, original);
        Ok(())
    }

    #[test]
    fn format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn select_by_name_pattern() {
        let re = Regex::new("^U").unwrap();
        let names: Vec<String> = select_sections(parse("@User\n@Order\n@Unit"), &re)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["User", "Unit"]);
    }
}
