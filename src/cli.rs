// src/cli.rs

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use crate::config::Config;
use crate::output::OutputFormat;
use crate::parse::{OverflowPolicy, PreamblePolicy};

pub const USAGE: &str = "\
usage: sectable [FILE|-] [options]

  FILE                 message to parse (default: stdin)
  --format FMT         json | yaml | text
  --capture-preamble   keep lines before the first @section
  --truncate           cut rows longer than the header row
  --filler VALUE       pad short rows with VALUE instead of \"\"
  --placeholder VALUE  shown for empty values in text output
  --section REGEX      only print sections whose name matches
  -h, --help           print this message

Options not given on the command line come from $SECTABLE_CONFIG.";

/// Where the message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read(&self) -> Result<String> {
        match self {
            Input::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading message from stdin")?;
                Ok(buf)
            }
            Input::File(path) => {
                fs::read_to_string(path).with_context(|| format!("reading message {:?}", path))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Args {
    pub input: Input,
    pub format: Option<OutputFormat>,
    pub capture_preamble: bool,
    pub truncate: bool,
    pub filler: Option<String>,
    pub placeholder: Option<String>,
    pub section: Option<Regex>,
    pub help: bool,
}

impl Args {
    /// Parse arguments, not including the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Args {
            input: Input::Stdin,
            format: None,
            capture_preamble: false,
            truncate: false,
            filler: None,
            placeholder: None,
            section: None,
            help: false,
        };
        let mut positional: Option<String> = None;

        let mut it = args.into_iter().map(Into::into);
        while let Some(arg) = it.next() {
            let mut value = |flag: &str| -> Result<String> {
                it.next().ok_or_else(|| anyhow!("{} needs a value", flag))
            };
            match arg.as_str() {
                "-h" | "--help" => out.help = true,
                "--format" => out.format = Some(value("--format")?.parse()?),
                "--capture-preamble" => out.capture_preamble = true,
                "--truncate" => out.truncate = true,
                "--filler" => out.filler = Some(value("--filler")?),
                "--placeholder" => out.placeholder = Some(value("--placeholder")?),
                "--section" => {
                    let pattern = value("--section")?;
                    out.section = Some(
                        Regex::new(&pattern)
                            .with_context(|| format!("invalid --section pattern {:?}", pattern))?,
                    );
                }
                flag if flag.starts_with("--") => bail!("unknown option {}", flag),
                other => {
                    if positional.is_some() {
                        bail!("only one input file may be given");
                    }
                    positional = Some(other.to_string());
                }
            }
        }

        out.input = match positional.as_deref() {
            None | Some("-") => Input::Stdin,
            Some(path) => Input::File(PathBuf::from(path)),
        };
        Ok(out)
    }

    /// Command-line flags win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(placeholder) = &self.placeholder {
            config.output.placeholder = placeholder.clone();
        }
        if self.capture_preamble {
            config.parse.preamble = PreamblePolicy::Capture;
        }
        if self.truncate {
            config.parse.overflow = OverflowPolicy::Truncate;
        }
        if let Some(filler) = &self.filler {
            config.parse.filler = filler.clone();
        }
    }
}
