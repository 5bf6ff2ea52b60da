pub mod batch;
pub mod cache;
pub mod cli;
pub mod config;
pub mod export;
pub mod output;
pub mod parse;

pub use cache::ParseCache;
pub use parse::{parse, parse_with, ParseOptions, Parsed, Section};
