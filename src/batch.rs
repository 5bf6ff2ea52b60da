// src/batch.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::glob;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, error, info, instrument};

use crate::cache::ParseCache;
use crate::export::{sanitize_file_stem, write_section_parquet};
use crate::parse::ParseOptions;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
    /// `None` for sections with no columns, which have nothing to write.
    pub output: Option<PathBuf>,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub source: PathBuf,
    pub sections: Vec<SectionSummary>,
    pub error: Option<String>,
}

impl FileSummary {
    pub fn rows(&self) -> usize {
        self.sections.iter().map(|s| s.rows).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub options: ParseOptions,
    pub files: Vec<FileSummary>,
}

impl Manifest {
    pub fn section_count(&self) -> usize {
        self.files.iter().map(|f| f.sections.len()).sum()
    }

    pub fn row_count(&self) -> usize {
        self.files.iter().map(FileSummary::rows).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileSummary> {
        self.files.iter().filter(|f| f.error.is_some())
    }
}

/// One output directory name per input, from the sanitized file name with its extension.
///
/// Names repeating an earlier one (compared case-insensitively) get `_2`, `_3`, …
pub fn output_dir_names(paths: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = path
                .file_name()
                .map(|s| sanitize_file_stem(&s.to_string_lossy()))
                .unwrap_or_else(|| "message".to_string());
            let mut name = base.clone();
            let mut n = 1;
            while !taken.insert(name.to_lowercase()) {
                n += 1;
                name = format!("{}_{}", base, n);
            }
            name
        })
        .collect()
}

/// Parse one message file and write each of its sections into `file_dir`.
#[instrument(level = "debug", skip(path, file_dir, opts, cache), fields(path = %path.display()))]
pub fn process_file(
    path: &Path,
    file_dir: &Path,
    opts: &ParseOptions,
    cache: &ParseCache,
) -> Result<Vec<SectionSummary>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let parsed = cache.get_or_parse(&raw, opts);

    let mut summaries = Vec::with_capacity(parsed.sections.len());
    for (idx, section) in parsed.sections.iter().enumerate() {
        let columns = section.width();
        let mut summary = SectionSummary {
            name: section.name.clone(),
            columns,
            rows: section.rows.len(),
            output: None,
            bytes: 0,
        };
        if columns == 0 {
            debug!(section = %section.name, "no columns; skipping export");
        } else {
            let target = file_dir.join(format!(
                "{:03}_{}.parquet",
                idx,
                sanitize_file_stem(&section.name)
            ));
            summary.bytes = write_section_parquet(section, &target)
                .with_context(|| format!("exporting section {:?} of {:?}", section.name, path))?;
            summary.output = Some(target);
        }
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Expand `pattern`, process every match in parallel, and write `MANIFEST_FILE` to `out_dir`.
///
/// A file that fails is recorded in the manifest and does not stop the others.
#[instrument(level = "info", skip(out_dir, opts), fields(out = %out_dir.as_ref().display()))]
pub fn run<P: AsRef<Path>>(pattern: &str, out_dir: P, opts: &ParseOptions) -> Result<Manifest> {
    let start = Instant::now();
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).with_context(|| format!("creating {:?}", out_dir))?;

    let mut paths: Vec<PathBuf> = glob(pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    info!("{} files match {}", paths.len(), pattern);
    let dir_names = output_dir_names(&paths);

    let cache = ParseCache::shared();
    let files: Vec<FileSummary> = paths
        .par_iter()
        .zip(dir_names.par_iter())
        .map(|(path, dir_name)| {
            match process_file(path, &out_dir.join(dir_name), opts, cache) {
                Ok(sections) => FileSummary {
                    source: path.clone(),
                    sections,
                    error: None,
                },
                Err(e) => {
                    error!("{} failed: {:#}", path.display(), e);
                    FileSummary {
                        source: path.clone(),
                        sections: Vec::new(),
                        error: Some(format!("{:#}", e)),
                    }
                }
            }
        })
        .collect();

    let manifest = Manifest {
        generated_at: Utc::now(),
        options: opts.clone(),
        files,
    };
    write_manifest(&manifest, out_dir)?;

    info!(
        files = manifest.files.len(),
        sections = manifest.section_count(),
        rows = manifest.row_count(),
        elapsed = ?start.elapsed(),
        "batch complete"
    );
    Ok(manifest)
}

/// Pretty JSON, written to a tmp file and renamed over `out_dir/MANIFEST_FILE`.
pub fn write_manifest(manifest: &Manifest, out_dir: &Path) -> Result<()> {
    let path = out_dir.join(MANIFEST_FILE);
    let tmp_path = out_dir.join(format!(".{}.tmp", MANIFEST_FILE));

    let mut tmp =
        fs::File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    serde_json::to_writer_pretty(&mut tmp, manifest).context("serializing manifest")?;
    tmp.write_all(b"\n")?;

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}
