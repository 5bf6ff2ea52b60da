// src/export/mod.rs

pub mod arrow;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use regex::Regex;
use std::{fs, fs::File, path::Path};
use tracing::{debug, instrument};

use crate::parse::Section;
pub use self::arrow::{column_names, section_batch, section_schema};

static UNSAFE_STEM_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("static regex"));

/// Turn a section name into something usable as a file stem.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned = UNSAFE_STEM_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "section".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write `section` as a Snappy-compressed Parquet file at `path`.
///
/// Written to `<path>.tmp` first and renamed into place. Returns the file size.
#[instrument(level = "debug", skip(section, path), fields(section = %section.name, path = %path.as_ref().display()))]
pub fn write_section_parquet<P: AsRef<Path>>(section: &Section, path: P) -> Result<u64> {
    let path = path.as_ref();
    let batch = section_batch(section)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    let tmp_path = path.with_extension("parquet.tmp");

    let tmp_file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary Parquet file {:?}", tmp_path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(tmp_file, batch.schema(), Some(props))
        .context("initializing Parquet writer")?;
    writer.write(&batch).context("writing section batch")?;
    writer.close().context("closing Parquet writer")?;

    let file_size = fs::metadata(&tmp_path)
        .context("getting file metadata")?
        .len();
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;

    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        bytes = file_size,
        "section written"
    );
    Ok(file_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    #[test]
    fn stems_are_filesystem_safe() {
        assert_eq!(sanitize_file_stem("User"), "User");
        assert_eq!(sanitize_file_stem(" Order Lines / 2024 "), "Order_Lines_2024");
        assert_eq!(sanitize_file_stem("../etc"), "etc");
        assert_eq!(sanitize_file_stem(""), "section");
        assert_eq!(sanitize_file_stem("@@"), "section");
    }

    #[test]
    fn writes_readable_parquet() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("user.parquet");
        let section = &parse("@User\nname,age\nAlice,30\nBob,")[0];

        let bytes = write_section_parquet(section, &path)?;
        assert!(bytes > 0);
        assert!(path.exists());
        assert!(!path.with_extension("parquet.tmp").exists());

        let reader = SerializedFileReader::new(File::open(&path)?)?;
        let meta = reader.metadata().file_metadata();
        assert_eq!(meta.num_rows(), 2);
        assert_eq!(meta.schema_descr().num_columns(), 2);
        Ok(())
    }

    #[test]
    fn bare_section_is_not_written() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.parquet");
        assert!(write_section_parquet(&parse("@Empty")[0], &path).is_err());
        assert!(!path.exists());
        Ok(())
    }
}
