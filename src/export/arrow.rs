// src/export/arrow.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};

use crate::parse::Section;

/// Column names for a section, one per column of its widest line.
///
/// - blank header → `column_{i}`
/// - repeated header → `name_2`, `name_3`, … skipping any suffix already taken
/// - values past the last header → `column_{i}`
///
/// The result never holds the same name twice.
pub fn column_names(section: &Section) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    (0..section.width())
        .map(|i| {
            let base = match section.headers.get(i) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => format!("column_{}", i),
            };
            let mut name = base.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{}_{}", base, n);
            }
            name
        })
        .collect()
}

/// All-Utf8, nullable schema for `section`.
pub fn section_schema(section: &Section) -> Arc<Schema> {
    let fields: Vec<Field> = column_names(section)
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// One string column per schema field. Fields a row does not reach are null.
pub fn section_batch(section: &Section) -> Result<RecordBatch> {
    let schema = section_schema(section);
    if schema.fields().is_empty() {
        return Err(anyhow!("section {:?} has no columns", section.name));
    }

    let columns: Vec<ArrayRef> = (0..schema.fields().len())
        .map(|i| {
            let values: Vec<Option<&str>> = section
                .rows
                .iter()
                .map(|row| row.get(i).map(String::as_str))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(schema, columns)
        .with_context(|| format!("building record batch for section {:?}", section.name))
}
