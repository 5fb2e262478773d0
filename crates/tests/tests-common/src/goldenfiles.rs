//! Goldenfile test cases.
//!
//! A case is a directory `tests/goldenfiles/<name>/` holding:
//! * `query.xml` - the fetch query the rows were returned for.
//! * `rows.json` - the rows of the response.
//! * `expected.json` - the document the rows should map to.
//! * `reference.json` - if present, the changed record restricting root attributes.
//! * `options.json` - if present, the attribute options to map with.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use query_engine_metadata::metadata::{AttributeOptions, Row, RowSet};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct Goldenfile {
    pub directory: PathBuf,
    pub query: String,
    pub rows: RowSet,
    pub reference: Option<Row>,
    pub options: AttributeOptions,
    pub expected: serde_json::Value,
}

/// The directory of the named case, relative to the crate running the tests.
pub fn goldenfile_directory(name: &str) -> PathBuf {
    PathBuf::from("tests/goldenfiles").join(name)
}

/// Load the named case.
pub fn load(name: &str) -> anyhow::Result<Goldenfile> {
    let directory = goldenfile_directory(name);

    let query = fs::read_to_string(directory.join("query.xml"))
        .with_context(|| format!("reading query of goldenfile '{name}'"))?;
    let rows = read_json(&directory.join("rows.json"))?;
    let expected = read_json(&directory.join("expected.json"))?;
    let reference = read_optional_json(&directory.join("reference.json"))?;
    let options = read_optional_json(&directory.join("options.json"))?.unwrap_or_default();

    Ok(Goldenfile {
        directory,
        query,
        rows,
        reference,
        options,
        expected,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if path.exists() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}
