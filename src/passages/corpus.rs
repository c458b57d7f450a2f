use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::io;
use std::sync::OnceLock;

use super::Category;
use crate::error::Result;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages/data");

static TABLES: OnceLock<Vec<PassageTable>> = OnceLock::new();

/// A fixed list of reference passages for one category
#[derive(Deserialize, Clone, Debug)]
pub struct PassageTable {
    pub name: String,
    pub size: u32,
    pub passages: Vec<String>,
}

impl PassageTable {
    /// The embedded table for `category`, parsed on first use
    pub fn for_category(category: Category) -> &'static PassageTable {
        let tables = TABLES.get_or_init(|| {
            Category::ALL
                .iter()
                .map(|c| read_table(&format!("{c}.json")).expect("embedded passage table"))
                .collect()
        });
        let idx = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        &tables[idx]
    }
}

fn read_table(file_name: &str) -> Result<PassageTable> {
    let file = PASSAGE_DIR.get_file(file_name).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("passage table {file_name} not embedded"),
        )
    })?;

    let contents = file.contents_utf8().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("passage table {file_name} is not utf-8"),
        )
    })?;

    Ok(serde_json::from_str(contents)?)
}
