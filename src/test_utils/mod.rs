#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;

use std::path::PathBuf;

use rusqlite::Connection;

use crate::db::initialize;

pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_status_ok};

/// An in-memory database with the schema in place.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

/// Write `contents` to a seed file in the temp directory and return its path.
///
/// `name` must be unique per test since tests run concurrently.
pub(crate) fn write_seed_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "sale_ledger_{name}_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("Could not write seed file");
    path
}
