//! # Group Extractor
//!
//! Turns the server inventory CSV into the desired set of server groups.
//!
//! ## Input layout
//!
//! The first record is a header and is skipped. Every other record is read
//! positionally:
//!
//! | Column | Meaning |
//! |--------|---------|
//! | 0 | ignored (usually the host name) |
//! | 1 | member identifier, normally an IP address |
//! | 2.. | grouping columns |
//!
//! Each record contributes its identifier to two groups: a coarse group named
//! after column 2 alone, and a fine group named after columns 2.. joined by the
//! separator. When a record has exactly three columns both names coincide and
//! the identifier is appended to that one group twice.
//!
//! Member lists keep input order and duplicates. Identifiers are not
//! validated.
//!
//! ## Quoting
//!
//! Fields follow RFC 4180 quoting as implemented by the `csv` crate: a field
//! that starts with `"` may contain commas, newlines and doubled `""`. A quote
//! appearing inside an unquoted field is not an error; it is kept literally,
//! so `Pr"od` yields a group named `Managed UNIX Devices - Pr"od`. Records
//! with a different number of fields than the header are rejected.

use crate::error::{Result, SyncError};
pub use core_runtime::config::GroupNaming;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Desired membership keyed by group name.
pub type ServerGroups = BTreeMap<String, Vec<String>>;

const IDENTIFIER_COLUMN: usize = 1;
const FIRST_GROUP_COLUMN: usize = 2;

/// Read the inventory file at `path`.
///
/// # Errors
///
/// [`SyncError::Extract`] if the file cannot be opened or is not well-formed
/// CSV (bad quoting, records with differing field counts).
pub fn extract_groups(path: &Path, naming: &GroupNaming) -> Result<ServerGroups> {
    let input = path.display().to_string();
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| SyncError::Extract {
            input: input.clone(),
            source,
        })?;

    let groups = collect_groups(reader, naming, &input)?;
    info!(
        groups = groups.len(),
        file = %path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
        "Extracted server groups"
    );
    Ok(groups)
}

/// Same as [`extract_groups`], reading from any byte source.
pub fn extract_groups_from_reader<R: io::Read>(
    reader: R,
    naming: &GroupNaming,
) -> Result<ServerGroups> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    collect_groups(reader, naming, "<reader>")
}

fn collect_groups<R: io::Read>(
    mut reader: csv::Reader<R>,
    naming: &GroupNaming,
    input: &str,
) -> Result<ServerGroups> {
    let mut groups = ServerGroups::new();

    for record in reader.records() {
        let record = record.map_err(|source| SyncError::Extract {
            input: input.to_string(),
            source,
        })?;

        if record.len() <= FIRST_GROUP_COLUMN {
            warn!(
                line = record.position().map(|p| p.line()).unwrap_or_default(),
                fields = record.len(),
                "Skipping inventory row without grouping columns"
            );
            continue;
        }

        let identifier = &record[IDENTIFIER_COLUMN];
        let columns: Vec<&str> = record.iter().skip(FIRST_GROUP_COLUMN).collect();

        for name in [naming.coarse_name(columns[0]), naming.fine_name(&columns)] {
            groups
                .entry(name)
                .or_default()
                .push(identifier.to_string());
        }
    }

    debug!(groups = groups.len(), "Inventory parsed");
    Ok(groups)
}
