use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use shared::domain::{parse_weight, OrderItem, Technician};
use tracing::debug;

use crate::ReferenceDataError;

/// A CSV whose file name contains this marker holds roster rows, not orders.
pub const ROSTER_MARKER: &str = "teknisi";

pub(crate) fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, ReferenceDataError> {
    let read_dir = |source| ReferenceDataError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir)? {
        let path = entry.map_err(read_dir)?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn is_roster_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_lowercase().contains(ROSTER_MARKER))
}

pub(crate) fn read_orders(path: &Path, segment: &str) -> Result<Vec<OrderItem>, ReferenceDataError> {
    let table = Table::open(path)?;
    let mut items = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        let name = table.field(row, &["jenis order", "JENIS_ORDER"]);
        if name.is_empty() {
            continue;
        }
        items.push(OrderItem {
            id: format!("{segment}:{index}"),
            name: name.to_string(),
            weight: parse_weight(table.field(row, &["bobot"])),
            segment: segment.to_string(),
        });
    }
    debug!(segment, items = items.len(), path = %path.display(), "segment loaded");
    Ok(items)
}

pub(crate) fn read_technicians(path: &Path) -> Result<Vec<Technician>, ReferenceDataError> {
    let table = Table::open(path)?;
    let technicians = table
        .rows
        .iter()
        .filter_map(|row| {
            let name = table.field(row, &["NAMA", "nama"]);
            if name.is_empty() {
                return None;
            }
            let labor = table.field(row, &["LABOR", "labor"]);
            Some(Technician {
                name: name.to_string(),
                unit: table.field(row, &["UNIT", "unit"]).to_string(),
                labor: (!labor.is_empty()).then(|| labor.to_string()),
            })
        })
        .collect();
    Ok(technicians)
}

struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    fn open(path: &Path) -> Result<Self, ReferenceDataError> {
        let csv_error = |source| ReferenceDataError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        let headers = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_error)?;
        Ok(Self { headers, rows })
    }

    /// First non-empty value among the candidate column names.
    fn field<'r>(&self, row: &'r StringRecord, candidates: &[&str]) -> &'r str {
        candidates
            .iter()
            .filter_map(|name| self.headers.iter().position(|h| h == name))
            .filter_map(|index| row.get(index))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}
