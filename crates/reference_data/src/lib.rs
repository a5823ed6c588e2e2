use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use shared::domain::{OrderItem, Technician};
use thiserror::Error;
use tracing::info;

mod csv_source;

pub use csv_source::ROSTER_MARKER;

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to read data directory '{}': {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("technician CSV not found in data directory '{}'", .0.display())]
    MissingRoster(PathBuf),
    #[error("failed to parse '{}': {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Lookup tables loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    orders: BTreeMap<String, Vec<OrderItem>>,
    technicians: Vec<Technician>,
    units: Vec<String>,
}

impl ReferenceData {
    /// Loads every segment file and the technician roster from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ReferenceDataError> {
        let dir = dir.as_ref();
        let files = csv_source::list_csv_files(dir)?;

        let mut orders = BTreeMap::new();
        let mut roster = None;
        for path in files {
            if csv_source::is_roster_file(&path) {
                if roster.is_none() {
                    roster = Some(path);
                }
                continue;
            }
            let Some(segment) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let items = csv_source::read_orders(&path, segment)?;
            if !items.is_empty() {
                orders.insert(segment.to_string(), items);
            }
        }

        let roster = roster.ok_or_else(|| ReferenceDataError::MissingRoster(dir.to_path_buf()))?;
        let technicians = csv_source::read_technicians(&roster)?;
        let data = Self::from_parts(orders, technicians);
        info!(
            dir = %dir.display(),
            segments = data.orders.len(),
            technicians = data.technicians.len(),
            units = data.units.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn from_parts(
        orders: BTreeMap<String, Vec<OrderItem>>,
        technicians: Vec<Technician>,
    ) -> Self {
        let units = technicians
            .iter()
            .filter(|t| !t.unit.is_empty())
            .map(|t| t.unit.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            orders,
            technicians,
            units,
        }
    }

    /// Segment names in sorted order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }

    pub fn has_segment(&self, segment: &str) -> bool {
        self.orders.contains_key(segment)
    }

    pub fn orders(&self, segment: &str) -> &[OrderItem] {
        self.orders.get(segment).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn order(&self, segment: &str, id: &str) -> Option<&OrderItem> {
        self.orders(segment).iter().find(|item| item.id == id)
    }

    /// Case-insensitive search over order names of one segment. A query equal
    /// to a full name selects that item alone; otherwise substrings match.
    pub fn search_orders(&self, segment: &str, query: &str) -> Vec<&OrderItem> {
        let needle = query.trim().to_lowercase();
        let orders = self.orders(segment);
        if let Some(exact) = orders
            .iter()
            .find(|item| item.name.trim().to_lowercase() == needle)
        {
            return vec![exact];
        }
        orders
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn technicians(&self) -> &[Technician] {
        &self.technicians
    }

    pub fn technician(&self, index: usize) -> Option<&Technician> {
        self.technicians.get(index)
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u == unit)
    }

    /// Roster indices of the technicians belonging to `unit`, in roster order.
    pub fn technicians_in_unit(&self, unit: &str) -> Vec<usize> {
        self.technicians
            .iter()
            .enumerate()
            .filter(|(_, t)| t.unit == unit)
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
