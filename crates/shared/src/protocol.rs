use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::parse_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreAction {
    AppendRecord,
    SetUserMapping,
    GetUserMapping,
    GetAllRecords,
}

impl StoreAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppendRecord => "append_record",
            Self::SetUserMapping => "set_user_mapping",
            Self::GetUserMapping => "get_user_mapping",
            Self::GetAllRecords => "get_all_records",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every POST to the record store: `{"action": ..., "data": {...}}`.
#[derive(Debug, Serialize)]
pub struct StoreRequest<'a, D> {
    pub action: StoreAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a D>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreResponse<T> {
    #[serde(default, alias = "success")]
    pub ok: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A finished work order as appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,
    pub submitter_user_id: String,
    pub submitter_username: String,
    pub segment: String,
    pub jenis_order: String,
    pub bobot: f64,
    pub service_number: String,
    pub wo_number: String,
    pub ticket_id: String,
    pub tanggal_open: String,
    pub tanggal_close: String,
    pub teknisi_1: String,
    pub teknisi_2: String,
    pub workzone: String,
    pub keterangan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMapping {
    pub user_id: String,
    pub username: String,
    pub teknisi_name: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMappingQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMappingData {
    #[serde(default)]
    pub teknisi_name: Option<String>,
}

/// A historical row as the store hands it back. Sheets do not keep types
/// stable, so fields are read leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRecord(pub Map<String, Value>);

impl StoredRecord {
    pub fn text(&self, field: &str) -> String {
        match self.0.get(field) {
            Some(Value::String(value)) => value.trim().to_string(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    pub fn weight(&self) -> f64 {
        match self.0.get("bobot") {
            Some(Value::Number(value)) => value.as_f64().filter(|w| w.is_finite()).unwrap_or(0.0),
            Some(Value::String(value)) => parse_weight(value),
            _ => 0.0,
        }
    }
}

impl From<&Record> for StoredRecord {
    fn from(record: &Record) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }
}
