use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{
    Record, StoreAction, StoreRequest, StoreResponse, StoredRecord, UserMapping,
    UserMappingData, UserMappingQuery,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record store answered {action} with HTTP {status}")]
    Status {
        action: StoreAction,
        status: StatusCode,
    },
    #[error("record store rejected {action}: {message}")]
    Rejected {
        action: StoreAction,
        message: String,
    },
    #[error("record store response to {action} is not valid JSON: {source}")]
    Decode {
        action: StoreAction,
        source: serde_json::Error,
    },
}

/// The remote record store, one method per action.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_record(&self, record: &Record) -> Result<(), StoreError>;
    async fn set_user_mapping(&self, mapping: &UserMapping) -> Result<(), StoreError>;
    /// Technician name bound to `user_id`, or `None` when unmapped.
    async fn get_user_mapping(&self, user_id: &str) -> Result<Option<String>, StoreError>;
    async fn get_all_records(&self) -> Result<Vec<StoredRecord>, StoreError>;
}

/// Talks to a spreadsheet web app that accepts `{"action", "data"}` POSTs.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: Client,
    endpoint: Url,
}

impl HttpRecordStore {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<D, T>(
        &self,
        action: StoreAction,
        data: Option<&D>,
    ) -> Result<StoreResponse<T>, StoreError>
    where
        D: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(%action, "record store call");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&StoreRequest { action, data })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%action, %status, "record store returned error status");
            return Err(StoreError::Status { action, status });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| StoreError::Decode { action, source })
    }

    async fn write<D>(&self, action: StoreAction, data: &D) -> Result<(), StoreError>
    where
        D: Serialize + Sync,
    {
        let response: StoreResponse<serde_json::Value> = self.call(action, Some(data)).await?;
        if response.ok {
            Ok(())
        } else {
            Err(rejected(action, response.error))
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn append_record(&self, record: &Record) -> Result<(), StoreError> {
        self.write(StoreAction::AppendRecord, record).await
    }

    async fn set_user_mapping(&self, mapping: &UserMapping) -> Result<(), StoreError> {
        self.write(StoreAction::SetUserMapping, mapping).await
    }

    async fn get_user_mapping(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let query = UserMappingQuery {
            user_id: user_id.to_string(),
        };
        let response: StoreResponse<UserMappingData> = self
            .call(StoreAction::GetUserMapping, Some(&query))
            .await?;
        // An unmapped user comes back as ok=false or an empty data object.
        if !response.ok {
            return Ok(None);
        }
        Ok(response
            .data
            .and_then(|data| data.teknisi_name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }

    async fn get_all_records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let response: StoreResponse<Vec<StoredRecord>> = self
            .call::<(), _>(StoreAction::GetAllRecords, None)
            .await?;
        match (response.ok, response.data) {
            (_, Some(records)) => Ok(records),
            (true, None) => Ok(Vec::new()),
            (false, None) => Err(rejected(StoreAction::GetAllRecords, response.error)),
        }
    }
}

fn rejected(action: StoreAction, error: Option<String>) -> StoreError {
    StoreError::Rejected {
        action,
        message: error.unwrap_or_else(|| "no reason given".to_string()),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
