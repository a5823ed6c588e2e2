use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reference_data::ReferenceData;
use shared::domain::{OrderItem, Technician};
use shared::protocol::{Record, StoreAction, StoredRecord, UserMapping};
use store_client::{RecordStore, StoreError};

use crate::reply::{Keyboard, Reply};

fn order(segment: &str, index: usize, name: &str, weight: f64) -> OrderItem {
    OrderItem {
        id: format!("{segment}:{index}"),
        name: name.to_string(),
        weight,
        segment: segment.to_string(),
    }
}

fn technician(name: &str, unit: &str) -> Technician {
    Technician {
        name: name.to_string(),
        unit: unit.to_string(),
        labor: None,
    }
}

/// Two segments: "Corrective" with a single order and "Provisioning" with
/// twelve ODP orders plus one modem order.
pub(crate) fn reference() -> ReferenceData {
    let mut orders = BTreeMap::new();
    orders.insert(
        "Corrective".to_string(),
        vec![order("Corrective", 0, "Ganti ONT", 5.0)],
    );
    let mut provisioning: Vec<_> = (1..=12)
        .map(|n| order("Provisioning", n - 1, &format!("Pasang ODP {n:02}"), 1.0))
        .collect();
    provisioning.push(order("Provisioning", 12, "Setting Modem", 2.0));
    provisioning.push(order("Provisioning", 13, "Setting Modem Ulang", 2.0));
    orders.insert("Provisioning".to_string(), provisioning);

    let technicians = vec![
        technician("Budi", "Jaksel"),
        technician("Andi", "Jaksel"),
        technician("Siti", "Jaktim"),
    ];
    ReferenceData::from_parts(orders, technicians)
}

pub(crate) const BUDI: usize = 0;
pub(crate) const SITI: usize = 2;

/// In-memory record store; `fail` makes every call fail like a dead network.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub records: Mutex<Vec<Record>>,
    pub history: Mutex<Vec<StoredRecord>>,
    pub mappings: Mutex<Vec<UserMapping>>,
    pub fail: AtomicBool,
}

impl MemoryStore {
    fn check(&self, action: StoreAction) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                action,
                message: "offline".to_string(),
            });
        }
        Ok(())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_record(&self, record: &Record) -> Result<(), StoreError> {
        self.check(StoreAction::AppendRecord)?;
        self.records.lock().expect("lock").push(record.clone());
        self.history
            .lock()
            .expect("lock")
            .push(StoredRecord::from(record));
        Ok(())
    }

    async fn set_user_mapping(&self, mapping: &UserMapping) -> Result<(), StoreError> {
        self.check(StoreAction::SetUserMapping)?;
        let mut mappings = self.mappings.lock().expect("lock");
        mappings.retain(|m| m.user_id != mapping.user_id);
        mappings.push(mapping.clone());
        Ok(())
    }

    async fn get_user_mapping(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.check(StoreAction::GetUserMapping)?;
        Ok(self
            .mappings
            .lock()
            .expect("lock")
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.teknisi_name.clone()))
    }

    async fn get_all_records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.check(StoreAction::GetAllRecords)?;
        Ok(self.history.lock().expect("lock").clone())
    }
}

pub(crate) fn texts(replies: &[Reply]) -> Vec<&str> {
    replies.iter().filter_map(Reply::body).collect()
}

pub(crate) fn last_text(replies: &[Reply]) -> &str {
    texts(replies).last().copied().unwrap_or_default()
}

/// Callback data of every inline button in the replies.
pub(crate) fn button_data(replies: &[Reply]) -> Vec<String> {
    replies
        .iter()
        .flat_map(|reply| match reply {
            Reply::Send {
                keyboard: Keyboard::Inline(rows),
                ..
            }
            | Reply::EditKeyboard(rows) => rows
                .iter()
                .flatten()
                .map(|button| button.data.clone())
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}
