use std::{collections::HashMap, sync::Arc};

use shared::domain::UserKey;
use tokio::sync::Mutex;
use wizard::Session;

pub type Slot = Arc<Mutex<Option<Session>>>;

/// One conversation slot per user. The map lock is only held to find or
/// create a slot; the slot lock is held for a whole update, so updates from
/// one user run one at a time while other users proceed.
#[derive(Default)]
pub struct SessionRegistry {
    slots: Mutex<HashMap<UserKey, Slot>>,
}

impl SessionRegistry {
    pub async fn slot(&self, user: UserKey) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(user).or_default().clone()
    }

    /// Drops the user's entry once their conversation has ended and no other
    /// update is holding the slot.
    pub async fn release(&self, user: UserKey, slot: Slot) {
        let mut slots = self.slots.lock().await;
        let Some(current) = slots.get(&user) else {
            return;
        };
        // the map and `slot` itself are the only owners
        if !Arc::ptr_eq(current, &slot) || Arc::strong_count(&slot) > 2 {
            return;
        }
        let ended = slot.try_lock().map(|session| session.is_none()).unwrap_or(false);
        if ended {
            slots.remove(&user);
        }
    }

    pub async fn active(&self) -> usize {
        self.slots.lock().await.len()
    }
}
