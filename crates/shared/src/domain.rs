use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram-side identity of whoever is talking to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserKey(pub u64);

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub segment: String,
}

impl OrderItem {
    pub fn label(&self) -> String {
        format!("{} (bobot {})", self.name, self.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub name: String,
    pub unit: String,
    pub labor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: UserKey,
    pub username: Option<String>,
}

impl Submitter {
    pub fn new(user_id: UserKey, username: Option<String>) -> Self {
        Self { user_id, username }
    }

    pub fn username_or_empty(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

/// Parses a weight cell. Spaces are dropped and a comma is read as the
/// decimal separator; anything unparseable counts as zero.
pub fn parse_weight(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
