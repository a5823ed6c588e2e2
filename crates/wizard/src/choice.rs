use std::fmt;
use std::str::FromStr;

use shared::error::ValidationError;

/// Which slot a technician picker fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechRole {
    Primary,
    Secondary,
    Identity,
}

impl TechRole {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Primary => "t1",
            Self::Secondary => "t2",
            Self::Identity => "me",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "t1" => Some(Self::Primary),
            "t2" => Some(Self::Secondary),
            "me" => Some(Self::Identity),
            _ => None,
        }
    }
}

/// Payload of an inline button press, encoded as `|`-separated callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Segment(String),
    OrderSelect { segment: String, id: String },
    OrderPage { segment: String, page: usize },
    UnitSelect { role: TechRole, unit: String },
    UnitPage { role: TechRole, page: usize },
    TechSelect { role: TechRole, index: usize },
    TechPage { role: TechRole, page: usize },
    Tech2None,
    Tech2Pick,
    Save,
    Discard,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment(segment) => write!(f, "SEG|{segment}"),
            Self::OrderSelect { segment, id } => write!(f, "ORDSEL|{segment}|{id}"),
            Self::OrderPage { segment, page } => write!(f, "ORDPAGE|{segment}|{page}"),
            Self::UnitSelect { role, unit } => write!(f, "UNITSEL|{}|{unit}", role.tag()),
            Self::UnitPage { role, page } => write!(f, "UNITPAGE|{}|{page}", role.tag()),
            Self::TechSelect { role, index } => write!(f, "TECHSEL|{}|{index}", role.tag()),
            Self::TechPage { role, page } => write!(f, "TECHPAGE|{}|{page}", role.tag()),
            Self::Tech2None => f.write_str("T2NONE"),
            Self::Tech2Pick => f.write_str("T2PICK"),
            Self::Save => f.write_str("SAVE"),
            Self::Discard => f.write_str("CANCEL"),
        }
    }
}

impl FromStr for Choice {
    type Err = ValidationError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || ValidationError::UnknownSelection;
        let (kind, rest) = data.split_once('|').unwrap_or((data, ""));
        let choice = match kind {
            "T2NONE" if rest.is_empty() => Self::Tech2None,
            "T2PICK" if rest.is_empty() => Self::Tech2Pick,
            "SAVE" if rest.is_empty() => Self::Save,
            "CANCEL" if rest.is_empty() => Self::Discard,
            "SEG" if !rest.is_empty() => Self::Segment(rest.to_string()),
            "ORDSEL" | "ORDPAGE" => {
                let (segment, tail) = rest.split_once('|').ok_or_else(unknown)?;
                let segment = segment.to_string();
                if kind == "ORDSEL" {
                    Self::OrderSelect {
                        segment,
                        id: tail.to_string(),
                    }
                } else {
                    Self::OrderPage {
                        segment,
                        page: tail.parse().map_err(|_| unknown())?,
                    }
                }
            }
            "UNITSEL" | "UNITPAGE" | "TECHSEL" | "TECHPAGE" => {
                let (tag, tail) = rest.split_once('|').ok_or_else(unknown)?;
                let role = TechRole::from_tag(tag).ok_or_else(unknown)?;
                match kind {
                    "UNITSEL" => Self::UnitSelect {
                        role,
                        unit: tail.to_string(),
                    },
                    "UNITPAGE" => Self::UnitPage {
                        role,
                        page: tail.parse().map_err(|_| unknown())?,
                    },
                    "TECHSEL" => Self::TechSelect {
                        role,
                        index: tail.parse().map_err(|_| unknown())?,
                    },
                    _ => Self::TechPage {
                        role,
                        page: tail.parse().map_err(|_| unknown())?,
                    },
                }
            }
            _ => return Err(unknown()),
        };
        Ok(choice)
    }
}
