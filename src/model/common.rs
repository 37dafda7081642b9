use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key type shared by trees, insects and association rows.
pub type Id = i32;

pub type Timestamp = chrono::DateTime<chrono::Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Tree,
    Insect,
    Association,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Tree => "tree",
            EntityKind::Insect => "insect",
            EntityKind::Association => "association",
        }
    }

    /// Capitalized form used in user-facing details ("Tree not found")
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Tree => "Tree",
            EntityKind::Insect => "Insect",
            EntityKind::Association => "Association",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lightweight `{id, name}` reference used inside joined listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: Id,
    pub name: String,
}
