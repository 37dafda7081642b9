use crate::model::{Id, NamedRef, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: Id,
    pub name: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub ground_circumference_ft: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tree {
    pub fn to_named_ref(&self) -> NamedRef {
        NamedRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Attributes for a tree that does not exist yet.
///
/// Every field is optional on the wire so that a missing `name` is reported
/// as a validation failure instead of a body decoding error. The aliases
/// accept the field names older clients send (`tree`, `height`, `size`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTree {
    #[serde(default, alias = "tree")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "height")]
    pub height_ft: Option<f64>,
    #[serde(default, alias = "size")]
    pub ground_circumference_ft: Option<f64>,
}

impl NewTree {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_height(mut self, height_ft: f64) -> Self {
        self.height_ft = Some(height_ft);
        self
    }

    pub fn with_circumference(mut self, ground_circumference_ft: f64) -> Self {
        self.ground_circumference_ft = Some(ground_circumference_ft);
        self
    }

    /// Trimmed name; blank names are rejected by validation before this is read.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default().trim()
    }
}

/// Partial update; only the fields that are present are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeUpdate {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default, alias = "tree")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "height")]
    pub height_ft: Option<f64>,
    #[serde(default, alias = "size")]
    pub ground_circumference_ft: Option<f64>,
}

impl TreeUpdate {
    pub fn apply_to(&self, tree: &mut Tree) {
        if let Some(name) = &self.name {
            tree.name = name.trim().to_string();
        }
        if let Some(location) = &self.location {
            tree.location = Some(location.clone());
        }
        if let Some(height_ft) = self.height_ft {
            tree.height_ft = Some(height_ft);
        }
        if let Some(circumference) = self.ground_circumference_ft {
            tree.ground_circumference_ft = Some(circumference);
        }
    }
}
