use crate::model::{Id, NamedRef, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insect {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub fact: Option<String>,
    pub territory: Option<String>,
    pub millimeters: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Insect {
    pub fn to_named_ref(&self) -> NamedRef {
        NamedRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsect {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default)]
    pub territory: Option<String>,
    #[serde(default)]
    pub millimeters: Option<f64>,
}

impl NewInsect {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.fact = Some(fact.into());
        self
    }

    pub fn with_territory(mut self, territory: impl Into<String>) -> Self {
        self.territory = Some(territory.into());
        self
    }

    pub fn with_millimeters(mut self, millimeters: f64) -> Self {
        self.millimeters = Some(millimeters);
        self
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default().trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsectUpdate {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default)]
    pub territory: Option<String>,
    #[serde(default)]
    pub millimeters: Option<f64>,
}

impl InsectUpdate {
    pub fn apply_to(&self, insect: &mut Insect) {
        if let Some(name) = &self.name {
            insect.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            insect.description = Some(description.clone());
        }
        if let Some(fact) = &self.fact {
            insect.fact = Some(fact.clone());
        }
        if let Some(territory) = &self.territory {
            insect.territory = Some(territory.clone());
        }
        if let Some(millimeters) = self.millimeters {
            insect.millimeters = Some(millimeters);
        }
    }
}
