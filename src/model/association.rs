use crate::model::{Id, NewInsect, NewTree, Timestamp};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Join row linking one tree to one insect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRecord {
    pub id: Id,
    pub tree_id: Id,
    pub insect_id: Id,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// How the association workflow should find its tree.
///
/// An object carrying a non-null `id` refers to an existing row and the id
/// must be an integer; anything else is treated as the attributes of a tree
/// to create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeDescriptor {
    ById { id: Id },
    ByAttributes(NewTree),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsectDescriptor {
    ById { id: Id },
    ByAttributes(NewInsect),
}

/// `Ok(None)` when the object has no `id` or a null one
fn reference_id(value: &Value) -> Result<Option<Id>, String> {
    let Some(raw) = value.get("id").filter(|raw| !raw.is_null()) else {
        return Ok(None);
    };
    raw.as_i64()
        .and_then(|id| Id::try_from(id).ok())
        .map(Some)
        .ok_or_else(|| format!("id must be an integer within range, got {}", raw))
}

impl<'de> Deserialize<'de> for TreeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match reference_id(&value).map_err(de::Error::custom)? {
            Some(id) => Ok(TreeDescriptor::ById { id }),
            None => NewTree::deserialize(value)
                .map(TreeDescriptor::ByAttributes)
                .map_err(de::Error::custom),
        }
    }
}

impl<'de> Deserialize<'de> for InsectDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match reference_id(&value).map_err(de::Error::custom)? {
            Some(id) => Ok(InsectDescriptor::ById { id }),
            None => NewInsect::deserialize(value)
                .map(InsectDescriptor::ByAttributes)
                .map_err(de::Error::custom),
        }
    }
}

/// Body of `POST /associate-tree-insect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociateRequest {
    #[serde(default)]
    pub tree: Option<TreeDescriptor>,
    #[serde(default)]
    pub insect: Option<InsectDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Result<TreeDescriptor, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_id_wins_over_attributes() {
        assert_eq!(
            tree(json!({"id": 4, "name": "Stagg"})).unwrap(),
            TreeDescriptor::ById { id: 4 }
        );
    }

    #[test]
    fn test_null_or_missing_id_means_attributes() {
        let expected = TreeDescriptor::ByAttributes(NewTree::named("Stagg"));
        assert_eq!(tree(json!({"id": null, "name": "Stagg"})).unwrap(), expected);
        assert_eq!(tree(json!({"name": "Stagg"})).unwrap(), expected);
    }

    #[test]
    fn test_non_integer_id_is_rejected() {
        assert!(tree(json!({"id": "7", "name": "Ghost"})).is_err());
        assert!(tree(json!({"id": 3000000000i64, "name": "Ghost"})).is_err());
        let insect: Result<InsectDescriptor, _> = serde_json::from_value(json!({"id": 1.5}));
        assert!(insect.is_err());
    }

    #[test]
    fn test_duplicate_name_fields_are_reported() {
        let err = tree(json!({"name": "Stagg", "tree": "Stagg"})).unwrap_err();
        assert!(err.to_string().contains("duplicate field `name`"));
    }
}
