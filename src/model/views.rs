use crate::model::{Id, Insect, NamedRef, Tree};
use serde::Serialize;

/// A tree together with every insect recorded near it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeDetail {
    #[serde(flatten)]
    pub tree: Tree,
    pub insects: Vec<Insect>,
}

/// An insect together with the trees it has been found near,
/// tallest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsectDetail {
    #[serde(flatten)]
    pub insect: Insect,
    pub trees: Vec<Tree>,
}

/// Row of the `/trees-insects` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeWithInsects {
    pub id: Id,
    pub name: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub insects: Vec<NamedRef>,
}

/// Row of the `/insects-trees` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsectWithTrees {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub trees: Vec<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSearchHit {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub insects: Vec<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsectSearchHit {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub trees: Vec<NamedRef>,
}
