use crate::model::{
    AssociationRecord, Id, Insect, InsectField, InsectUpdate, ListQuery, NewInsect, NewTree, Tree,
    TreeField, TreeUpdate,
};
use anyhow::Result;

#[async_trait::async_trait]
pub trait TreeStore: Send + Sync {
    async fn list_trees(&self, query: &ListQuery<TreeField>) -> Result<Vec<Tree>>;
    async fn get_tree(&self, id: Id) -> Result<Option<Tree>>;
    /// Insert a tree; callers validate `new_tree` first
    async fn create_tree(&self, new_tree: NewTree) -> Result<Tree>;
    /// Apply the present fields of `update`; `None` when the tree does not exist
    async fn update_tree(&self, id: Id, update: TreeUpdate) -> Result<Option<Tree>>;
    /// Delete a tree and, through the cascade, its association rows
    async fn delete_tree(&self, id: Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait InsectStore: Send + Sync {
    async fn list_insects(&self, query: &ListQuery<InsectField>) -> Result<Vec<Insect>>;
    async fn get_insect(&self, id: Id) -> Result<Option<Insect>>;
    async fn create_insect(&self, new_insect: NewInsect) -> Result<Insect>;
    async fn update_insect(&self, id: Id, update: InsectUpdate) -> Result<Option<Insect>>;
    async fn delete_insect(&self, id: Id) -> Result<bool>;
}

/// Explicit access to the tree/insect join table
#[async_trait::async_trait]
pub trait AssociationStore: Send + Sync {
    async fn association_exists(&self, tree_id: Id, insect_id: Id) -> Result<bool>;
    /// Insert the join row. Returns `None` when the storage-level uniqueness
    /// constraint on `(tree_id, insect_id)` rejected the pair.
    async fn create_association(&self, tree_id: Id, insect_id: Id)
        -> Result<Option<AssociationRecord>>;
    async fn delete_association(&self, tree_id: Id, insect_id: Id) -> Result<bool>;
    /// Insects associated with a tree, ordered by insect name
    async fn list_insects_for_tree(&self, tree_id: Id) -> Result<Vec<Insect>>;
    /// Trees associated with an insect, ordered by tree name
    async fn list_trees_for_insect(&self, insect_id: Id) -> Result<Vec<Tree>>;
    async fn count_associations(&self) -> Result<u64>;
}

pub trait Store: TreeStore + InsectStore + AssociationStore + Send + Sync {}

impl<T: TreeStore + InsectStore + AssociationStore + Send + Sync> Store for T {}
