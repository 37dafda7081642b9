use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::model::{
    AssociationRecord, Id, Insect, InsectField, InsectUpdate, ListQuery, NewInsect, NewTree,
    OrderBy, Tree, TreeField, TreeUpdate,
};
use crate::store::traits::{AssociationStore, InsectStore, TreeStore};

#[derive(Debug, Default)]
struct Tables {
    trees: BTreeMap<Id, Tree>,
    insects: BTreeMap<Id, Insect>,
    associations: BTreeMap<Id, AssociationRecord>,
    next_tree_id: Id,
    next_insect_id: Id,
    next_association_id: Id,
}

impl Tables {
    fn next_id(counter: &mut Id) -> Id {
        *counter += 1;
        *counter
    }
}

/// In-process store with the same semantics as the PostgreSQL schema:
/// generated ids, cascading deletes and a unique `(tree_id, insect_id)` pair.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TreeStore for MemoryStore {
    async fn list_trees(&self, query: &ListQuery<TreeField>) -> Result<Vec<Tree>> {
        let tables = self.tables.read();
        Ok(query.apply(tables.trees.values().cloned()))
    }

    async fn get_tree(&self, id: Id) -> Result<Option<Tree>> {
        Ok(self.tables.read().trees.get(&id).cloned())
    }

    async fn create_tree(&self, new_tree: NewTree) -> Result<Tree> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let tree = Tree {
            id: Tables::next_id(&mut tables.next_tree_id),
            name: new_tree.name_or_empty().to_string(),
            location: new_tree.location,
            height_ft: new_tree.height_ft,
            ground_circumference_ft: new_tree.ground_circumference_ft,
            created_at: now,
            updated_at: now,
        };
        tables.trees.insert(tree.id, tree.clone());
        Ok(tree)
    }

    async fn update_tree(&self, id: Id, update: TreeUpdate) -> Result<Option<Tree>> {
        let mut tables = self.tables.write();
        let Some(tree) = tables.trees.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(tree);
        tree.updated_at = Utc::now();
        Ok(Some(tree.clone()))
    }

    async fn delete_tree(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.trees.remove(&id).is_none() {
            return Ok(false);
        }
        tables.associations.retain(|_, record| record.tree_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl InsectStore for MemoryStore {
    async fn list_insects(&self, query: &ListQuery<InsectField>) -> Result<Vec<Insect>> {
        let tables = self.tables.read();
        Ok(query.apply(tables.insects.values().cloned()))
    }

    async fn get_insect(&self, id: Id) -> Result<Option<Insect>> {
        Ok(self.tables.read().insects.get(&id).cloned())
    }

    async fn create_insect(&self, new_insect: NewInsect) -> Result<Insect> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let insect = Insect {
            id: Tables::next_id(&mut tables.next_insect_id),
            name: new_insect.name_or_empty().to_string(),
            description: new_insect.description,
            fact: new_insect.fact,
            territory: new_insect.territory,
            millimeters: new_insect.millimeters,
            created_at: now,
            updated_at: now,
        };
        tables.insects.insert(insect.id, insect.clone());
        Ok(insect)
    }

    async fn update_insect(&self, id: Id, update: InsectUpdate) -> Result<Option<Insect>> {
        let mut tables = self.tables.write();
        let Some(insect) = tables.insects.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(insect);
        insect.updated_at = Utc::now();
        Ok(Some(insect.clone()))
    }

    async fn delete_insect(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.insects.remove(&id).is_none() {
            return Ok(false);
        }
        tables.associations.retain(|_, record| record.insect_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl AssociationStore for MemoryStore {
    async fn association_exists(&self, tree_id: Id, insect_id: Id) -> Result<bool> {
        let tables = self.tables.read();
        Ok(tables
            .associations
            .values()
            .any(|r| r.tree_id == tree_id && r.insect_id == insect_id))
    }

    async fn create_association(
        &self,
        tree_id: Id,
        insect_id: Id,
    ) -> Result<Option<AssociationRecord>> {
        let mut tables = self.tables.write();
        if !tables.trees.contains_key(&tree_id) {
            anyhow::bail!("insert on insect_trees violates foreign key: tree {} does not exist", tree_id);
        }
        if !tables.insects.contains_key(&insect_id) {
            anyhow::bail!("insert on insect_trees violates foreign key: insect {} does not exist", insect_id);
        }
        let duplicate = tables
            .associations
            .values()
            .any(|r| r.tree_id == tree_id && r.insect_id == insect_id);
        if duplicate {
            return Ok(None);
        }

        let now = Utc::now();
        let record = AssociationRecord {
            id: Tables::next_id(&mut tables.next_association_id),
            tree_id,
            insect_id,
            created_at: now,
            updated_at: now,
        };
        tables.associations.insert(record.id, record.clone());
        Ok(Some(record))
    }

    async fn delete_association(&self, tree_id: Id, insect_id: Id) -> Result<bool> {
        let mut tables = self.tables.write();
        let before = tables.associations.len();
        tables
            .associations
            .retain(|_, r| !(r.tree_id == tree_id && r.insect_id == insect_id));
        Ok(tables.associations.len() < before)
    }

    async fn list_insects_for_tree(&self, tree_id: Id) -> Result<Vec<Insect>> {
        let tables = self.tables.read();
        let insects = tables
            .associations
            .values()
            .filter(|r| r.tree_id == tree_id)
            .filter_map(|r| tables.insects.get(&r.insect_id).cloned());
        Ok(ListQuery::new(vec![], OrderBy::asc(InsectField::Name)).apply(insects))
    }

    async fn list_trees_for_insect(&self, insect_id: Id) -> Result<Vec<Tree>> {
        let tables = self.tables.read();
        let trees = tables
            .associations
            .values()
            .filter(|r| r.insect_id == insect_id)
            .filter_map(|r| tables.trees.get(&r.tree_id).cloned());
        Ok(ListQuery::new(vec![], OrderBy::asc(TreeField::Name)).apply(trees))
    }

    async fn count_associations(&self) -> Result<u64> {
        Ok(self.tables.read().associations.len() as u64)
    }
}
