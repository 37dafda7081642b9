use crate::logic::entities::{create_insect, create_tree};
use crate::logic::error::{FieldViolation, ServiceError, ServiceResult};
use crate::model::{
    AssociateRequest, EntityKind, Insect, InsectDescriptor, Tree, TreeDescriptor, TreeDetail,
};
use crate::store::traits::Store;

async fn resolve_tree<S: Store>(store: &S, descriptor: TreeDescriptor) -> ServiceResult<Tree> {
    match descriptor {
        TreeDescriptor::ById { id } => store
            .get_tree(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Tree, id)),
        TreeDescriptor::ByAttributes(new_tree) => create_tree(store, new_tree).await,
    }
}

async fn resolve_insect<S: Store>(
    store: &S,
    descriptor: InsectDescriptor,
) -> ServiceResult<Insect> {
    match descriptor {
        InsectDescriptor::ById { id } => store
            .get_insect(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Insect, id)),
        InsectDescriptor::ByAttributes(new_insect) => create_insect(store, new_insect).await,
    }
}

/// Record that an insect was found near a tree.
///
/// Both sides are resolved first (looked up by id or created from their
/// attributes), then a single join row is inserted. Entities created during
/// resolution are kept even when the association itself is rejected.
pub async fn associate<S: Store>(
    store: &S,
    tree: TreeDescriptor,
    insect: InsectDescriptor,
) -> ServiceResult<TreeDetail> {
    let tree = resolve_tree(store, tree).await?;
    log::debug!("Resolved tree {} ({})", tree.id, tree.name);
    let insect = resolve_insect(store, insect).await?;
    log::debug!("Resolved insect {} ({})", insect.id, insect.name);

    let duplicate = || ServiceError::DuplicateAssociation {
        tree_name: tree.name.clone(),
        insect_name: insect.name.clone(),
    };

    if store.association_exists(tree.id, insect.id).await? {
        return Err(duplicate());
    }
    // the unique constraint catches pairs inserted since the check above
    let record = store
        .create_association(tree.id, insect.id)
        .await?
        .ok_or_else(duplicate)?;
    log::info!(
        "Associated tree {} with insect {} (record {})",
        record.tree_id,
        record.insect_id,
        record.id
    );

    let insects = store.list_insects_for_tree(tree.id).await?;
    Ok(TreeDetail { tree, insects })
}

/// Request-level entry point: both descriptors must be present.
pub async fn associate_request<S: Store>(
    store: &S,
    request: AssociateRequest,
) -> ServiceResult<TreeDetail> {
    match (request.tree, request.insect) {
        (Some(tree), Some(insect)) => associate(store, tree, insect).await,
        (tree, insect) => {
            let mut violations = Vec::new();
            if tree.is_none() {
                violations.push(FieldViolation::new("tree", "tree is required"));
            }
            if insect.is_none() {
                violations.push(FieldViolation::new("insect", "insect is required"));
            }
            Err(ServiceError::Validation {
                entity: EntityKind::Association,
                violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AssociationRecord, Id, InsectField, InsectUpdate, ListQuery, NewInsect, NewTree, OrderBy,
        TreeField, TreeUpdate,
    };
    use crate::store::{AssociationStore, InsectStore, MemoryStore, TreeStore};

    /// Delegates to `MemoryStore` but never reports an existing pair, so
    /// only the insert-time uniqueness check can catch a duplicate.
    #[derive(Default)]
    struct BlindExistsStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl TreeStore for BlindExistsStore {
        async fn list_trees(&self, query: &ListQuery<TreeField>) -> anyhow::Result<Vec<Tree>> {
            self.inner.list_trees(query).await
        }
        async fn get_tree(&self, id: Id) -> anyhow::Result<Option<Tree>> {
            self.inner.get_tree(id).await
        }
        async fn create_tree(&self, new_tree: NewTree) -> anyhow::Result<Tree> {
            self.inner.create_tree(new_tree).await
        }
        async fn update_tree(&self, id: Id, update: TreeUpdate) -> anyhow::Result<Option<Tree>> {
            self.inner.update_tree(id, update).await
        }
        async fn delete_tree(&self, id: Id) -> anyhow::Result<bool> {
            self.inner.delete_tree(id).await
        }
    }

    #[async_trait::async_trait]
    impl InsectStore for BlindExistsStore {
        async fn list_insects(
            &self,
            query: &ListQuery<InsectField>,
        ) -> anyhow::Result<Vec<Insect>> {
            self.inner.list_insects(query).await
        }
        async fn get_insect(&self, id: Id) -> anyhow::Result<Option<Insect>> {
            self.inner.get_insect(id).await
        }
        async fn create_insect(&self, new_insect: NewInsect) -> anyhow::Result<Insect> {
            self.inner.create_insect(new_insect).await
        }
        async fn update_insect(
            &self,
            id: Id,
            update: InsectUpdate,
        ) -> anyhow::Result<Option<Insect>> {
            self.inner.update_insect(id, update).await
        }
        async fn delete_insect(&self, id: Id) -> anyhow::Result<bool> {
            self.inner.delete_insect(id).await
        }
    }

    #[async_trait::async_trait]
    impl AssociationStore for BlindExistsStore {
        async fn association_exists(&self, _tree_id: Id, _insect_id: Id) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn create_association(
            &self,
            tree_id: Id,
            insect_id: Id,
        ) -> anyhow::Result<Option<AssociationRecord>> {
            self.inner.create_association(tree_id, insect_id).await
        }
        async fn delete_association(&self, tree_id: Id, insect_id: Id) -> anyhow::Result<bool> {
            self.inner.delete_association(tree_id, insect_id).await
        }
        async fn list_insects_for_tree(&self, tree_id: Id) -> anyhow::Result<Vec<Insect>> {
            self.inner.list_insects_for_tree(tree_id).await
        }
        async fn list_trees_for_insect(&self, insect_id: Id) -> anyhow::Result<Vec<Tree>> {
            self.inner.list_trees_for_insect(insect_id).await
        }
        async fn count_associations(&self) -> anyhow::Result<u64> {
            self.inner.count_associations().await
        }
    }

    async fn counts(store: &MemoryStore) -> (usize, usize, u64) {
        let trees = store
            .list_trees(&ListQuery::new(vec![], OrderBy::asc(TreeField::Id)))
            .await
            .unwrap();
        let insects = store
            .list_insects(&ListQuery::new(vec![], OrderBy::asc(InsectField::Id)))
            .await
            .unwrap();
        (trees.len(), insects.len(), store.count_associations().await.unwrap())
    }

    #[tokio::test]
    async fn test_new_tree_and_insect_are_created_and_linked() {
        let store = MemoryStore::new();
        let detail = associate(
            &store,
            TreeDescriptor::ByAttributes(NewTree::named("Stagg").with_height(243.0)),
            InsectDescriptor::ByAttributes(
                NewInsect::named("Patu Digua Spider").with_millimeters(0.37),
            ),
        )
        .await
        .unwrap();

        assert_eq!(detail.tree.name, "Stagg");
        assert_eq!(detail.insects.len(), 1);
        assert_eq!(detail.insects[0].name, "Patu Digua Spider");
        assert_eq!(counts(&store).await, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_by_id_descriptors_never_create_entities() {
        let store = MemoryStore::new();
        let tree = store.create_tree(NewTree::named("Lincoln")).await.unwrap();
        let insect = store
            .create_insect(NewInsect::named("Western Pygmy Blue Butterfly"))
            .await
            .unwrap();

        associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ById { id: insect.id },
        )
        .await
        .unwrap();

        assert_eq!(counts(&store).await, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_second_association_is_a_duplicate() {
        let store = MemoryStore::new();
        let tree = store.create_tree(NewTree::named("Stagg")).await.unwrap();
        let insect = store
            .create_insect(NewInsect::named("Patu Digua Spider"))
            .await
            .unwrap();

        associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ById { id: insect.id },
        )
        .await
        .unwrap();
        let err = associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ById { id: insect.id },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Association already exists between Stagg and Patu Digua Spider"
        );
        assert_eq!(store.count_associations().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attributes_always_create_a_new_insect() {
        let store = MemoryStore::new();
        let tree = store.create_tree(NewTree::named("President")).await.unwrap();
        let insect = store
            .create_insect(NewInsect::named("Fairyfly"))
            .await
            .unwrap();
        store.create_association(tree.id, insect.id).await.unwrap();

        // no find-or-create by name: attributes always insert a fresh row
        associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ByAttributes(NewInsect::named("Fairyfly")),
        )
        .await
        .unwrap();

        assert_eq!(counts(&store).await, (1, 2, 2));
    }

    #[tokio::test]
    async fn test_missing_insect_leaves_created_tree_in_place() {
        let store = MemoryStore::new();
        let err = associate(
            &store,
            TreeDescriptor::ByAttributes(NewTree::named("General Grant")),
            InsectDescriptor::ById { id: 42 },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::NotFound {
                entity: EntityKind::Insect,
                id: 42
            }
        ));
        assert_eq!(counts(&store).await, (1, 0, 0));
    }

    #[tokio::test]
    async fn test_invalid_attributes_are_rejected() {
        let store = MemoryStore::new();
        let err = associate(
            &store,
            TreeDescriptor::ByAttributes(NewTree::default()),
            InsectDescriptor::ByAttributes(NewInsect::named("Fairyfly")),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation {
                entity: EntityKind::Tree,
                ..
            }
        ));
        assert_eq!(counts(&store).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_request_without_descriptors_is_invalid() {
        let store = MemoryStore::new();
        let err = associate_request(&store, AssociateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.details(), "tree is required, insect is required");
    }

    #[tokio::test]
    async fn test_returned_insects_are_sorted_by_name() {
        let store = MemoryStore::new();
        let tree = store.create_tree(NewTree::named("Stagg")).await.unwrap();
        let spider = store
            .create_insect(NewInsect::named("Patu Digua Spider"))
            .await
            .unwrap();
        store.create_association(tree.id, spider.id).await.unwrap();

        let detail = associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ByAttributes(NewInsect::named("Fairyfly")),
        )
        .await
        .unwrap();

        let names: Vec<&str> = detail.insects.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Fairyfly", "Patu Digua Spider"]);
    }

    #[tokio::test]
    async fn test_insert_time_conflict_is_a_duplicate() {
        let store = BlindExistsStore::default();
        let tree = store.create_tree(NewTree::named("Stagg")).await.unwrap();
        let insect = store
            .create_insect(NewInsect::named("Patu Digua Spider"))
            .await
            .unwrap();
        store.create_association(tree.id, insect.id).await.unwrap();

        let err = associate(
            &store,
            TreeDescriptor::ById { id: tree.id },
            InsectDescriptor::ById { id: insect.id },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::DuplicateAssociation { ref tree_name, ref insect_name }
                if tree_name == "Stagg" && insect_name == "Patu Digua Spider"
        ));
        assert_eq!(store.count_associations().await.unwrap(), 1);
    }
}
