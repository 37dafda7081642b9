use serde_json::{Map, Value};

use crate::logic::error::{ServiceError, ServiceResult};
use crate::logic::validate::{
    validate_insect_update, validate_new_insect, validate_new_tree, validate_tree_update,
};
use crate::model::{
    project, EntityKind, Filter, Id, Insect, InsectDetail, InsectField, InsectSearchHit,
    InsectUpdate, ListQuery, NewInsect, NewTree, OrderBy, Tree, TreeField, TreeSearchHit,
    TreeUpdate,
};
use crate::store::traits::Store;

/// `GET /trees`: id, name and height, tallest first
pub fn tree_listing_query() -> ListQuery<TreeField> {
    ListQuery::new(
        vec![TreeField::Id, TreeField::Name, TreeField::HeightFt],
        OrderBy::desc(TreeField::HeightFt),
    )
}

/// `GET /insects`: id, name and size, smallest first
pub fn insect_listing_query() -> ListQuery<InsectField> {
    ListQuery::new(
        vec![InsectField::Id, InsectField::Name, InsectField::Millimeters],
        OrderBy::asc(InsectField::Millimeters),
    )
}

fn tallest_first(trees: Vec<Tree>) -> Vec<Tree> {
    ListQuery::new(vec![], OrderBy::desc(TreeField::HeightFt)).apply(trees)
}

pub async fn list_trees<S: Store>(
    store: &S,
    query: &ListQuery<TreeField>,
) -> ServiceResult<Vec<Map<String, Value>>> {
    let trees = store.list_trees(query).await?;
    Ok(trees.iter().map(|t| project(t, &query.fields)).collect())
}

pub async fn get_tree<S: Store>(store: &S, id: Id) -> ServiceResult<Tree> {
    store
        .get_tree(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Tree, id))
}

pub async fn create_tree<S: Store>(store: &S, new_tree: NewTree) -> ServiceResult<Tree> {
    validate_new_tree(&new_tree)?;
    let tree = store.create_tree(new_tree).await?;
    log::info!("Created tree {} ({})", tree.id, tree.name);
    Ok(tree)
}

pub async fn update_tree<S: Store>(store: &S, id: Id, update: TreeUpdate) -> ServiceResult<Tree> {
    if update.id != Some(id) {
        return Err(ServiceError::IdMismatch {
            path_id: id,
            body_id: update.id,
        });
    }
    validate_tree_update(&update)?;
    let tree = store
        .update_tree(id, update)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Tree, id))?;
    log::info!("Updated tree {}", tree.id);
    Ok(tree)
}

pub async fn delete_tree<S: Store>(store: &S, id: Id) -> ServiceResult<()> {
    if !store.delete_tree(id).await? {
        return Err(ServiceError::not_found(EntityKind::Tree, id));
    }
    log::info!("Deleted tree {}", id);
    Ok(())
}

/// Case-insensitive substring search on tree names. Each hit carries the
/// insects recorded near it; trees without insects are still returned.
pub async fn search_trees<S: Store>(store: &S, value: &str) -> ServiceResult<Vec<TreeSearchHit>> {
    let query = tree_listing_query().with_filter(Filter::contains(TreeField::Name, value));
    let trees = store.list_trees(&query).await?;

    let mut hits = Vec::with_capacity(trees.len());
    for tree in &trees {
        let insects = store.list_insects_for_tree(tree.id).await?;
        hits.push(TreeSearchHit {
            fields: project(tree, &query.fields),
            insects: insects.iter().map(Insect::to_named_ref).collect(),
        });
    }
    log::debug!("Tree search for {:?} matched {} rows", value, hits.len());
    Ok(hits)
}

pub async fn list_insects<S: Store>(
    store: &S,
    query: &ListQuery<InsectField>,
) -> ServiceResult<Vec<Map<String, Value>>> {
    let insects = store.list_insects(query).await?;
    Ok(insects.iter().map(|i| project(i, &query.fields)).collect())
}

pub async fn get_insect<S: Store>(store: &S, id: Id) -> ServiceResult<Insect> {
    store
        .get_insect(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Insect, id))
}

/// An insect with the trees it was found near, tallest first
pub async fn get_insect_detail<S: Store>(store: &S, id: Id) -> ServiceResult<InsectDetail> {
    let insect = get_insect(store, id).await?;
    let trees = store.list_trees_for_insect(insect.id).await?;
    Ok(InsectDetail {
        insect,
        trees: tallest_first(trees),
    })
}

pub async fn create_insect<S: Store>(store: &S, new_insect: NewInsect) -> ServiceResult<Insect> {
    validate_new_insect(&new_insect)?;
    let insect = store.create_insect(new_insect).await?;
    log::info!("Created insect {} ({})", insect.id, insect.name);
    Ok(insect)
}

pub async fn update_insect<S: Store>(
    store: &S,
    id: Id,
    update: InsectUpdate,
) -> ServiceResult<Insect> {
    if update.id != Some(id) {
        return Err(ServiceError::IdMismatch {
            path_id: id,
            body_id: update.id,
        });
    }
    validate_insect_update(&update)?;
    let insect = store
        .update_insect(id, update)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Insect, id))?;
    log::info!("Updated insect {}", insect.id);
    Ok(insect)
}

pub async fn delete_insect<S: Store>(store: &S, id: Id) -> ServiceResult<()> {
    if !store.delete_insect(id).await? {
        return Err(ServiceError::not_found(EntityKind::Insect, id));
    }
    log::info!("Deleted insect {}", id);
    Ok(())
}

pub async fn search_insects<S: Store>(
    store: &S,
    value: &str,
) -> ServiceResult<Vec<InsectSearchHit>> {
    let query = insect_listing_query().with_filter(Filter::contains(InsectField::Name, value));
    let insects = store.list_insects(&query).await?;

    let mut hits = Vec::with_capacity(insects.len());
    for insect in &insects {
        let trees = tallest_first(store.list_trees_for_insect(insect.id).await?);
        hits.push(InsectSearchHit {
            fields: project(insect, &query.fields),
            trees: trees.iter().map(Tree::to_named_ref).collect(),
        });
    }
    log::debug!("Insect search for {:?} matched {} rows", value, hits.len());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AssociationStore, MemoryStore};

    async fn store_with_trees(heights: &[(&str, f64)]) -> MemoryStore {
        let store = MemoryStore::new();
        for (name, height) in heights {
            create_tree(&store, NewTree::named(*name).with_height(*height))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_tree_listing_is_tallest_first() {
        let store = store_with_trees(&[("A", 100.0), ("B", 300.0), ("C", 200.0)]).await;

        let listed = list_trees(&store, &tree_listing_query()).await.unwrap();
        let heights: Vec<f64> = listed
            .iter()
            .map(|row| row["heightFt"].as_f64().unwrap())
            .collect();
        assert_eq!(heights, vec![300.0, 200.0, 100.0]);
        assert!(listed.iter().all(|row| !row.contains_key("location")));
    }

    #[tokio::test]
    async fn test_insect_search_is_case_insensitive() {
        let store = MemoryStore::new();
        create_insect(&store, NewInsect::named("Western Pygmy Blue Butterfly"))
            .await
            .unwrap();
        create_insect(&store, NewInsect::named("Patu Digua Spider"))
            .await
            .unwrap();

        let hits = search_insects(&store, "blue").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].fields["name"], "Western Pygmy Blue Butterfly");
        assert!(hits[0].trees.is_empty());
    }

    #[tokio::test]
    async fn test_tree_search_includes_trees_without_insects() {
        let store = store_with_trees(&[("General Sherman", 274.9), ("General Grant", 268.1)]).await;
        let insect = create_insect(&store, NewInsect::named("Western Pygmy Blue Butterfly"))
            .await
            .unwrap();
        store.create_association(1, insect.id).await.unwrap();

        let hits = search_trees(&store, "general").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].fields["name"], "General Sherman");
        assert_eq!(hits[0].insects.len(), 1);
        assert!(hits[1].insects.is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_matching_body_id() {
        let store = store_with_trees(&[("Stagg", 243.0)]).await;
        let update = TreeUpdate {
            id: Some(2),
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let err = update_tree(&store, 1, update).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::IdMismatch {
                path_id: 1,
                body_id: Some(2)
            }
        ));
        assert_eq!(get_tree(&store, 1).await.unwrap().name, "Stagg");
    }

    #[tokio::test]
    async fn test_update_missing_tree_is_not_found() {
        let store = MemoryStore::new();
        let update = TreeUpdate {
            id: Some(9),
            ..Default::default()
        };
        let err = update_tree(&store, 9, update).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_insect_is_not_found() {
        let store = MemoryStore::new();
        let err = delete_insect(&store, 3).await.unwrap_err();
        assert_eq!(err.details(), "Insect not found");
    }

    #[tokio::test]
    async fn test_insect_detail_lists_trees_tallest_first() {
        let store = store_with_trees(&[("Lincoln", 255.8), ("General Sherman", 274.9)]).await;
        let insect = create_insect(&store, NewInsect::named("Western Pygmy Blue Butterfly"))
            .await
            .unwrap();
        store.create_association(1, insect.id).await.unwrap();
        store.create_association(2, insect.id).await.unwrap();

        let detail = get_insect_detail(&store, insect.id).await.unwrap();
        let names: Vec<&str> = detail.trees.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["General Sherman", "Lincoln"]);
    }
}
