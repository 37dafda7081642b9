use crate::logic::error::ServiceResult;
use crate::model::{
    Insect, InsectField, InsectWithTrees, ListQuery, OrderBy, Tree, TreeField, TreeWithInsects,
};
use crate::store::traits::Store;

/// Trees that have at least one insect, tallest first, each with its
/// insects in alphabetical order.
pub async fn trees_with_insects<S: Store>(store: &S) -> ServiceResult<Vec<TreeWithInsects>> {
    let trees = store
        .list_trees(&ListQuery::new(
            vec![TreeField::Id, TreeField::Name, TreeField::Location, TreeField::HeightFt],
            OrderBy::desc(TreeField::HeightFt),
        ))
        .await?;

    let mut rows = Vec::new();
    for tree in trees {
        let insects = store.list_insects_for_tree(tree.id).await?;
        if insects.is_empty() {
            continue;
        }
        rows.push(TreeWithInsects {
            id: tree.id,
            name: tree.name,
            location: tree.location,
            height_ft: tree.height_ft,
            insects: insects.iter().map(Insect::to_named_ref).collect(),
        });
    }
    Ok(rows)
}

/// Every insect in alphabetical order, each with the trees it was found
/// near (also alphabetical). Trees are fetched per insect.
pub async fn insects_with_trees<S: Store>(store: &S) -> ServiceResult<Vec<InsectWithTrees>> {
    let insects = store
        .list_insects(&ListQuery::new(
            vec![InsectField::Id, InsectField::Name, InsectField::Description],
            OrderBy::asc(InsectField::Name),
        ))
        .await?;

    let mut rows = Vec::with_capacity(insects.len());
    for insect in insects {
        let trees = store.list_trees_for_insect(insect.id).await?;
        rows.push(InsectWithTrees {
            id: insect.id,
            name: insect.name,
            description: insect.description,
            trees: trees.iter().map(Tree::to_named_ref).collect(),
        });
    }
    Ok(rows)
}
