use crate::model::{
    Filter, Id, InsectField, ListQuery, NewInsect, NewTree, OrderBy, TreeField,
};
use crate::store::traits::Store;
use anyhow::{Context, Result};

fn seed_trees() -> Vec<NewTree> {
    vec![
        NewTree::named("General Sherman")
            .with_location("Sequoia National Park")
            .with_height(274.9)
            .with_circumference(102.6),
        NewTree::named("General Grant")
            .with_location("Kings Canyon National Park")
            .with_height(268.1)
            .with_circumference(107.5),
        NewTree::named("President")
            .with_location("Sequoia National Park")
            .with_height(240.9)
            .with_circumference(93.0),
        NewTree::named("Lincoln")
            .with_location("Sequoia National Park")
            .with_height(255.8)
            .with_circumference(98.3),
        NewTree::named("Stagg")
            .with_location("Private Land")
            .with_height(243.0)
            .with_circumference(109.0),
    ]
}

fn seed_insects() -> Vec<NewInsect> {
    vec![
        NewInsect::named("Western Pygmy Blue Butterfly")
            .with_description("Copper brown wings with a blue flush near the body")
            .with_fact("One of the smallest butterflies in North America")
            .with_territory("North America")
            .with_millimeters(12.7),
        NewInsect::named("Patu Digua Spider")
            .with_description("Tiny brown orb-weaving spider")
            .with_fact("Among the smallest spiders ever described")
            .with_territory("Colombia")
            .with_millimeters(0.37),
        NewInsect::named("Fairyfly")
            .with_description("Parasitic wasp with fringed wings")
            .with_fact("Some species are smaller than a single-celled paramecium")
            .with_territory("Worldwide")
            .with_millimeters(0.139),
        NewInsect::named("Hercules Beetle")
            .with_description("Rhinoceros beetle with a long thoracic horn")
            .with_fact("Males can reach 17 cm including the horn")
            .with_territory("Central and South America")
            .with_millimeters(170.0),
    ]
}

/// (insect, tree) pairs recorded by the sample data
const SEED_ASSOCIATIONS: &[(&str, &str)] = &[
    ("Western Pygmy Blue Butterfly", "General Sherman"),
    ("Western Pygmy Blue Butterfly", "General Grant"),
    ("Western Pygmy Blue Butterfly", "Lincoln"),
    ("Western Pygmy Blue Butterfly", "Stagg"),
    ("Patu Digua Spider", "Stagg"),
];

async fn find_tree_id<S: Store>(store: &S, name: &str) -> Result<Option<Id>> {
    let query = ListQuery::new(vec![TreeField::Id], OrderBy::asc(TreeField::Id))
        .with_filter(Filter::equals(TreeField::Name, name));
    Ok(store.list_trees(&query).await?.first().map(|t| t.id))
}

async fn find_insect_id<S: Store>(store: &S, name: &str) -> Result<Option<Id>> {
    let query = ListQuery::new(vec![InsectField::Id], OrderBy::asc(InsectField::Id))
        .with_filter(Filter::equals(InsectField::Name, name));
    Ok(store.list_insects(&query).await?.first().map(|i| i.id))
}

/// Load the sample trees, insects and their associations.
///
/// Rows that already exist (matched by name) are reused, so running the
/// seed twice leaves the data unchanged.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let mut created = 0usize;

    for tree in seed_trees() {
        if find_tree_id(store, tree.name_or_empty()).await?.is_none() {
            store.create_tree(tree).await?;
            created += 1;
        }
    }

    for insect in seed_insects() {
        if find_insect_id(store, insect.name_or_empty()).await?.is_none() {
            store.create_insect(insect).await?;
            created += 1;
        }
    }

    let mut linked = 0usize;
    for (insect_name, tree_name) in SEED_ASSOCIATIONS {
        let tree_id = find_tree_id(store, tree_name)
            .await?
            .with_context(|| format!("Seed tree {} is missing", tree_name))?;
        let insect_id = find_insect_id(store, insect_name)
            .await?
            .with_context(|| format!("Seed insect {} is missing", insect_name))?;

        if store.create_association(tree_id, insect_id).await?.is_some() {
            linked += 1;
        }
    }

    log::info!(
        "Seed data loaded: {} new entities, {} new associations",
        created,
        linked
    );
    Ok(())
}

/// Remove the sample associations, leaving trees and insects in place
pub async fn unload_seed_data<S: Store>(store: &S) -> Result<()> {
    let mut removed = 0usize;
    for (insect_name, tree_name) in SEED_ASSOCIATIONS {
        let (Some(tree_id), Some(insect_id)) = (
            find_tree_id(store, tree_name).await?,
            find_insect_id(store, insect_name).await?,
        ) else {
            continue;
        };
        if store.delete_association(tree_id, insect_id).await? {
            removed += 1;
        }
    }
    log::info!("Removed {} seeded associations", removed);
    Ok(())
}
