use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Postgres, QueryBuilder, Row,
};

use crate::model::{
    AssociationRecord, EntityField, FieldKind, FieldValue, FilterOp, Id, Insect, InsectField,
    InsectUpdate, ListQuery, NewInsect, NewTree, Tree, TreeField, TreeUpdate,
};
use crate::store::traits::{AssociationStore, InsectStore, TreeStore};

const TREE_COLUMNS: &str =
    "id, name, location, height_ft, ground_circumference_ft, created_at, updated_at";
const INSECT_COLUMNS: &str =
    "id, name, description, fact, territory, millimeters, created_at, updated_at";
const ASSOCIATION_COLUMNS: &str = "id, tree_id, insect_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        log::info!("Database schema is up to date");
        Ok(())
    }
}

fn tree_from_row(row: &PgRow) -> std::result::Result<Tree, sqlx::Error> {
    Ok(Tree {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        height_ft: row.try_get("height_ft")?,
        ground_circumference_ft: row.try_get("ground_circumference_ft")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn insect_from_row(row: &PgRow) -> std::result::Result<Insect, sqlx::Error> {
    Ok(Insect {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        fact: row.try_get("fact")?,
        territory: row.try_get("territory")?,
        millimeters: row.try_get("millimeters")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn association_from_row(row: &PgRow) -> std::result::Result<AssociationRecord, sqlx::Error> {
    Ok(AssociationRecord {
        id: row.try_get("id")?,
        tree_id: row.try_get("tree_id")?,
        insect_id: row.try_get("insect_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Escape `%`, `_` and `\` so user input is matched literally by ILIKE
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_equals<F: EntityField>(builder: &mut QueryBuilder<'_, Postgres>, field: F, value: &FieldValue) {
    let column = field.column();
    match (field.kind(), value) {
        (FieldKind::Int, FieldValue::Int(v)) => match i32::try_from(*v) {
            Ok(v) => {
                builder.push(format!("{} = ", column)).push_bind(v);
            }
            Err(_) => {
                builder.push("FALSE");
            }
        },
        (FieldKind::Number, FieldValue::Int(v)) => {
            builder.push(format!("{} = ", column)).push_bind(*v as f64);
        }
        (FieldKind::Number, FieldValue::Number(v)) => {
            builder.push(format!("{} = ", column)).push_bind(*v);
        }
        (FieldKind::Text, FieldValue::Text(v)) => {
            builder.push(format!("{} = ", column)).push_bind(v.clone());
        }
        (FieldKind::Timestamp, FieldValue::Timestamp(v)) => {
            builder.push(format!("{} = ", column)).push_bind(*v);
        }
        (_, other) => {
            builder
                .push(format!("CAST({} AS TEXT) = ", column))
                .push_bind(other.as_text());
        }
    }
}

/// Appends WHERE and ORDER BY clauses for a typed list query. Only the
/// static column names from the field enums are spliced into the SQL.
fn push_list_clauses<F: EntityField>(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery<F>) {
    if let Some(filter) = &query.filter {
        builder.push(" WHERE ");
        match filter.op {
            FilterOp::Eq => push_equals(builder, filter.field, &filter.value),
            FilterOp::Contains => {
                builder
                    .push(format!("CAST({} AS TEXT) ILIKE ", filter.field.column()))
                    .push_bind(format!("%{}%", escape_like(&filter.value.as_text())));
            }
        }
    }

    let order = &query.order_by;
    let sort_expr = match order.field.kind() {
        FieldKind::Text => format!("LOWER({})", order.field.column()),
        _ => order.field.column().to_string(),
    };
    builder.push(format!(
        " ORDER BY {} {} NULLS LAST, {} ASC",
        sort_expr,
        order.direction.sql(),
        F::primary_key().column()
    ));
}

#[async_trait::async_trait]
impl TreeStore for PostgresStore {
    async fn list_trees(&self, query: &ListQuery<TreeField>) -> Result<Vec<Tree>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM trees", TREE_COLUMNS));
        push_list_clauses(&mut builder, query);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list trees")?;

        rows.iter()
            .map(tree_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to decode tree rows")
    }

    async fn get_tree(&self, id: Id) -> Result<Option<Tree>> {
        let row = sqlx::query(&format!("SELECT {} FROM trees WHERE id = $1", TREE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch tree")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(tree_from_row(&row).context("Failed to decode tree row")?))
    }

    async fn create_tree(&self, new_tree: NewTree) -> Result<Tree> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO trees (name, location, height_ft, ground_circumference_ft)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TREE_COLUMNS
        ))
        .bind(new_tree.name_or_empty())
        .bind(&new_tree.location)
        .bind(new_tree.height_ft)
        .bind(new_tree.ground_circumference_ft)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create tree")?;

        tree_from_row(&row).context("Failed to decode tree row")
    }

    async fn update_tree(&self, id: Id, update: TreeUpdate) -> Result<Option<Tree>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE trees SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                height_ft = COALESCE($4, height_ft),
                ground_circumference_ft = COALESCE($5, ground_circumference_ft),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TREE_COLUMNS
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.location)
        .bind(update.height_ft)
        .bind(update.ground_circumference_ft)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update tree")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(tree_from_row(&row).context("Failed to decode tree row")?))
    }

    async fn delete_tree(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tree")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl InsectStore for PostgresStore {
    async fn list_insects(&self, query: &ListQuery<InsectField>) -> Result<Vec<Insect>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM insects", INSECT_COLUMNS));
        push_list_clauses(&mut builder, query);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list insects")?;

        rows.iter()
            .map(insect_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to decode insect rows")
    }

    async fn get_insect(&self, id: Id) -> Result<Option<Insect>> {
        let row = sqlx::query(&format!("SELECT {} FROM insects WHERE id = $1", INSECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch insect")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(insect_from_row(&row).context("Failed to decode insect row")?))
    }

    async fn create_insect(&self, new_insect: NewInsect) -> Result<Insect> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO insects (name, description, fact, territory, millimeters)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            INSECT_COLUMNS
        ))
        .bind(new_insect.name_or_empty())
        .bind(&new_insect.description)
        .bind(&new_insect.fact)
        .bind(&new_insect.territory)
        .bind(new_insect.millimeters)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create insect")?;

        insect_from_row(&row).context("Failed to decode insect row")
    }

    async fn update_insect(&self, id: Id, update: InsectUpdate) -> Result<Option<Insect>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE insects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                fact = COALESCE($4, fact),
                territory = COALESCE($5, territory),
                millimeters = COALESCE($6, millimeters),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INSECT_COLUMNS
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(&update.fact)
        .bind(&update.territory)
        .bind(update.millimeters)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update insect")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(insect_from_row(&row).context("Failed to decode insect row")?))
    }

    async fn delete_insect(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM insects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete insect")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AssociationStore for PostgresStore {
    async fn association_exists(&self, tree_id: Id, insect_id: Id) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM insect_trees WHERE tree_id = $1 AND insect_id = $2)",
        )
        .bind(tree_id)
        .bind(insect_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check association")?;

        Ok(exists)
    }

    async fn create_association(
        &self,
        tree_id: Id,
        insect_id: Id,
    ) -> Result<Option<AssociationRecord>> {
        // A concurrent insert of the same pair loses on the unique constraint
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO insect_trees (tree_id, insect_id)
            VALUES ($1, $2)
            ON CONFLICT (tree_id, insect_id) DO NOTHING
            RETURNING {}
            "#,
            ASSOCIATION_COLUMNS
        ))
        .bind(tree_id)
        .bind(insect_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to create association")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(
            association_from_row(&row).context("Failed to decode association row")?,
        ))
    }

    async fn delete_association(&self, tree_id: Id, insect_id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM insect_trees WHERE tree_id = $1 AND insect_id = $2")
            .bind(tree_id)
            .bind(insect_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete association")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_insects_for_tree(&self, tree_id: Id) -> Result<Vec<Insect>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.name, i.description, i.fact, i.territory, i.millimeters,
                   i.created_at, i.updated_at
            FROM insects i
            JOIN insect_trees it ON it.insect_id = i.id
            WHERE it.tree_id = $1
            ORDER BY LOWER(i.name) ASC, i.id ASC
            "#,
        )
        .bind(tree_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list insects for tree")?;

        rows.iter()
            .map(insect_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to decode insect rows")
    }

    async fn list_trees_for_insect(&self, insect_id: Id) -> Result<Vec<Tree>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.location, t.height_ft, t.ground_circumference_ft,
                   t.created_at, t.updated_at
            FROM trees t
            JOIN insect_trees it ON it.tree_id = t.id
            WHERE it.insect_id = $1
            ORDER BY LOWER(t.name) ASC, t.id ASC
            "#,
        )
        .bind(insect_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list trees for insect")?;

        rows.iter()
            .map(tree_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to decode tree rows")
    }

    async fn count_associations(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM insect_trees")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count associations")?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Filter, OrderBy};

    #[test]
    fn test_escape_like_quotes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Blue"), "Blue");
    }

    #[test]
    fn test_list_clauses_use_static_columns_and_binds() {
        let query = ListQuery::new(vec![TreeField::Id], OrderBy::desc(TreeField::HeightFt))
            .with_filter(Filter::contains(TreeField::Name, "'; DROP TABLE trees; --"));
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM trees");
        push_list_clauses(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM trees WHERE CAST(name AS TEXT) ILIKE $1 ORDER BY height_ft DESC NULLS LAST, id ASC"
        );
    }

    #[test]
    fn test_text_ordering_is_case_insensitive() {
        let query: ListQuery<InsectField> = ListQuery::new(vec![], OrderBy::asc(InsectField::Name));
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM insects");
        push_list_clauses(&mut builder, &query);

        assert!(builder.sql().ends_with("ORDER BY LOWER(name) ASC NULLS LAST, id ASC"));
    }
}
