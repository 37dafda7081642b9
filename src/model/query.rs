use crate::model::{Id, Insect, Timestamp, Tree};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Number,
    Text,
    Timestamp,
}

/// A column of a queryable entity.
///
/// `column` is the storage column name and is the only string that is ever
/// spliced into SQL; `key` is the JSON property name used for projections.
pub trait EntityField: Copy + PartialEq + Debug + Send + Sync + 'static {
    fn column(&self) -> &'static str;
    fn key(&self) -> &'static str;
    fn kind(&self) -> FieldKind;
    fn primary_key() -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeField {
    Id,
    Name,
    Location,
    HeightFt,
    GroundCircumferenceFt,
    CreatedAt,
    UpdatedAt,
}

impl EntityField for TreeField {
    fn column(&self) -> &'static str {
        match self {
            TreeField::Id => "id",
            TreeField::Name => "name",
            TreeField::Location => "location",
            TreeField::HeightFt => "height_ft",
            TreeField::GroundCircumferenceFt => "ground_circumference_ft",
            TreeField::CreatedAt => "created_at",
            TreeField::UpdatedAt => "updated_at",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            TreeField::Id => "id",
            TreeField::Name => "name",
            TreeField::Location => "location",
            TreeField::HeightFt => "heightFt",
            TreeField::GroundCircumferenceFt => "groundCircumferenceFt",
            TreeField::CreatedAt => "createdAt",
            TreeField::UpdatedAt => "updatedAt",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            TreeField::Id => FieldKind::Int,
            TreeField::Name | TreeField::Location => FieldKind::Text,
            TreeField::HeightFt | TreeField::GroundCircumferenceFt => FieldKind::Number,
            TreeField::CreatedAt | TreeField::UpdatedAt => FieldKind::Timestamp,
        }
    }

    fn primary_key() -> Self {
        TreeField::Id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InsectField {
    Id,
    Name,
    Description,
    Fact,
    Territory,
    Millimeters,
    CreatedAt,
    UpdatedAt,
}

impl EntityField for InsectField {
    fn column(&self) -> &'static str {
        match self {
            InsectField::Id => "id",
            InsectField::Name => "name",
            InsectField::Description => "description",
            InsectField::Fact => "fact",
            InsectField::Territory => "territory",
            InsectField::Millimeters => "millimeters",
            InsectField::CreatedAt => "created_at",
            InsectField::UpdatedAt => "updated_at",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            InsectField::CreatedAt => "createdAt",
            InsectField::UpdatedAt => "updatedAt",
            other => other.column(),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            InsectField::Id => FieldKind::Int,
            InsectField::Name
            | InsectField::Description
            | InsectField::Fact
            | InsectField::Territory => FieldKind::Text,
            InsectField::Millimeters => FieldKind::Number,
            InsectField::CreatedAt | InsectField::UpdatedAt => FieldKind::Timestamp,
        }
    }

    fn primary_key() -> Self {
        InsectField::Id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderBy<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> OrderBy<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Case-insensitive substring match
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Number(f64),
    Text(String),
    Timestamp(Timestamp),
}

impl FieldValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Textual rendering used for substring matching
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Number(v) => v.to_string(),
            FieldValue::Text(v) => v.clone(),
            FieldValue::Timestamp(v) => v.to_rfc3339(),
        }
    }

    /// Ordering used by in-process stores. Text compares case-insensitively
    /// only, matching `ORDER BY LOWER(col)`; callers break ties by id.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.as_text().cmp(&b.as_text()),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Id> for FieldValue {
    fn from(value: Id) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    pub field: F,
    pub op: FilterOp,
    pub value: FieldValue,
}

impl<F: EntityField> Filter<F> {
    pub fn equals(field: F, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn contains(field: F, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            op: FilterOp::Contains,
            value: value.into(),
        }
    }

    pub fn matches<E: Queryable<Field = F>>(&self, entity: &E) -> bool {
        let Some(actual) = entity.field_value(self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual.compare(&self.value) == Ordering::Equal,
            FilterOp::Contains => actual
                .as_text()
                .to_lowercase()
                .contains(&self.value.as_text().to_lowercase()),
        }
    }
}

/// Typed replacement for attribute/where/order query objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    /// Projected fields; empty means every field
    pub fields: Vec<F>,
    pub order_by: OrderBy<F>,
    pub filter: Option<Filter<F>>,
}

impl<F: EntityField> ListQuery<F> {
    pub fn new(fields: Vec<F>, order_by: OrderBy<F>) -> Self {
        Self {
            fields,
            order_by,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter<F>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Applies filter and ordering to rows held in memory. Missing values
    /// sort last in both directions and ties break by primary key.
    pub fn apply<E: Queryable<Field = F> + Clone>(&self, rows: impl IntoIterator<Item = E>) -> Vec<E> {
        let mut rows: Vec<E> = rows
            .into_iter()
            .filter(|row| self.filter.as_ref().map_or(true, |f| f.matches(row)))
            .collect();

        let field = self.order_by.field;
        let direction = self.order_by.direction;
        rows.sort_by(|a, b| {
            let primary = match (a.field_value(field), b.field_value(field)) {
                (Some(x), Some(y)) => match direction {
                    SortDirection::Asc => x.compare(&y),
                    SortDirection::Desc => y.compare(&x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            primary.then_with(|| {
                let pk = F::primary_key();
                match (a.field_value(pk), b.field_value(pk)) {
                    (Some(x), Some(y)) => x.compare(&y),
                    _ => Ordering::Equal,
                }
            })
        });
        rows
    }
}

/// Entities whose columns can be read through an [`EntityField`].
pub trait Queryable: Serialize {
    type Field: EntityField;

    fn field_value(&self, field: Self::Field) -> Option<FieldValue>;
}

impl Queryable for Tree {
    type Field = TreeField;

    fn field_value(&self, field: TreeField) -> Option<FieldValue> {
        match field {
            TreeField::Id => Some(self.id.into()),
            TreeField::Name => Some(self.name.as_str().into()),
            TreeField::Location => self.location.as_deref().map(FieldValue::from),
            TreeField::HeightFt => self.height_ft.map(FieldValue::from),
            TreeField::GroundCircumferenceFt => self.ground_circumference_ft.map(FieldValue::from),
            TreeField::CreatedAt => Some(FieldValue::Timestamp(self.created_at)),
            TreeField::UpdatedAt => Some(FieldValue::Timestamp(self.updated_at)),
        }
    }
}

impl Queryable for Insect {
    type Field = InsectField;

    fn field_value(&self, field: InsectField) -> Option<FieldValue> {
        match field {
            InsectField::Id => Some(self.id.into()),
            InsectField::Name => Some(self.name.as_str().into()),
            InsectField::Description => self.description.as_deref().map(FieldValue::from),
            InsectField::Fact => self.fact.as_deref().map(FieldValue::from),
            InsectField::Territory => self.territory.as_deref().map(FieldValue::from),
            InsectField::Millimeters => self.millimeters.map(FieldValue::from),
            InsectField::CreatedAt => Some(FieldValue::Timestamp(self.created_at)),
            InsectField::UpdatedAt => Some(FieldValue::Timestamp(self.updated_at)),
        }
    }
}

/// Keeps only the requested fields of a serialized entity.
pub fn project<E: Queryable>(
    entity: &E,
    fields: &[E::Field],
) -> serde_json::Map<String, serde_json::Value> {
    let serde_json::Value::Object(mut all) = serde_json::to_value(entity).unwrap_or_default()
    else {
        return serde_json::Map::new();
    };
    if fields.is_empty() {
        return all;
    }
    fields
        .iter()
        .filter_map(|field| {
            all.remove(field.key())
                .map(|value| (field.key().to_string(), value))
        })
        .collect()
}
