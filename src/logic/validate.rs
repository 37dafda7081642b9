use crate::logic::error::{FieldViolation, ServiceError, ServiceResult};
use crate::model::{EntityKind, InsectUpdate, NewInsect, NewTree, TreeUpdate};

fn check_name(name: Option<&str>, required: bool, violations: &mut Vec<FieldViolation>) {
    match name {
        Some(name) if name.trim().is_empty() => {
            violations.push(FieldViolation::new("name", "name cannot be empty"));
        }
        None if required => {
            violations.push(FieldViolation::new("name", "name is required"));
        }
        _ => {}
    }
}

fn check_measurement(field: &str, value: Option<f64>, violations: &mut Vec<FieldViolation>) {
    let Some(value) = value else {
        return;
    };
    if !value.is_finite() {
        violations.push(FieldViolation::new(field, format!("{} must be a finite number", field)));
    } else if value < 0.0 {
        violations.push(FieldViolation::new(field, format!("{} cannot be negative", field)));
    }
}

fn finish(entity: EntityKind, violations: Vec<FieldViolation>) -> ServiceResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation { entity, violations })
    }
}

pub fn validate_new_tree(tree: &NewTree) -> ServiceResult<()> {
    let mut violations = Vec::new();
    check_name(tree.name.as_deref(), true, &mut violations);
    check_measurement("heightFt", tree.height_ft, &mut violations);
    check_measurement("groundCircumferenceFt", tree.ground_circumference_ft, &mut violations);
    finish(EntityKind::Tree, violations)
}

pub fn validate_tree_update(update: &TreeUpdate) -> ServiceResult<()> {
    let mut violations = Vec::new();
    check_name(update.name.as_deref(), false, &mut violations);
    check_measurement("heightFt", update.height_ft, &mut violations);
    check_measurement("groundCircumferenceFt", update.ground_circumference_ft, &mut violations);
    finish(EntityKind::Tree, violations)
}

pub fn validate_new_insect(insect: &NewInsect) -> ServiceResult<()> {
    let mut violations = Vec::new();
    check_name(insect.name.as_deref(), true, &mut violations);
    check_measurement("millimeters", insect.millimeters, &mut violations);
    finish(EntityKind::Insect, violations)
}

pub fn validate_insect_update(update: &InsectUpdate) -> ServiceResult<()> {
    let mut violations = Vec::new();
    check_name(update.name.as_deref(), false, &mut violations);
    check_measurement("millimeters", update.millimeters, &mut violations);
    finish(EntityKind::Insect, violations)
}
