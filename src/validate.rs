use std::collections::{BTreeMap, HashSet};

use crate::types::form::{QuestionSetForm, RowField, RowId};

/// Longest accepted value for any question/answer/choice field.
pub const MAX_FIELD_LEN: usize = 1000;

/// Addressable location of one validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Title,
    Row(RowId, RowField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    TooLong,
    DuplicateChoice,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::Required => write!(f, "This field is required"),
            ValidationError::TooLong => {
                write!(f, "Enter at most {} characters", MAX_FIELD_LEN)
            }
            ValidationError::DuplicateChoice => {
                write!(f, "The answer and choices must be distinct")
            }
        }
    }
}

/// Empty map means the form may be submitted.
pub type ErrorMap = BTreeMap<FieldKey, ValidationError>;

/// Check the whole form. Per field, the later rule wins: a too-long value
/// overwrites a required message, and a duplicate among answer/choices
/// overwrites whatever was recorded for those three fields on that row.
pub fn validate(form: &QuestionSetForm) -> ErrorMap {
    let mut errors = ErrorMap::new();

    if form.title.trim().is_empty() {
        errors.insert(FieldKey::Title, ValidationError::Required);
    }

    for row in form.rows() {
        for field in RowField::ALL {
            let value = row.field(field);
            if value.trim().is_empty() {
                errors.insert(FieldKey::Row(row.id, field), ValidationError::Required);
            }
            if value.chars().count() > MAX_FIELD_LEN {
                errors.insert(FieldKey::Row(row.id, field), ValidationError::TooLong);
            }
        }

        let distinct: HashSet<&str> = [
            row.answer.trim(),
            row.choices1.trim(),
            row.choices2.trim(),
        ]
        .into_iter()
        .collect();
        if distinct.len() != 3 {
            for field in [RowField::Answer, RowField::Choices1, RowField::Choices2] {
                errors.insert(FieldKey::Row(row.id, field), ValidationError::DuplicateChoice);
            }
        }
    }

    errors
}
