//! Generic resolve → authorize → validate → mutate pipeline.
//!
//! Every business operation is wrapped in the same shape: the target is
//! resolved first (not-found wins over permission), the actor is checked
//! against the eligible set, then all field errors are collected before any
//! mutation happens.

use crate::authz::{Action, EligibleSet};
use crate::error::{FieldError, PortalError, ValidationError};
use crate::identity::UserId;

/// Turn an optional lookup into the entity or a not-found error.
pub fn resolve<T>(entity: Option<T>, kind: &'static str, id: u64) -> Result<T, PortalError> {
    entity.ok_or(PortalError::NotFound { entity: kind, id })
}

/// Fail with `PermissionDenied` unless the actor is in the eligible set.
pub fn authorize(eligible: &EligibleSet, actor: UserId, action: Action) -> Result<(), PortalError> {
    if eligible.allows(actor) {
        Ok(())
    } else {
        Err(PortalError::PermissionDenied { actor, action })
    }
}

/// Field-error accumulator. Checks never fail fast; `finish` reports all
/// collected problems together.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, condition: bool, field: &'static str, message: impl Into<String>) {
        if !condition {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    pub fn require_non_empty(&mut self, value: &str, field: &'static str) {
        self.require(!value.trim().is_empty(), field, "must not be empty");
    }

    pub fn finish(self) -> Result<(), PortalError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(ValidationError {
                fields: self.errors,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_reports_not_found() {
        let result: Result<u8, _> = resolve(None, "quote", 7);
        match result {
            Err(PortalError::NotFound { entity, id }) => {
                assert_eq!(entity, "quote");
                assert_eq!(id, 7);
            }
            other => panic!("expected not-found, got {other:?}"),
        }
    }

    #[test]
    fn authorize_rejects_actors_outside_the_set() {
        let eligible = EligibleSet::only(UserId(1));
        assert!(authorize(&eligible, UserId(1), Action::Edit).is_ok());
        match authorize(&eligible, UserId(2), Action::Edit) {
            Err(PortalError::PermissionDenied { actor, action }) => {
                assert_eq!(actor, UserId(2));
                assert_eq!(action, Action::Edit);
            }
            other => panic!("expected permission denial, got {other:?}"),
        }
    }

    #[test]
    fn validator_collects_every_field_error() {
        let mut validator = Validator::new();
        validator.require_non_empty("", "title");
        validator.require(false, "apply_by", "must be in the future");
        match validator.finish() {
            Err(PortalError::Validation(error)) => {
                assert_eq!(error.fields.len(), 2);
                assert_eq!(error.fields[0].field, "title");
                assert_eq!(error.fields[1].field, "apply_by");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
