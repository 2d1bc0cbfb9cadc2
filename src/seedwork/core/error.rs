// ============================================================================
// Domain Error Taxonomy
// ============================================================================

/// A value object or aggregate-creation constraint was violated.
///
/// Every variant names the field it was raised for, so callers can surface
/// the failing input without inspecting the message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is too short: minimum length is {min}, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} is too long: maximum length is {max}, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} has too many items: maximum is {max}, got {actual}")]
    TooManyItems {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} has an invalid format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    #[error("{field}[{index}] is invalid: {source}")]
    InvalidItem {
        field: &'static str,
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Name of the field the violation was raised for.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::TooManyItems { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidItem { field, .. } => *field,
        }
    }

    pub fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by repositories, units of work and application services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Stable machine-readable code, used by resolvers when formatting errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::TooLong {
            field: "bio",
            max: 2000,
            actual: 2001,
        };
        assert_eq!(err.field(), "bio");
        assert_eq!(
            err.to_string(),
            "bio is too long: maximum length is 2000, got 2001"
        );
    }

    #[test]
    fn test_nested_item_error_keeps_collection_field() {
        let err = ValidationError::InvalidItem {
            field: "interests",
            index: 3,
            source: Box::new(ValidationError::TooLong {
                field: "interest",
                max: 40,
                actual: 41,
            }),
        };
        assert_eq!(err.field(), "interests");
        assert!(err.to_string().starts_with("interests[3] is invalid"));
    }

    #[test]
    fn test_domain_error_codes() {
        let validation: DomainError = ValidationError::Empty { field: "name" }.into();
        assert_eq!(validation.code(), "VALIDATION_ERROR");
        assert!(validation.is_validation());

        let missing = DomainError::not_found("Community", "abc");
        assert_eq!(missing.code(), "NOT_FOUND");
        assert_eq!(missing.to_string(), "Community not found: abc");

        assert!(DomainError::conflict("version mismatch").is_conflict());
    }
}
