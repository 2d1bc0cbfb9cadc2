use crate::seedwork::{StringConstraints, ValidationError};

// ============================================================================
// Shared Value Objects
// ============================================================================

fn check_email(value: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(ValidationError::invalid_format("email", "missing '@'"));
    };
    if local.is_empty() || domain.is_empty() {
        return Err(ValidationError::invalid_format(
            "email",
            "local part and domain must not be empty",
        ));
    }
    if domain.contains('@') {
        return Err(ValidationError::invalid_format("email", "more than one '@'"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("email", "contains whitespace"));
    }
    Ok(())
}

crate::string_value_object! {
    /// E-mail address shared by vendor users and member profiles.
    pub struct Email => StringConstraints::new("email").trimmed().min_length(1).max_length(254),
        check = check_email;
}
