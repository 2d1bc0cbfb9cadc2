use crate::seedwork::{StringConstraints, ValidationError};

// ============================================================================
// Community Value Objects
// ============================================================================

/// Host names only: no scheme, no path, no whitespace.
fn check_host(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains("://") {
        return Err(ValidationError::invalid_format(field, "must not include a scheme"));
    }
    if value.contains('/') {
        return Err(ValidationError::invalid_format(field, "must not include a path"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(field, "contains whitespace"));
    }
    if !value.contains('.') || value.starts_with('.') || value.ends_with('.') {
        return Err(ValidationError::invalid_format(field, "must be a dotted host name"));
    }
    Ok(())
}

fn check_domain(value: &str) -> Result<(), ValidationError> {
    check_host("domain", value)
}

fn check_white_label_domain(value: &str) -> Result<(), ValidationError> {
    check_host("whiteLabelDomain", value)
}

crate::string_value_object! {
    pub struct CommunityName => StringConstraints::new("name").trimmed().min_length(1).max_length(200);
}

crate::string_value_object! {
    /// Primary domain the community is served from.
    pub struct Domain => StringConstraints::new("domain").trimmed().min_length(1).max_length(500),
        check = check_domain;
}

crate::string_value_object! {
    /// Vendor-branded domain serving the same community.
    pub struct WhiteLabelDomain => StringConstraints::new("whiteLabelDomain").trimmed().min_length(1).max_length(500),
        check = check_white_label_domain;
}

crate::string_value_object! {
    pub struct Handle => StringConstraints::new("handle").trimmed().min_length(1).max_length(50);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_name_bounds() {
        assert_eq!(CommunityName::new("  Oak Park ").unwrap().as_str(), "Oak Park");
        assert!(CommunityName::new("   ").is_err());
        assert!(CommunityName::new("x".repeat(200)).is_ok());
        assert!(CommunityName::new("x".repeat(201)).is_err());
    }

    #[test]
    fn test_domain_accepts_host_names() {
        let domain = Domain::new(" oakpark.example.com ").unwrap();
        assert_eq!(domain.as_str(), "oakpark.example.com");
    }

    #[test]
    fn test_domain_rejects_urls_and_bare_words() {
        for raw in ["https://oak.example.com", "oak.example.com/path", "localhost", ".example.com", "oak .com"] {
            assert!(
                matches!(Domain::new(raw), Err(ValidationError::InvalidFormat { field: "domain", .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_white_label_domain_names_its_own_field() {
        assert!(matches!(
            WhiteLabelDomain::new("nodots"),
            Err(ValidationError::InvalidFormat { field: "whiteLabelDomain", .. })
        ));
    }

    #[test]
    fn test_handle_max_length() {
        assert!(Handle::new("h".repeat(50)).is_ok());
        assert!(matches!(
            Handle::new("h".repeat(51)),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
    }
}
