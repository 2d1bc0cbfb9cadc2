use crate::seedwork::StringConstraints;

// ============================================================================
// Vendor User Value Objects
// ============================================================================

crate::string_value_object! {
    /// Subject id issued by the identity provider (a hyphenated UUID).
    pub struct ExternalId => StringConstraints::new("externalId").trimmed().min_length(36).max_length(36);
}

crate::string_value_object! {
    pub struct FirstName => StringConstraints::new("firstName").trimmed().max_length(50);
}

crate::string_value_object! {
    pub struct LastName => StringConstraints::new("lastName").trimmed().min_length(1).max_length(50);
}
