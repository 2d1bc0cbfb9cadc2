use serde::{Deserialize, Serialize};

use crate::seedwork::{CollectionConstraints, StringConstraints, ValidationError, ValueObject};

// ============================================================================
// Member Value Objects
// ============================================================================

crate::string_value_object! {
    /// Display name of the membership inside its community.
    pub struct MemberName => StringConstraints::new("memberName").trimmed().min_length(1).max_length(200);
}

crate::string_value_object! {
    /// Profile name.
    pub struct Name => StringConstraints::new("name").trimmed().min_length(1).max_length(500);
}

crate::string_value_object! {
    pub struct Bio => StringConstraints::new("bio").trimmed().max_length(2000);
}

crate::string_value_object! {
    pub struct Interest => StringConstraints::new("interest").trimmed().max_length(40);
}

/// Up to 20 profile interests, each validated as an [`Interest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Interests(Vec<Interest>);

impl Interests {
    pub const CONSTRAINTS: CollectionConstraints =
        CollectionConstraints::new("interests").max_items(20);

    pub fn new<I, S>(raw: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CONSTRAINTS
            .validate(raw, |item| Interest::new(item))
            .map(Self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interest> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|i| i.as_str().to_string()).collect()
    }
}

impl TryFrom<Vec<String>> for Interests {
    type Error = ValidationError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Interests> for Vec<String> {
    fn from(value: Interests) -> Self {
        value.0.into_iter().map(Interest::into_inner).collect()
    }
}

impl ValueObject for Interests {}

/// Role of a member inside its community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Member,
}
