use super::error::ValidationError;

// ============================================================================
// Value Objects - Validated Immutable Wrappers
// ============================================================================
//
// A value object is constructed once from raw input and never mutated.
// Construction either yields a value satisfying every constraint or fails
// with a ValidationError naming the violated constraint.
//
// ============================================================================

/// Marker trait for value objects: compared by value, never by identity.
pub trait ValueObject: Clone + PartialEq + std::fmt::Debug {}

/// Length constraints applied to a raw string before it enters the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringConstraints {
    pub field: &'static str,
    pub trim: bool,
    pub min_length: usize,
    pub max_length: usize,
}

impl StringConstraints {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            trim: false,
            min_length: 0,
            max_length: usize::MAX,
        }
    }

    pub const fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub const fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Validate raw input, returning the (possibly trimmed) accepted value.
    ///
    /// Lengths are counted in Unicode scalar values, not bytes.
    pub fn validate(&self, raw: impl Into<String>) -> Result<String, ValidationError> {
        let raw = raw.into();
        let value = if self.trim {
            raw.trim().to_string()
        } else {
            raw
        };

        let length = value.chars().count();

        if self.min_length > 0 && length == 0 {
            return Err(ValidationError::Empty { field: self.field });
        }
        if length < self.min_length {
            return Err(ValidationError::TooShort {
                field: self.field,
                min: self.min_length,
                actual: length,
            });
        }
        if length > self.max_length {
            return Err(ValidationError::TooLong {
                field: self.field,
                max: self.max_length,
                actual: length,
            });
        }

        Ok(value)
    }
}

/// Size constraint applied to a collection of already-validated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionConstraints {
    pub field: &'static str,
    pub max_items: usize,
}

impl CollectionConstraints {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            max_items: usize::MAX,
        }
    }

    pub const fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Validate each raw item with `item`, then check the collection size.
    pub fn validate<T, R, F>(
        &self,
        raw: impl IntoIterator<Item = R>,
        item: F,
    ) -> Result<Vec<T>, ValidationError>
    where
        F: Fn(R) -> Result<T, ValidationError>,
    {
        let items = raw
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                item(value).map_err(|source| ValidationError::InvalidItem {
                    field: self.field,
                    index,
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<T>, _>>()?;

        if items.len() > self.max_items {
            return Err(ValidationError::TooManyItems {
                field: self.field,
                max: self.max_items,
                actual: items.len(),
            });
        }

        Ok(items)
    }
}

/// Declare a string-backed value object validated by [`StringConstraints`].
///
/// An optional `check = path` runs after the length checks; it receives the
/// accepted value and may reject it with `ValidationError::InvalidFormat`.
/// Deserialization goes through the same constructor, so stored documents
/// can never yield an invalid value.
#[macro_export]
macro_rules! string_value_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $constraints:expr $(, check = $check:path)? ;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        $vis struct $name(String);

        impl $name {
            pub const CONSTRAINTS: $crate::seedwork::StringConstraints = $constraints;

            pub fn new(raw: impl Into<String>) -> Result<Self, $crate::seedwork::ValidationError> {
                let value = Self::CONSTRAINTS.validate(raw)?;
                $( $check(&value)?; )?
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::seedwork::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl $crate::seedwork::ValueObject for $name {}
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_spaces(value: &str) -> Result<(), ValidationError> {
        if value.contains(' ') {
            return Err(ValidationError::invalid_format("slug", "contains spaces"));
        }
        Ok(())
    }

    crate::string_value_object! {
        struct Slug => StringConstraints::new("slug").trimmed().min_length(2).max_length(8),
            check = no_spaces;
    }

    #[test]
    fn test_trim_then_length() {
        let constraints = StringConstraints::new("name").trimmed().min_length(1).max_length(5);

        assert_eq!(constraints.validate("  abc  ").unwrap(), "abc");
        assert_eq!(
            constraints.validate("   "),
            Err(ValidationError::Empty { field: "name" })
        );
        assert_eq!(
            constraints.validate("abcdef"),
            Err(ValidationError::TooLong {
                field: "name",
                max: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_untrimmed_keeps_whitespace() {
        let constraints = StringConstraints::new("raw").max_length(4);
        assert_eq!(constraints.validate(" ab ").unwrap(), " ab ");
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let constraints = StringConstraints::new("name").max_length(3);
        assert!(constraints.validate("äöü").is_ok());
    }

    #[test]
    fn test_too_short_after_trim() {
        let constraints = StringConstraints::new("code").trimmed().min_length(3);
        assert_eq!(
            constraints.validate(" ab "),
            Err(ValidationError::TooShort {
                field: "code",
                min: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_collection_rejects_excess_items() {
        let constraints = CollectionConstraints::new("tags").max_items(2);
        let result = constraints.validate(["a", "b", "c"], |s| Ok::<_, ValidationError>(s.to_string()));
        assert_eq!(
            result,
            Err(ValidationError::TooManyItems {
                field: "tags",
                max: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_collection_reports_failing_index() {
        let constraints = CollectionConstraints::new("tags").max_items(5);
        let item = StringConstraints::new("tag").max_length(3);
        let err = constraints
            .validate(["ok", "toolong"], |s| item.validate(s))
            .unwrap_err();

        match err {
            ValidationError::InvalidItem { field, index, .. } => {
                assert_eq!(field, "tags");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_macro_value_object() {
        let slug = Slug::new(" abc ").unwrap();
        assert_eq!(slug.as_str(), "abc");
        assert_eq!(slug.to_string(), "abc");

        assert!(matches!(
            Slug::new("a b"),
            Err(ValidationError::InvalidFormat { field: "slug", .. })
        ));
        assert!(matches!(Slug::new("a"), Err(ValidationError::TooShort { .. })));
    }

    #[test]
    fn test_macro_value_object_deserialization_validates() {
        let ok: Slug = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok.as_str(), "abc");

        let err = serde_json::from_str::<Slug>("\"waytoolongslug\"");
        assert!(err.is_err());
    }
}
