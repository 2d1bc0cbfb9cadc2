use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Passport, Permission};
use crate::seedwork::DomainError;
use super::context::GraphContext;

// ============================================================================
// Resolver Module Contract
// ============================================================================

/// `(type, field)` pair a resolver or permission rule is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub type_name: String,
    pub field_name: String,
}

impl FieldKey {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn query(field_name: impl Into<String>) -> Self {
        Self::new("Query", field_name)
    }

    pub fn mutation(field_name: impl Into<String>) -> Self {
        Self::new("Mutation", field_name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

pub type ResolverFuture = BoxFuture<'static, Result<Value, DomainError>>;
pub type ResolverFn = Arc<dyn Fn(GraphContext, Value) -> ResolverFuture + Send + Sync>;

/// Wrap an async closure as a [`ResolverFn`].
pub fn resolver<F, Fut>(f: F) -> ResolverFn
where
    F: Fn(GraphContext, Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<Value, DomainError>> + Send + 'static,
{
    Arc::new(move |ctx: GraphContext, args: Value| -> ResolverFuture { Box::pin(f(ctx, args)) })
}

/// Gate evaluated before a field's resolver runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionRule {
    Allow,
    Deny,
    Authenticated,
    System,
    /// The passport must hold `permission` in the community whose id is
    /// passed as argument `arg`.
    CommunityPermission {
        arg: &'static str,
        permission: Permission,
    },
}

impl PermissionRule {
    pub fn evaluate(&self, passport: &Passport, args: &Value) -> Result<(), DomainError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(DomainError::permission_denied("field is not accessible")),
            Self::Authenticated => passport.ensure_authenticated("field"),
            Self::System => passport.ensure_system("field"),
            Self::CommunityPermission { arg, permission } => {
                let community_id = args
                    .get(*arg)
                    .and_then(Value::as_str)
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                    .ok_or_else(|| {
                        DomainError::permission_denied(format!(
                            "argument {arg} must carry a community id"
                        ))
                    })?;
                passport.ensure(community_id, *permission, "field")
            }
        }
    }
}

impl FromStr for PermissionRule {
    type Err = String;

    /// Parses the rules that take no arguments; used for the configured
    /// default rule.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            "authenticated" => Ok(Self::Authenticated),
            "system" => Ok(Self::System),
            other => Err(format!("unknown permission rule: {other}")),
        }
    }
}

/// A unit of schema: SDL fragment, resolvers and permission rules.
///
/// Modules are listed explicitly when the schema is composed, so the set of
/// resolvers is fixed at compile time.
pub trait ResolverModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn type_defs(&self) -> &'static str;

    fn resolvers(&self) -> Vec<(FieldKey, ResolverFn)>;

    fn permissions(&self) -> Vec<(FieldKey, PermissionRule)>;
}

/// Failure to merge modules into one schema.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("resolver for {key} registered by both {first} and {second}")]
    DuplicateResolver {
        key: FieldKey,
        first: String,
        second: String,
    },

    #[error("conflicting permission rules for {key} in {first} and {second}")]
    ConflictingPermission {
        key: FieldKey,
        first: String,
        second: String,
    },

    #[error("type {type_name} defined by both {first} and {second}")]
    DuplicateTypeDefinition {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("failed to read type definitions from {path}: {message}")]
    Io { path: String, message: String },
}

impl From<CompositionError> for DomainError {
    fn from(err: CompositionError) -> Self {
        match err {
            CompositionError::Io { .. } => DomainError::Persistence(err.to_string()),
            _ => DomainError::conflict(err.to_string()),
        }
    }
}
