// ============================================================================
// GraphQL Layer - Schema/Resolver Composition
// ============================================================================
//
// Builds the merged type definitions, resolver map and permission map handed
// to the GraphQL execution engine. Parsing and executing operations belong to
// that engine; this module stops at resolving a single field.
//
// ============================================================================

pub mod composer;
pub mod context;
pub mod modules;
pub mod schema;

use std::path::PathBuf;
use std::sync::Arc;

pub use composer::{ComposedSchema, SchemaComposer};
pub use context::GraphContext;
pub use modules::{CommunityModule, MemberModule, VendorUserModule};
pub use schema::{resolver, CompositionError, FieldKey, PermissionRule, ResolverFn, ResolverModule};

use crate::metrics::Metrics;

/// Compose the platform schema from every bounded context's module plus any
/// `.graphql` files under `schema_dir`.
pub fn platform_schema(
    default_rule: PermissionRule,
    schema_dir: Option<PathBuf>,
    metrics: Arc<Metrics>,
) -> Result<ComposedSchema, CompositionError> {
    let mut composer = SchemaComposer::new(default_rule, metrics)
        .module(VendorUserModule)
        .module(CommunityModule)
        .module(MemberModule);
    if let Some(dir) = schema_dir {
        composer = composer.schema_dir(dir);
    }
    composer.compose()
}
