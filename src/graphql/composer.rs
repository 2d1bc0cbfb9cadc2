use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::metrics::{outcome, Metrics};
use crate::seedwork::DomainError;
use super::context::GraphContext;
use super::schema::{CompositionError, FieldKey, PermissionRule, ResolverFn, ResolverModule};

// ============================================================================
// Schema Composer - merges resolver modules into one schema
// ============================================================================
//
// Sources, in order:
//   1. Root types shared by every module
//   2. Modules passed to `module()`, in the order given
//   3. `*.graphql` files under the optional schema directory, sorted by path
//
// Every collision fails composition. Nothing is overwritten.
//
// ============================================================================

const ROOT_TYPE_DEFS: &str = "\
scalar UUID
scalar DateTime

type Query
type Mutation
";

// Named type definitions share one namespace, whatever their kind.
const TYPE_DEFINITION_PATTERN: &str =
    r"(?m)^\s*(?:type|input|enum|scalar|interface|union)\s+([A-Za-z_][A-Za-z0-9_]*)";

struct TypeDefSource {
    origin: String,
    sdl: String,
}

pub struct SchemaComposer {
    modules: Vec<Box<dyn ResolverModule>>,
    schema_dir: Option<PathBuf>,
    default_rule: PermissionRule,
    metrics: Arc<Metrics>,
}

impl SchemaComposer {
    pub fn new(default_rule: PermissionRule, metrics: Arc<Metrics>) -> Self {
        Self {
            modules: Vec::new(),
            schema_dir: None,
            default_rule,
            metrics,
        }
    }

    pub fn module(mut self, module: impl ResolverModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }

    pub fn compose(self) -> Result<ComposedSchema, CompositionError> {
        let mut sources = vec![TypeDefSource {
            origin: "root".to_string(),
            sdl: ROOT_TYPE_DEFS.to_string(),
        }];
        sources.extend(self.modules.iter().map(|module| TypeDefSource {
            origin: module.name().to_string(),
            sdl: module.type_defs().to_string(),
        }));
        if let Some(dir) = &self.schema_dir {
            sources.extend(discover_type_defs(dir)?);
        }

        check_type_definitions(&sources)?;

        let mut resolvers: HashMap<FieldKey, (&'static str, ResolverFn)> = HashMap::new();
        let mut permissions: HashMap<FieldKey, (&'static str, PermissionRule)> = HashMap::new();

        for module in &self.modules {
            let name = module.name();

            for (key, resolver) in module.resolvers() {
                if let Some((first, _)) = resolvers.get(&key) {
                    return Err(CompositionError::DuplicateResolver {
                        key,
                        first: first.to_string(),
                        second: name.to_string(),
                    });
                }
                resolvers.insert(key, (name, resolver));
            }

            for (key, rule) in module.permissions() {
                match permissions.get(&key) {
                    Some((_, existing)) if *existing == rule => {}
                    Some((first, _)) => {
                        return Err(CompositionError::ConflictingPermission {
                            key,
                            first: first.to_string(),
                            second: name.to_string(),
                        });
                    }
                    None => {
                        permissions.insert(key, (name, rule));
                    }
                }
            }
        }

        let type_defs = sources
            .iter()
            .map(|source| source.sdl.trim())
            .collect::<Vec<_>>()
            .join("\n\n");

        tracing::info!(
            modules = self.modules.len(),
            type_sources = sources.len(),
            resolvers = resolvers.len(),
            permissions = permissions.len(),
            "🧩 Composed GraphQL schema"
        );

        Ok(ComposedSchema {
            type_defs,
            resolvers: resolvers
                .into_iter()
                .map(|(key, (_, resolver))| (key, resolver))
                .collect(),
            permissions: permissions
                .into_iter()
                .map(|(key, (_, rule))| (key, rule))
                .collect(),
            default_rule: self.default_rule,
            metrics: self.metrics,
        })
    }
}

fn discover_type_defs(dir: &Path) -> Result<Vec<TypeDefSource>, CompositionError> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CompositionError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "graphql") {
            continue;
        }

        let sdl = std::fs::read_to_string(path).map_err(|e| CompositionError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Discovered type definitions");

        sources.push(TypeDefSource {
            origin: path
                .strip_prefix(dir)
                .unwrap_or(path)
                .display()
                .to_string(),
            sdl,
        });
    }

    Ok(sources)
}

// `extend` lines do not start with a definition keyword and are skipped.
fn check_type_definitions(sources: &[TypeDefSource]) -> Result<(), CompositionError> {
    let pattern = Regex::new(TYPE_DEFINITION_PATTERN).map_err(|e| CompositionError::Io {
        path: "<type pattern>".to_string(),
        message: e.to_string(),
    })?;

    let mut defined: HashMap<String, &str> = HashMap::new();
    for source in sources {
        for captures in pattern.captures_iter(&source.sdl) {
            let type_name = &captures[1];
            if let Some(first) = defined.get(type_name) {
                return Err(CompositionError::DuplicateTypeDefinition {
                    type_name: type_name.to_string(),
                    first: first.to_string(),
                    second: source.origin.clone(),
                });
            }
            defined.insert(type_name.to_string(), &source.origin);
        }
    }
    Ok(())
}

// ============================================================================
// Composed Schema
// ============================================================================

/// Merged type definitions, resolvers and permission rules. Query parsing
/// and execution happen outside; callers resolve one field at a time.
pub struct ComposedSchema {
    type_defs: String,
    resolvers: HashMap<FieldKey, ResolverFn>,
    permissions: HashMap<FieldKey, PermissionRule>,
    default_rule: PermissionRule,
    metrics: Arc<Metrics>,
}

impl ComposedSchema {
    pub fn type_defs(&self) -> &str {
        &self.type_defs
    }

    pub fn has_resolver(&self, type_name: &str, field_name: &str) -> bool {
        self.resolvers
            .contains_key(&FieldKey::new(type_name, field_name))
    }

    /// The rule gating a field, or the default rule when none is registered.
    pub fn permission_for(&self, type_name: &str, field_name: &str) -> &PermissionRule {
        self.permissions
            .get(&FieldKey::new(type_name, field_name))
            .unwrap_or(&self.default_rule)
    }

    /// Resolvable fields, grouped by type.
    pub fn fields(&self) -> BTreeMap<String, Vec<String>> {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for key in self.resolvers.keys() {
            fields
                .entry(key.type_name.clone())
                .or_default()
                .push(key.field_name.clone());
        }
        for names in fields.values_mut() {
            names.sort();
        }
        fields
    }

    pub async fn resolve_field(
        &self,
        ctx: &GraphContext,
        type_name: &str,
        field_name: &str,
        args: Value,
    ) -> Result<Value, DomainError> {
        let key = FieldKey::new(type_name, field_name);
        let resolver = self
            .resolvers
            .get(&key)
            .ok_or_else(|| DomainError::not_found("Field", &key))?;

        if let Err(e) = self.permission_for(type_name, field_name).evaluate(&ctx.passport, &args) {
            tracing::warn!(field = %key, error = %e, "Field access denied");
            self.metrics
                .record_resolver_call(type_name, field_name, outcome::DENIED);
            return Err(e);
        }

        let result = resolver(ctx.clone(), args).await;
        let result_outcome = if result.is_ok() {
            outcome::SUCCESS
        } else {
            outcome::FAILED
        };
        self.metrics
            .record_resolver_call(type_name, field_name, result_outcome);

        if let Err(e) = &result {
            tracing::debug!(field = %key, code = e.code(), error = %e, "Resolver failed");
        }
        result
    }
}
