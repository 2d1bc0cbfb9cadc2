// ============================================================================
// Integration Event Handlers
// ============================================================================
//
// Each handler module exposes a `register` function called once from the
// platform bootstrap while the registry is still being built.
//
// ============================================================================

pub mod community_created;

use std::sync::Arc;

use crate::application::DataSources;
use crate::domain::PlatformEvent;
use super::registry::EventHandlerRegistryBuilder;

pub fn register_all(
    builder: &mut EventHandlerRegistryBuilder<PlatformEvent>,
    data_sources: &Arc<DataSources>,
) {
    community_created::register(builder, Arc::downgrade(data_sources));
}
