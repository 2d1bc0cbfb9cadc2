use std::sync::Arc;

use crate::domain::community::Community;
use crate::domain::member::Member;
use crate::domain::vendor_user::VendorUser;
use crate::domain::PlatformEvent;
use crate::events::InProcessEventBus;
use crate::metrics::Metrics;
use crate::persistence::InMemoryUnitOfWork;

/// One unit of work per aggregate type, shared by every application service.
pub struct DataSources {
    pub community: InMemoryUnitOfWork<Community>,
    pub vendor_user: InMemoryUnitOfWork<VendorUser>,
    pub member: InMemoryUnitOfWork<Member>,
}

impl DataSources {
    pub fn in_memory(event_bus: Arc<InProcessEventBus<PlatformEvent>>, metrics: Arc<Metrics>) -> Self {
        Self {
            community: InMemoryUnitOfWork::new(event_bus.clone(), metrics.clone()),
            vendor_user: InMemoryUnitOfWork::new(event_bus.clone(), metrics.clone()),
            member: InMemoryUnitOfWork::new(event_bus, metrics),
        }
    }
}
