// ============================================================================
// Events - Registry, Bus and Integration Handlers
// ============================================================================

pub mod bus;
pub mod dead_letter;
pub mod handlers;
pub mod registry;

pub use bus::{InProcessEventBus, PublishReport};
pub use dead_letter::{DeadLetter, DeadLetterQueue, DlqStats};
pub use registry::{
    EventHandlerRegistry, EventHandlerRegistryBuilder, HandlerError, HandlerFn, RegisteredHandler,
};
