use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::seedwork::{DomainError, DomainEvent, EventEnvelope};
use crate::utils::IsTransient;

// ============================================================================
// Integration Event Handler Registry
// ============================================================================
//
// Populated once through the builder during startup, then frozen behind an
// Arc and shared read-only. Handlers for one event type run in the order
// they were registered. The registry itself never retries; the event bus
// owns failure handling.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("transient handler failure: {0}")]
    Transient(String),

    #[error("permanent handler failure: {0}")]
    Permanent(String),
}

impl IsTransient for HandlerError {
    fn is_transient(&self) -> bool {
        matches!(self, HandlerError::Transient(_))
    }
}

/// Version conflicts and storage hiccups may succeed on a later attempt;
/// validation, permission and missing-entity failures will not.
impl From<DomainError> for HandlerError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Conflict(_) | DomainError::Persistence(_) => {
                HandlerError::Transient(error.to_string())
            }
            other => HandlerError::Permanent(other.to_string()),
        }
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;
pub type HandlerFn<E> = Arc<dyn Fn(EventEnvelope<E>) -> HandlerFuture + Send + Sync>;

pub struct RegisteredHandler<E> {
    name: String,
    handler: HandlerFn<E>,
}

impl<E> Clone for RegisteredHandler<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> RegisteredHandler<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, envelope: EventEnvelope<E>) -> HandlerFuture {
        (self.handler)(envelope)
    }
}

pub struct EventHandlerRegistryBuilder<E> {
    handlers: HashMap<String, Vec<RegisteredHandler<E>>>,
}

impl<E: DomainEvent> Default for EventHandlerRegistryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> EventHandlerRegistryBuilder<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `event_type` under `name`.
    ///
    /// Registering the same `(event_type, name)` again is a no-op.
    pub fn register<F, Fut>(&mut self, event_type: &str, name: &str, handler: F) -> &mut Self
    where
        F: Fn(EventEnvelope<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handlers = self.handlers.entry(event_type.to_string()).or_default();
        if handlers.iter().any(|h| h.name == name) {
            tracing::debug!(event_type, handler = name, "Handler already registered, ignoring");
            return self;
        }

        let handler: HandlerFn<E> =
            Arc::new(move |envelope: EventEnvelope<E>| -> HandlerFuture { Box::pin(handler(envelope)) });
        handlers.push(RegisteredHandler {
            name: name.to_string(),
            handler,
        });
        tracing::debug!(event_type, handler = name, "Registered integration event handler");
        self
    }

    pub fn build(self) -> Arc<EventHandlerRegistry<E>> {
        Arc::new(EventHandlerRegistry {
            handlers: self.handlers,
        })
    }
}

pub struct EventHandlerRegistry<E> {
    handlers: HashMap<String, Vec<RegisteredHandler<E>>>,
}

impl<E: DomainEvent> EventHandlerRegistry<E> {
    pub fn handlers_for(&self, event_type: &str) -> &[RegisteredHandler<E>] {
        self.handlers
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Event types with at least one handler, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}
