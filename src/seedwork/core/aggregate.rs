use uuid::Uuid;
use super::event::DomainEvent;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. State lives in a props struct - the persisted shape of the aggregate
// 2. Mutations validate input and consult the passport before changing props
// 3. State-changing operations raise domain events (facts, never mutated)
// 4. Repositories are the only sanctioned path to load or save an aggregate
//
// ============================================================================

/// State shared by every aggregate: identity, version, props, the passport it
/// was loaded under and the events raised since it was loaded.
#[derive(Debug, Clone)]
pub struct AggregateCore<P, E, S> {
    id: Uuid,
    version: u64,
    is_new: bool,
    props: P,
    passport: S,
    pending_events: Vec<E>,
}

impl<P, E, S> AggregateCore<P, E, S> {
    /// A transient aggregate that has never been persisted.
    pub fn new(id: Uuid, props: P, passport: S) -> Self {
        Self {
            id,
            version: 0,
            is_new: true,
            props,
            passport,
            pending_events: Vec::new(),
        }
    }

    /// An aggregate reconstructed from storage at `version`.
    pub fn rehydrate(id: Uuid, version: u64, props: P, passport: S) -> Self {
        Self {
            id,
            version,
            is_new: false,
            props,
            passport,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn props(&self) -> &P {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut P {
        &mut self.props
    }

    pub fn passport(&self) -> &S {
        &self.passport
    }

    pub fn add_domain_event(&mut self, event: E) {
        self.pending_events.push(event);
    }

    pub fn pending_events(&self) -> &[E] {
        &self.pending_events
    }

    pub fn take_domain_events(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending_events)
    }
}

/// Generic Aggregate trait - all aggregates implement this
///
/// Type Parameters:
/// - `Props`: The persisted property shape
/// - `Event`: The domain event type raised by the aggregate
/// - `Passport`: The capability token consulted before mutations
pub trait AggregateRoot: Sized + Send + Sync + 'static {
    type Props: Clone + Send + Sync + 'static;
    type Event: DomainEvent;
    type Passport: Clone + Send + Sync + 'static;

    /// Aggregate type name used in errors, envelopes and metrics.
    const NAME: &'static str;

    fn from_core(core: AggregateCore<Self::Props, Self::Event, Self::Passport>) -> Self;

    fn core(&self) -> &AggregateCore<Self::Props, Self::Event, Self::Passport>;

    fn core_mut(&mut self) -> &mut AggregateCore<Self::Props, Self::Event, Self::Passport>;

    /// Keys no two stored aggregates of this type may share. Checked by the
    /// store at commit time.
    fn unique_keys(_props: &Self::Props) -> Vec<String> {
        Vec::new()
    }

    fn id(&self) -> Uuid {
        self.core().id()
    }

    fn version(&self) -> u64 {
        self.core().version()
    }

    fn is_new(&self) -> bool {
        self.core().is_new()
    }

    fn props(&self) -> &Self::Props {
        self.core().props()
    }

    fn take_domain_events(&mut self) -> Vec<Self::Event> {
        self.core_mut().take_domain_events()
    }
}
