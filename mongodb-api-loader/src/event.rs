//! Workflow event boundary and the per-request query building context.
//!
//! The surrounding workflow hands the loader a process event (read access to
//! the originating request) and a dispatcher handle. Both are opaque here:
//! the loader reads the request through [`ProcessEvent`] and never dispatches
//! anything itself.

use crate::request::ServerRequest;
use std::any::Any;
use std::sync::Arc;

/// Originating workflow event carried through a load operation.
///
/// The loader only ever reads the inbound request from it; result storage and
/// any further event state belong to the orchestrator.
pub trait ProcessEvent: Send + Sync {
    /// The inbound request this event was created for.
    fn request(&self) -> &dyn ServerRequest;
}

/// Dispatcher handle the workflow passes to every extension point.
///
/// The loader forwards it untouched; it exists so collaborators hooked into
/// the same phases can emit their own events.
pub trait EventDispatcher: Send + Sync {
    /// Dispatches an event by name.
    fn dispatch(&self, event_name: &str);
}

/// Dispatcher that drops every event. Default collaborator for tests and for
/// workflows without secondary listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl EventDispatcher for NullDispatcher {
    fn dispatch(&self, _event_name: &str) {}
}

/// Builder attachment slot: the value plus the concrete type name it was
/// stored under, kept for mismatch diagnostics.
struct AttachedQuery {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

/// Per-request context threaded through the query building extension points.
///
/// Wraps the originating process event and a mutable slot for the query
/// builder under construction. Created by the loader's context factory,
/// discarded after execution; exactly one builder of the expected concrete
/// type must be attached before execution is attempted.
///
/// The slot is type-erased on purpose: collaborators hooked into the same
/// phase may replace the builder, and the loader validates the concrete type
/// at each entry point instead of trusting the wiring.
pub struct QueryBuildingContext {
    process_event: Arc<dyn ProcessEvent>,
    query: Option<AttachedQuery>,
}

impl QueryBuildingContext {
    /// Creates a context for one load operation.
    pub fn new(process_event: Arc<dyn ProcessEvent>) -> Self {
        Self {
            process_event,
            query: None,
        }
    }

    /// The originating workflow event.
    pub fn process_event(&self) -> &dyn ProcessEvent {
        self.process_event.as_ref()
    }

    /// Attaches a query builder, replacing any previous attachment.
    pub fn set_query<Q: Any + Send>(&mut self, query: Q) {
        self.query = Some(AttachedQuery {
            value: Box::new(query),
            type_name: std::any::type_name::<Q>(),
        });
    }

    /// The attached builder, if it is of type `Q`.
    pub fn query<Q: Any>(&self) -> Option<&Q> {
        self.query.as_ref()?.value.downcast_ref()
    }

    /// Mutable access to the attached builder, if it is of type `Q`.
    pub fn query_mut<Q: Any>(&mut self) -> Option<&mut Q> {
        self.query.as_mut()?.value.downcast_mut()
    }

    /// Whether any builder is attached, regardless of type.
    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    /// Concrete type name of the attachment, for diagnostics.
    pub fn query_type_name(&self) -> Option<&'static str> {
        self.query.as_ref().map(|attached| attached.type_name)
    }
}

impl std::fmt::Debug for QueryBuildingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuildingContext")
            .field("query_type", &self.query_type_name())
            .finish_non_exhaustive()
    }
}
