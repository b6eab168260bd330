//! Event-driven API loader adapter for MongoDB document collections.
//!
//! This crate bridges a generic API workflow — one that turns inbound
//! HTTP-like requests into fetch/list operations — to a MongoDB document
//! store. Given a workflow event carrying a request, the loader builds a
//! query against one configured collection, optionally narrows it to a
//! single document by an identifier read from a configurable request
//! parameter, executes it, and hands the result back to the workflow.
//!
//! # Architecture
//! - [`request`]: the inbound request boundary — six parameter containers
//!   and the resolver that reads one configured key from one of them
//! - [`event`]: the workflow boundary — process event, dispatcher handle,
//!   and the per-request query building context
//! - [`query`]: fluent builder and eager executable query over a collection
//! - [`store`]: connection management for the MongoDB client
//! - [`loader`]: the composition root wiring all of the above into named
//!   extension points an external orchestrator invokes per phase
//!
//! The orchestrator, request implementation, and dispatcher are external
//! collaborators; this crate defines only their boundary traits. The loader
//! never decides item-vs-collection itself — that decision arrives as the
//! event name of the invoked phase.
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use mongodb::bson::doc;
//! use mongodb_api_loader::{
//!     DocumentStore, Loader, LoaderConfig, NullDispatcher, OwnedRequest,
//!     ParameterContainer, ProcessEvent, ServerRequest,
//! };
//!
//! struct RequestEvent {
//!     request: OwnedRequest,
//! }
//!
//! impl ProcessEvent for RequestEvent {
//!     fn request(&self) -> &dyn ServerRequest {
//!         &self.request
//!     }
//! }
//!
//! # async fn example() -> mongodb_api_loader::Result<()> {
//! let store = DocumentStore::connect("mongodb://localhost:27017/apidb").await?;
//! let loader = Loader::new(
//!     store,
//!     LoaderConfig::new(
//!         "articles".to_string(),
//!         "_id".to_string(),
//!         ParameterContainer::Attributes,
//!         "id".to_string(),
//!     ),
//! )?;
//!
//! let event = Arc::new(RequestEvent {
//!     request: OwnedRequest::new().with_attributes(doc! { "id": "5c3f8a" }),
//! });
//!
//! let mut context = loader.query_building_context(event);
//! let result = loader
//!     .run_phase("loader.item", &mut context, &NullDispatcher)
//!     .await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod logging;
pub mod query;
pub mod request;
pub mod store;

pub use config::{ConnectionConfig, LoaderConfig};
pub use error::{LoaderError, QueryError, Result};
pub use event::{EventDispatcher, NullDispatcher, ProcessEvent, QueryBuildingContext};
pub use loader::{LoadMode, LoadResult, Loader, PhaseSubscription};
pub use query::{Query, QueryBuilder};
pub use request::{OwnedRequest, ParameterContainer, ServerRequest, resolve_parameter};
pub use store::DocumentStore;
