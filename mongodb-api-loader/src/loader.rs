//! Loader composition root: configuration, extension points, and phase
//! registration.
//!
//! The loader itself is stateless beyond its configuration. An external
//! workflow decides whether a request is an item or a collection load and
//! invokes the extension points in order — instantiate, configure, execute —
//! handing each one `(context, event_name, dispatcher)`. The loader never
//! dispatches follow-up events and never stores results; it reports the two
//! event names it answers to and the key the orchestrator should store
//! results under.

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::event::{EventDispatcher, ProcessEvent, QueryBuildingContext};
use crate::query::QueryBuilder;
use crate::request::resolve_parameter;
use crate::store::DocumentStore;
use mongodb::bson::{Bson, Document};
use std::sync::Arc;

/// Which of the two load phases an event name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Load the full, unfiltered collection.
    Collection,
    /// Load a single document matched by the configured identifier.
    Item,
}

/// One (event name → load mode) registration the loader announces to the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSubscription {
    /// Event name the orchestrator should invoke this loader under.
    pub event_name: String,
    /// Load mode that event name triggers.
    pub mode: LoadMode,
}

/// Result of a completed load phase.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    /// Single document from an item phase.
    Item(Document),
    /// Eager result set from a collection phase.
    Collection(Vec<Document>),
}

impl LoadResult {
    /// The single document, if this is an item result.
    pub fn into_item(self) -> Option<Document> {
        match self {
            Self::Item(document) => Some(document),
            Self::Collection(_) => None,
        }
    }

    /// The result set, if this is a collection result.
    pub fn into_collection(self) -> Option<Vec<Document>> {
        match self {
            Self::Collection(documents) => Some(documents),
            Self::Item(_) => None,
        }
    }
}

/// API loader over one MongoDB collection.
///
/// Bridges an event-driven API workflow to the document store: builds a query
/// for the configured collection, optionally narrows it to one document by an
/// identifier read from the configured request parameter, executes it, and
/// returns the result to the workflow.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use mongodb_api_loader::config::LoaderConfig;
/// use mongodb_api_loader::loader::Loader;
/// use mongodb_api_loader::request::ParameterContainer;
/// use mongodb_api_loader::store::DocumentStore;
///
/// # async fn example(event: Arc<dyn mongodb_api_loader::event::ProcessEvent>) -> mongodb_api_loader::Result<()> {
/// let store = DocumentStore::connect("mongodb://localhost:27017/apidb").await?;
/// let loader = Loader::new(
///     store,
///     LoaderConfig::new(
///         "articles".to_string(),
///         "_id".to_string(),
///         ParameterContainer::Attributes,
///         "id".to_string(),
///     ),
/// )?;
///
/// let mut context = loader.query_building_context(event);
/// let result = loader
///     .run_phase("loader.item", &mut context, &mongodb_api_loader::event::NullDispatcher)
///     .await?;
/// # let _ = result;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    store: DocumentStore,
    config: LoaderConfig,
}

impl Loader {
    /// Creates a loader over a store handle.
    ///
    /// # Errors
    /// Returns a configuration error if the config fails validation.
    pub fn new(store: DocumentStore, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The loader configuration.
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The store handle this loader queries.
    pub const fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Key the orchestrator should store the final result under.
    pub fn result_key(&self) -> &str {
        &self.config.result_key
    }

    /// Creates the per-request query building context for a workflow event.
    pub fn query_building_context(&self, event: Arc<dyn ProcessEvent>) -> QueryBuildingContext {
        tracing::debug!("Creating new query building context");
        QueryBuildingContext::new(event)
    }

    /// Attaches a fresh query builder for the configured collection to the
    /// context, replacing any previous attachment.
    ///
    /// Runs before either configure entry point.
    ///
    /// # Errors
    /// Returns a configuration error if the store has no default database.
    pub fn instantiate_query_builder(
        &self,
        context: &mut QueryBuildingContext,
        _event_name: &str,
        _dispatcher: &dyn EventDispatcher,
    ) -> Result<()> {
        tracing::debug!(
            collection = %self.config.collection,
            "Instantiating new query builder"
        );

        let builder = self.store.query_builder(&self.config.collection)?;
        context.set_query(builder);

        Ok(())
    }

    /// Configures the attached builder to load the full collection.
    ///
    /// Deliberately adds no constraints: the freshly instantiated builder
    /// already matches everything, and collaborators hooked into the same
    /// phase add their own sorting or pagination here.
    #[allow(clippy::unused_self)]
    pub fn configure_for_collection(
        &self,
        _context: &mut QueryBuildingContext,
        _event_name: &str,
        _dispatcher: &dyn EventDispatcher,
    ) -> Result<()> {
        tracing::debug!("Configuring query builder for collection");
        Ok(())
    }

    /// Configures the attached builder to load a single document.
    ///
    /// Resolves the identifier value from the configured request parameter
    /// and applies the equality filter `identifier_field == value`.
    ///
    /// # Errors
    /// Returns a configuration error if the request parameter cannot be
    /// resolved, or a type mismatch error if the attachment is not this
    /// crate's query builder.
    pub fn configure_for_item(
        &self,
        context: &mut QueryBuildingContext,
        _event_name: &str,
        _dispatcher: &dyn EventDispatcher,
    ) -> Result<()> {
        tracing::debug!("Configuring query builder for item");

        let identifier = self.resolve_identifier(context)?;
        tracing::debug!(
            collection = %self.config.collection,
            id = ?identifier,
            "Configuring query builder for item"
        );

        let builder = expect_builder_mut(context)?;
        builder
            .field(self.config.identifier_field.clone())
            .equals(identifier);

        Ok(())
    }

    /// Executes the configured query and returns the single matching
    /// document.
    ///
    /// # Errors
    /// Returns a type mismatch error if the attachment is not this crate's
    /// query builder; store and cardinality failures pass through from the
    /// query layer unreinterpreted.
    pub async fn execute_item(
        &self,
        context: &QueryBuildingContext,
        _event_name: &str,
        _dispatcher: &dyn EventDispatcher,
    ) -> Result<Document> {
        tracing::debug!(collection = %self.config.collection, "Executing item query");

        let builder = expect_builder(context)?;
        let document = builder.query().single_result().await?;

        Ok(document)
    }

    /// Executes the configured query and returns every matching document.
    ///
    /// # Errors
    /// Returns a type mismatch error if the attachment is not this crate's
    /// query builder; store failures pass through from the query layer.
    pub async fn execute_collection(
        &self,
        context: &QueryBuildingContext,
        _event_name: &str,
        _dispatcher: &dyn EventDispatcher,
    ) -> Result<Vec<Document>> {
        tracing::debug!(collection = %self.config.collection, "Executing collection query");

        let builder = expect_builder(context)?;
        let documents = builder.query().execute().await?;

        Ok(documents)
    }

    /// The two phase registrations this loader announces.
    pub fn subscriptions(&self) -> [PhaseSubscription; 2] {
        [
            PhaseSubscription {
                event_name: self.config.collection_event.clone(),
                mode: LoadMode::Collection,
            },
            PhaseSubscription {
                event_name: self.config.item_event.clone(),
                mode: LoadMode::Item,
            },
        ]
    }

    /// Load mode a given event name maps to, if any.
    pub fn mode_for_event(&self, event_name: &str) -> Option<LoadMode> {
        if event_name == self.config.collection_event {
            Some(LoadMode::Collection)
        } else if event_name == self.config.item_event {
            Some(LoadMode::Item)
        } else {
            None
        }
    }

    /// Runs the full phase registered under an event name: instantiate,
    /// configure, execute.
    ///
    /// # Errors
    /// Returns a configuration error for event names no phase is registered
    /// under; otherwise propagates whatever the extension points raise.
    pub async fn run_phase(
        &self,
        event_name: &str,
        context: &mut QueryBuildingContext,
        dispatcher: &dyn EventDispatcher,
    ) -> Result<LoadResult> {
        let Some(mode) = self.mode_for_event(event_name) else {
            tracing::error!(event_name, "No loader phase registered for event");
            return Err(LoaderError::configuration(format!(
                "No loader phase registered for event '{event_name}'"
            )));
        };

        self.instantiate_query_builder(context, event_name, dispatcher)?;

        match mode {
            LoadMode::Collection => {
                self.configure_for_collection(context, event_name, dispatcher)?;
                let documents = self
                    .execute_collection(context, event_name, dispatcher)
                    .await?;
                Ok(LoadResult::Collection(documents))
            }
            LoadMode::Item => {
                self.configure_for_item(context, event_name, dispatcher)?;
                let document = self.execute_item(context, event_name, dispatcher).await?;
                Ok(LoadResult::Item(document))
            }
        }
    }

    /// Resolves the document identifier from the event's originating request.
    fn resolve_identifier(&self, context: &QueryBuildingContext) -> Result<Bson> {
        let request = context.process_event().request();
        resolve_parameter(
            request,
            self.config.parameter_container,
            &self.config.parameter_key,
        )
    }
}

/// Validates that the context attachment is this crate's query builder.
fn expect_builder(context: &QueryBuildingContext) -> Result<&QueryBuilder> {
    let given = context.query_type_name();
    match context.query::<QueryBuilder>() {
        Some(builder) => Ok(builder),
        None => Err(unsupported_builder(given)),
    }
}

/// Mutable variant of [`expect_builder`], same validation.
fn expect_builder_mut(context: &mut QueryBuildingContext) -> Result<&mut QueryBuilder> {
    let given = context.query_type_name();
    match context.query_mut::<QueryBuilder>() {
        Some(builder) => Ok(builder),
        None => Err(unsupported_builder(given)),
    }
}

fn unsupported_builder(given: Option<&'static str>) -> LoaderError {
    let expected = std::any::type_name::<QueryBuilder>();
    let given = given.unwrap_or("none");
    tracing::error!(expected, given, "Unsupported query builder type");
    LoaderError::unsupported_builder(expected, given)
}
