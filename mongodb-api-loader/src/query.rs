//! Fluent query builder and executable query over one collection.
//!
//! The builder accumulates an equality filter document in the style of an
//! object-document mapper: `builder.field("author").equals("kb")` narrows the
//! match, `query()` compiles the accumulated state into an executable
//! [`Query`]. Query planning, batching, and cursor management stay inside the
//! driver; execution here is eager and returns materialized documents.

use crate::error::QueryError;
use mongodb::Collection;
use mongodb::bson::{Bson, Document};
use mongodb::options::FindOptions;

/// Incrementally constructed, filtered query against one collection.
///
/// A fresh builder matches every document in its collection. Constraints are
/// added through [`field`](Self::field); compilation through
/// [`query`](Self::query) leaves the builder reusable.
#[derive(Clone)]
pub struct QueryBuilder {
    collection: Collection<Document>,
    filter: Document,
}

impl QueryBuilder {
    /// Creates an unfiltered builder over a collection handle.
    pub fn new(collection: Collection<Document>) -> Self {
        Self {
            collection,
            filter: Document::new(),
        }
    }

    /// Name of the collection this builder queries.
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// The filter accumulated so far.
    pub fn filter(&self) -> &Document {
        &self.filter
    }

    /// Starts a constraint on a document field.
    pub fn field(&mut self, name: impl Into<String>) -> FieldConstraint<'_> {
        FieldConstraint {
            builder: self,
            field: name.into(),
        }
    }

    /// Compiles the accumulated state into an executable query.
    pub fn query(&self) -> Query {
        Query {
            collection: self.collection.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("collection", &self.collection.name())
            .field("filter", &self.filter)
            .finish()
    }
}

/// Pending constraint on one field, completed by an operator call.
///
/// Equality is the only operator the loader applies; the two-step shape
/// leaves room for collaborators to extend the builder in their own hooks.
pub struct FieldConstraint<'b> {
    builder: &'b mut QueryBuilder,
    field: String,
}

impl<'b> FieldConstraint<'b> {
    /// Constrains the field to equal the given value.
    pub fn equals(self, value: impl Into<Bson>) -> &'b mut QueryBuilder {
        self.builder.filter.insert(self.field, value.into());
        self.builder
    }
}

/// Compiled, executable query.
///
/// Holds the collection handle and the final filter; each execution issues a
/// fresh find against the store.
#[derive(Clone)]
pub struct Query {
    collection: Collection<Document>,
    filter: Document,
}

impl Query {
    /// Executes the query and returns every matching document.
    ///
    /// The cursor is drained eagerly; callers needing pagination or
    /// streaming add it in their own phase hooks.
    ///
    /// # Errors
    /// Returns an execution error if the find or cursor iteration fails.
    pub async fn execute(&self) -> Result<Vec<Document>, QueryError> {
        tracing::debug!(
            collection = self.collection.name(),
            filter = ?self.filter,
            "Executing collection query"
        );

        let mut cursor = self
            .collection
            .find(self.filter.clone())
            .await
            .map_err(|e| {
                QueryError::execution(
                    format!("Failed to query collection '{}'", self.collection.name()),
                    e,
                )
            })?;

        let mut documents = Vec::new();
        while cursor.advance().await.map_err(|e| {
            QueryError::execution(
                format!(
                    "Failed to iterate cursor for collection '{}'",
                    self.collection.name()
                ),
                e,
            )
        })? {
            let document = cursor.deserialize_current().map_err(|e| {
                QueryError::execution(
                    format!(
                        "Failed to deserialize document from collection '{}'",
                        self.collection.name()
                    ),
                    e,
                )
            })?;
            documents.push(document);
        }

        tracing::debug!(
            collection = self.collection.name(),
            count = documents.len(),
            "Collection query completed"
        );

        Ok(documents)
    }

    /// Executes the query and returns exactly one matching document.
    ///
    /// # Errors
    /// Returns [`QueryError::NoResult`] when nothing matches,
    /// [`QueryError::NonUniqueResult`] when more than one document matches,
    /// or an execution error if the find itself fails.
    pub async fn single_result(&self) -> Result<Document, QueryError> {
        tracing::debug!(
            collection = self.collection.name(),
            filter = ?self.filter,
            "Executing single-result query"
        );

        // Two documents are enough to detect a non-unique match.
        let options = FindOptions::builder().limit(2).build();

        let mut cursor = self
            .collection
            .find(self.filter.clone())
            .with_options(options)
            .await
            .map_err(|e| {
                QueryError::execution(
                    format!("Failed to query collection '{}'", self.collection.name()),
                    e,
                )
            })?;

        let mut documents = Vec::with_capacity(2);
        while cursor.advance().await.map_err(|e| {
            QueryError::execution(
                format!(
                    "Failed to iterate cursor for collection '{}'",
                    self.collection.name()
                ),
                e,
            )
        })? {
            let document = cursor.deserialize_current().map_err(|e| {
                QueryError::execution(
                    format!(
                        "Failed to deserialize document from collection '{}'",
                        self.collection.name()
                    ),
                    e,
                )
            })?;
            documents.push(document);
        }

        let mut documents = documents.into_iter();
        match (documents.next(), documents.next()) {
            (Some(document), None) => Ok(document),
            (None, _) => {
                tracing::error!(
                    collection = self.collection.name(),
                    "Single-result query matched no document"
                );
                Err(QueryError::NoResult)
            }
            (Some(_), Some(_)) => {
                tracing::error!(
                    collection = self.collection.name(),
                    "Single-result query matched more than one document"
                );
                Err(QueryError::NonUniqueResult)
            }
        }
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("collection", &self.collection.name())
            .field("filter", &self.filter)
            .finish()
    }
}
