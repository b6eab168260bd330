//! Inbound request boundary and parameter resolution.
//!
//! A request exposes up to six parameter containers (server parameters,
//! cookies, query string, uploaded file descriptors, parsed body, routing
//! attributes). The loader reads exactly one configured key from one
//! configured container to obtain a document identifier; everything else
//! about the request is opaque to this crate.
//!
//! Containers are BSON documents so that resolved values flow into query
//! filters without conversion.

use crate::error::{LoaderError, Result};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// The six parameter containers an inbound request may expose.
///
/// Each variant maps to one accessor on [`ServerRequest`]. Selection is by
/// enum value, never by method-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterContainer {
    /// Server environment parameters.
    Server,
    /// Request cookies.
    Cookies,
    /// Query string parameters.
    Query,
    /// Uploaded file descriptors.
    Files,
    /// Parsed request body.
    Body,
    /// Path and routing attributes.
    Attributes,
}

impl ParameterContainer {
    /// All container kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Server,
        Self::Cookies,
        Self::Query,
        Self::Files,
        Self::Body,
        Self::Attributes,
    ];

    /// Stable name of the container, as used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Cookies => "cookies",
            Self::Query => "query",
            Self::Files => "files",
            Self::Body => "body",
            Self::Attributes => "attributes",
        }
    }

    /// Reads this container from a request.
    ///
    /// Returns `None` when the request does not expose the container at all,
    /// which resolution reports as a configuration error.
    pub fn read<'r>(self, request: &'r dyn ServerRequest) -> Option<&'r Document> {
        match self {
            Self::Server => request.server_params(),
            Self::Cookies => request.cookie_params(),
            Self::Query => request.query_params(),
            Self::Files => request.uploaded_files(),
            Self::Body => request.parsed_body(),
            Self::Attributes => request.attributes(),
        }
    }
}

impl std::fmt::Display for ParameterContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParameterContainer {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "server" => Ok(Self::Server),
            "cookies" => Ok(Self::Cookies),
            "query" => Ok(Self::Query),
            "files" => Ok(Self::Files),
            "body" => Ok(Self::Body),
            "attributes" => Ok(Self::Attributes),
            other => Err(LoaderError::configuration(format!(
                "Unknown parameter container '{other}'"
            ))),
        }
    }
}

/// Read-only view over an inbound request's parameter containers.
///
/// Implementations advertise container support by returning `Some`; the
/// default for every accessor is "not exposed". A request adapter for a
/// concrete HTTP stack implements only the containers that stack provides.
pub trait ServerRequest: Send + Sync {
    /// Server environment parameters.
    fn server_params(&self) -> Option<&Document> {
        None
    }

    /// Request cookies.
    fn cookie_params(&self) -> Option<&Document> {
        None
    }

    /// Query string parameters.
    fn query_params(&self) -> Option<&Document> {
        None
    }

    /// Uploaded file descriptors.
    fn uploaded_files(&self) -> Option<&Document> {
        None
    }

    /// Parsed request body.
    fn parsed_body(&self) -> Option<&Document> {
        None
    }

    /// Path and routing attributes.
    fn attributes(&self) -> Option<&Document> {
        None
    }
}

/// Owned, container-per-field request value.
///
/// Useful for tests and for embedding in workflows that materialize request
/// data up front. Containers left unset behave as "not exposed".
///
/// # Example
/// ```rust
/// use mongodb_api_loader::request::OwnedRequest;
/// use mongodb::bson::doc;
///
/// let request = OwnedRequest::new()
///     .with_attributes(doc! { "id": "5c3f" })
///     .with_query_params(doc! { "page": 2_i32 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct OwnedRequest {
    server_params: Option<Document>,
    cookie_params: Option<Document>,
    query_params: Option<Document>,
    uploaded_files: Option<Document>,
    parsed_body: Option<Document>,
    attributes: Option<Document>,
}

impl OwnedRequest {
    /// Creates a request exposing no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server parameters container.
    #[must_use]
    pub fn with_server_params(mut self, params: Document) -> Self {
        self.server_params = Some(params);
        self
    }

    /// Sets the cookies container.
    #[must_use]
    pub fn with_cookie_params(mut self, params: Document) -> Self {
        self.cookie_params = Some(params);
        self
    }

    /// Sets the query string container.
    #[must_use]
    pub fn with_query_params(mut self, params: Document) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Sets the uploaded files container.
    #[must_use]
    pub fn with_uploaded_files(mut self, files: Document) -> Self {
        self.uploaded_files = Some(files);
        self
    }

    /// Sets the parsed body container.
    #[must_use]
    pub fn with_parsed_body(mut self, body: Document) -> Self {
        self.parsed_body = Some(body);
        self
    }

    /// Sets the parsed body container from a JSON object.
    ///
    /// # Errors
    /// Returns a serialization error if the value is not a JSON object or
    /// cannot be represented as BSON.
    pub fn with_json_body(self, body: &serde_json::Value) -> Result<Self> {
        let document = mongodb::bson::to_document(body)
            .map_err(|e| LoaderError::serialization("Failed to convert JSON body to BSON", e))?;
        Ok(self.with_parsed_body(document))
    }

    /// Sets the routing attributes container.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Document) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

impl ServerRequest for OwnedRequest {
    fn server_params(&self) -> Option<&Document> {
        self.server_params.as_ref()
    }

    fn cookie_params(&self) -> Option<&Document> {
        self.cookie_params.as_ref()
    }

    fn query_params(&self) -> Option<&Document> {
        self.query_params.as_ref()
    }

    fn uploaded_files(&self) -> Option<&Document> {
        self.uploaded_files.as_ref()
    }

    fn parsed_body(&self) -> Option<&Document> {
        self.parsed_body.as_ref()
    }

    fn attributes(&self) -> Option<&Document> {
        self.attributes.as_ref()
    }
}

/// Resolves a single scalar value from a request parameter container.
///
/// # Arguments
/// * `request` - The inbound request
/// * `container` - Which parameter container to read
/// * `key` - The key to look up inside the container
///
/// # Returns
/// The stored value, unchanged. No type coercion is performed.
///
/// # Errors
/// Returns a configuration error when the request does not expose the
/// selected container, or the key is absent from it.
pub fn resolve_parameter(
    request: &dyn ServerRequest,
    container: ParameterContainer,
    key: &str,
) -> Result<Bson> {
    tracing::debug!(bag = %container, key, "Resolving request parameter");

    let Some(bag) = container.read(request) else {
        tracing::error!(bag = %container, "The given bag does not exist in the request");
        return Err(LoaderError::configuration(
            "The given bag does not exist in the request",
        ));
    };

    let Some(value) = bag.get(key) else {
        tracing::error!(bag = %container, key, "The given key does not exist in the request bag");
        return Err(LoaderError::configuration(
            "The given key does not exist in the request bag",
        ));
    };

    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn request_with_all_containers() -> OwnedRequest {
        OwnedRequest::new()
            .with_server_params(doc! { "REMOTE_ADDR": "127.0.0.1" })
            .with_cookie_params(doc! { "session": "abc123" })
            .with_query_params(doc! { "page": 2_i32 })
            .with_uploaded_files(doc! { "avatar": { "name": "a.png", "size": 512_i64 } })
            .with_parsed_body(doc! { "bagKey": "value" })
            .with_attributes(doc! { "id": "5c3f8a" })
    }

    #[test]
    fn test_resolve_returns_stored_value_for_every_container() {
        let request = request_with_all_containers();

        let cases = [
            (ParameterContainer::Server, "REMOTE_ADDR", Bson::from("127.0.0.1")),
            (ParameterContainer::Cookies, "session", Bson::from("abc123")),
            (ParameterContainer::Query, "page", Bson::from(2_i32)),
            (
                ParameterContainer::Files,
                "avatar",
                Bson::from(doc! { "name": "a.png", "size": 512_i64 }),
            ),
            (ParameterContainer::Body, "bagKey", Bson::from("value")),
            (ParameterContainer::Attributes, "id", Bson::from("5c3f8a")),
        ];

        for (container, key, expected) in cases {
            let resolved = resolve_parameter(&request, container, key).unwrap();
            assert_eq!(resolved, expected, "container {container}");
        }
    }

    #[test]
    fn test_resolve_unsupported_container() {
        // No containers exposed at all.
        let request = OwnedRequest::new();

        let error = resolve_parameter(&request, ParameterContainer::Body, "bagKey").unwrap_err();
        assert_eq!(
            error.to_string(),
            "The given bag does not exist in the request"
        );
    }

    #[test]
    fn test_resolve_missing_key() {
        let request = OwnedRequest::new().with_parsed_body(doc! { "a": "b" });

        let error = resolve_parameter(&request, ParameterContainer::Body, "c").unwrap_err();
        assert_eq!(
            error.to_string(),
            "The given key does not exist in the request bag"
        );
    }

    #[test]
    fn test_container_name_round_trip() {
        for container in ParameterContainer::ALL {
            let parsed: ParameterContainer = container.as_str().parse().unwrap();
            assert_eq!(parsed, container);
        }
    }

    #[test]
    fn test_container_from_str_unknown() {
        let result = "headers".parse::<ParameterContainer>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("headers"));
    }

    #[test]
    fn test_json_body_conversion() {
        let body = serde_json::json!({ "bagKey": "value", "count": 3 });
        let request = OwnedRequest::new().with_json_body(&body).unwrap();

        let resolved = resolve_parameter(&request, ParameterContainer::Body, "bagKey").unwrap();
        assert_eq!(resolved, Bson::from("value"));
    }

    #[test]
    fn test_json_body_rejects_non_object() {
        let body = serde_json::json!(["not", "an", "object"]);
        let result = OwnedRequest::new().with_json_body(&body);
        assert!(result.is_err());
    }
}
