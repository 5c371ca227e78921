//! Concrete requests handed to a transport

use super::template::RequestTemplate;
use crate::types::StringMap;

/// One GET request as executed by a transport
///
/// `url` is either relative to the transport's base URL (template requests)
/// or absolute (followed pagination cursors).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    /// Relative path or absolute URL
    pub url: String,
    /// Query parameters, in emission order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: StringMap,
    /// Whether the transport must attach credentials
    pub needs_auth: bool,
}

impl Request {
    /// Create a plain GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Request for a server-provided pagination cursor.
    ///
    /// The cursor URL is used verbatim: it already carries the query the
    /// server wants, so nothing is re-derived from the template except
    /// headers and the auth requirement.
    pub fn follow(cursor_url: impl Into<String>, template: &RequestTemplate) -> Self {
        Self {
            url: cursor_url.into(),
            query: Vec::new(),
            headers: template.headers().clone(),
            needs_auth: template.needs_auth(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the auth requirement
    #[must_use]
    pub fn with_auth(mut self, needs_auth: bool) -> Self {
        self.needs_auth = needs_auth;
        self
    }

    /// Whether the URL is absolute
    pub fn is_absolute(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    /// Look up a query parameter value
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
