//! Request templates
//!
//! A `RequestTemplate` is a value: every derivation (`to_builder`,
//! `with_page`, `with_filter`) works on a copy, so a template handed to a
//! paginated service can never be changed behind its back.

use super::outbound::Request;
use crate::types::StringMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Sort
// ============================================================================

/// Sort direction for a single sort field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One entry of a JSON:API `sort` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Attribute name
    pub field: String,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Ascending sort on a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse the JSON:API form (`-field` is descending)
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(token),
        }
    }

    /// Render as a JSON:API sort token
    pub fn to_param(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.field.clone(),
            SortDirection::Descending => format!("-{}", self.field),
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// Offset/limit page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Zero-based record offset
    pub offset: u32,
    /// Records per page
    pub limit: u32,
}

impl PageSpec {
    /// Create a page window
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

// ============================================================================
// Template
// ============================================================================

/// Immutable description of a JSON:API list request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestTemplate {
    path: String,
    filters: StringMap,
    includes: Vec<String>,
    sort: Vec<SortField>,
    page: Option<PageSpec>,
    headers: StringMap,
    needs_auth: bool,
}

impl RequestTemplate {
    /// Start building a template for a path
    pub fn builder(path: impl Into<String>) -> RequestTemplateBuilder {
        RequestTemplateBuilder::new(path)
    }

    /// Start a new builder seeded with a copy of this template
    pub fn to_builder(&self) -> RequestTemplateBuilder {
        RequestTemplateBuilder {
            template: self.clone(),
        }
    }

    /// Copy of this template with a different page window
    #[must_use]
    pub fn with_page(&self, offset: u32, limit: u32) -> Self {
        self.to_builder().page(offset, limit).build()
    }

    /// Copy of this template with one filter added or replaced
    #[must_use]
    pub fn with_filter(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.to_builder().filter(key, value).build()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn filters(&self) -> &StringMap {
        &self.filters
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    pub fn page(&self) -> Option<PageSpec> {
        self.page
    }

    pub fn headers(&self) -> &StringMap {
        &self.headers
    }

    pub fn needs_auth(&self) -> bool {
        self.needs_auth
    }

    /// Render the JSON:API query parameters.
    ///
    /// Order is stable: `filter[...]` (by key), `include`, `sort`,
    /// `page[offset]`, `page[limit]`.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(key, value)| (format!("filter[{key}]"), value.clone()))
            .collect();

        if !self.includes.is_empty() {
            params.push(("include".to_string(), self.includes.join(",")));
        }

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(SortField::to_param)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), sort));
        }

        if let Some(page) = self.page {
            params.push(("page[offset]".to_string(), page.offset.to_string()));
            params.push(("page[limit]".to_string(), page.limit.to_string()));
        }

        params
    }

    /// Build the concrete request for this template
    pub fn to_request(&self) -> Request {
        Request {
            url: self.path.clone(),
            query: self.query_params(),
            headers: self.headers.clone(),
            needs_auth: self.needs_auth,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `RequestTemplate`
///
/// `build()` takes `&self` and returns a snapshot, so one builder can
/// produce several related templates.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplateBuilder {
    template: RequestTemplate,
}

impl RequestTemplateBuilder {
    /// Create a builder for a path (relative to the transport base URL)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            template: RequestTemplate {
                path: path.into(),
                ..Default::default()
            },
        }
    }

    /// Add or replace a filter
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template.filters.insert(key.into(), value.into());
        self
    }

    /// Add or replace a multi-valued filter (comma-joined)
    #[must_use]
    pub fn filter_values<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.template.filters.insert(key.into(), joined);
        self
    }

    /// Remove a filter
    #[must_use]
    pub fn remove_filter(mut self, key: &str) -> Self {
        self.template.filters.remove(key);
        self
    }

    /// Include a relationship path (duplicates are ignored)
    #[must_use]
    pub fn include(mut self, relationship: impl Into<String>) -> Self {
        let relationship = relationship.into();
        if !self.template.includes.contains(&relationship) {
            self.template.includes.push(relationship);
        }
        self
    }

    /// Include several relationship paths
    #[must_use]
    pub fn includes<I, S>(self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        relationships
            .into_iter()
            .fold(self, |builder, rel| builder.include(rel))
    }

    /// Append a sort field
    #[must_use]
    pub fn sort(mut self, field: SortField) -> Self {
        self.template.sort.push(field);
        self
    }

    /// Set the page window
    #[must_use]
    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.template.page = Some(PageSpec::new(offset, limit));
        self
    }

    /// Drop the page window (server default paging)
    #[must_use]
    pub fn clear_page(mut self) -> Self {
        self.template.page = None;
        self
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template.headers.insert(key.into(), value.into());
        self
    }

    /// Mark requests from this template as requiring credentials
    #[must_use]
    pub fn needs_auth(mut self, needs_auth: bool) -> Self {
        self.template.needs_auth = needs_auth;
        self
    }

    /// Snapshot the current state as a template
    pub fn build(&self) -> RequestTemplate {
        self.template.clone()
    }
}
