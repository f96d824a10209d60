//! # Endpoints
//!
//! An [`Endpoint`] is the unit registered with a router: a handler token, the
//! [`RoutePattern`] it answers to, an explicit order, an optional route name,
//! and the required values link generation checks before considering it.
//!
//! Metadata is supplied explicitly at registration; the router never looks
//! inside handlers.
//!
//! ```
//! use http::Method;
//! use routeweave::endpoint::Endpoint;
//!
//! let endpoint = Endpoint::builder("customers_details", "Customers/Details/{id:int}")
//!     .required_value("controller", "Customers")
//!     .required_value("action", "Details")
//!     .method(Method::GET)
//!     .route_name("customer")
//!     .build()
//!     .unwrap();
//! assert_eq!(endpoint.route_name(), Some("customer"));
//! ```

use http::Method;
use std::fmt;
use std::sync::Arc;

use crate::constraints::{ConstraintRegistry, RouteConstraint};
use crate::error::TemplateSyntaxError;
use crate::pattern::{RoutePattern, RoutePatternBuilder};
use crate::values::RouteValues;

/// Typed metadata attached at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMetadata {
    /// Methods this endpoint accepts; empty means any.
    pub http_methods: Vec<Method>,
    /// Never returned by the matcher.
    pub suppress_matching: bool,
    /// Never chosen by the link generator.
    pub suppress_link_generation: bool,
    pub display_name: Option<String>,
}

impl EndpointMetadata {
    /// Whether `method` is acceptable. `HEAD` is accepted wherever `GET` is.
    #[must_use]
    pub fn accepts_method(&self, method: &Method) -> bool {
        self.http_methods.is_empty()
            || self.http_methods.contains(method)
            || (*method == Method::HEAD && self.http_methods.contains(&Method::GET))
    }
}

/// A registered route target.
#[derive(Clone)]
pub struct Endpoint {
    handler_name: Arc<str>,
    pattern: Arc<RoutePattern>,
    order: i32,
    route_name: Option<Arc<str>>,
    required_values: RouteValues,
    metadata: EndpointMetadata,
}

impl Endpoint {
    /// Start building an endpoint for `handler_name` answering `template`.
    #[must_use]
    pub fn builder<'a>(handler_name: impl Into<Arc<str>>, template: &'a str) -> EndpointBuilder<'a> {
        EndpointBuilder {
            handler_name: handler_name.into(),
            pattern: RoutePattern::builder(template),
            order: 0,
            route_name: None,
            required_values: RouteValues::new(),
            metadata: EndpointMetadata::default(),
        }
    }

    /// Wrap an already built pattern.
    #[must_use]
    pub fn from_pattern(handler_name: impl Into<Arc<str>>, pattern: Arc<RoutePattern>) -> Self {
        Self {
            handler_name: handler_name.into(),
            pattern,
            order: 0,
            route_name: None,
            required_values: RouteValues::new(),
            metadata: EndpointMetadata::default(),
        }
    }

    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    #[must_use]
    pub fn pattern(&self) -> &Arc<RoutePattern> {
        &self.pattern
    }

    /// Lower runs first; overrides precedence.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    #[must_use]
    pub fn required_values(&self) -> &RouteValues {
        &self.required_values
    }

    #[must_use]
    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    /// Name used in logs: the display name if set, else the handler name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.metadata
            .display_name
            .as_deref()
            .unwrap_or(&self.handler_name)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("handler_name", &self.handler_name)
            .field("template", &self.pattern.raw_text())
            .field("order", &self.order)
            .field("route_name", &self.route_name)
            .field("required_values", &self.required_values)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> /{}", self.display_name(), self.pattern)
    }
}

/// Builder for [`Endpoint`]; pattern options pass through to
/// [`RoutePatternBuilder`].
pub struct EndpointBuilder<'a> {
    handler_name: Arc<str>,
    pattern: RoutePatternBuilder<'a>,
    order: i32,
    route_name: Option<Arc<str>>,
    required_values: RouteValues,
    metadata: EndpointMetadata,
}

impl<'a> EndpointBuilder<'a> {
    #[must_use]
    pub fn default(mut self, key: impl Into<Arc<str>>, value: impl ToString) -> Self {
        self.pattern = self.pattern.default(key, value);
        self
    }

    #[must_use]
    pub fn constraint(mut self, key: impl Into<Arc<str>>, text: &str) -> Self {
        self.pattern = self.pattern.constraint(key, text);
        self
    }

    #[must_use]
    pub fn custom_constraint(
        mut self,
        key: impl Into<Arc<str>>,
        constraint: Arc<dyn RouteConstraint>,
    ) -> Self {
        self.pattern = self.pattern.custom_constraint(key, constraint);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: &'a ConstraintRegistry) -> Self {
        self.pattern = self.pattern.registry(registry);
        self
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn route_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    /// Add a required value (e.g. `controller = Customers`).
    #[must_use]
    pub fn required_value(mut self, key: impl Into<Arc<str>>, value: impl ToString) -> Self {
        self.required_values.insert(key, value);
        self
    }

    #[must_use]
    pub fn required_values(mut self, values: RouteValues) -> Self {
        self.required_values = values;
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        if !self.metadata.http_methods.contains(&method) {
            self.metadata.http_methods.push(method);
        }
        self
    }

    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        for method in methods {
            self = self.method(method);
        }
        self
    }

    #[must_use]
    pub fn suppress_matching(mut self) -> Self {
        self.metadata.suppress_matching = true;
        self
    }

    #[must_use]
    pub fn suppress_link_generation(mut self) -> Self {
        self.metadata.suppress_link_generation = true;
        self
    }

    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.display_name = Some(name.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`TemplateSyntaxError`] when the pattern cannot be built.
    pub fn build(self) -> Result<Endpoint, TemplateSyntaxError> {
        let pattern = self.pattern.build()?;
        Ok(Endpoint {
            handler_name: self.handler_name,
            pattern: Arc::new(pattern),
            order: self.order,
            route_name: self.route_name,
            required_values: self.required_values,
            metadata: self.metadata,
        })
    }
}
