//! # routeweave
//!
//! **routeweave** is a URL routing engine: it matches request paths against
//! route templates and, in the other direction, generates URLs from route
//! values.
//!
//! ## Overview
//!
//! Routes are written as templates such as
//! `Customers/Details/{category}/{region}/{id:int}` and registered as
//! [`Endpoint`]s carrying a handler token, an order, an optional route name
//! and the required values link generation checks. A [`Router`] builds an
//! immutable table from them and answers two questions:
//!
//! - **Which endpoint handles this path?** ([`Router::route`],
//!   [`Router::match_path`]) returns the endpoint and the extracted
//!   [`RouteValues`], with defaults filled in.
//! - **What is the URL for these values?** ([`Router::generate`],
//!   [`Router::generate_for_handler`]) picks the best endpoint that can
//!   express the values, fills its template, elides trailing defaults and
//!   appends the rest as a query string.
//!
//! ## Architecture
//!
//! - **[`template`]** - Template grammar and parser
//! - **[`pattern`]** - Template plus defaults and resolved constraints
//! - **[`constraints`]** - Built-in and custom value predicates
//! - **[`values`]** - Case-insensitive route value bag
//! - **[`endpoint`]** - Registration unit and its typed metadata
//! - **[`router`]** - Precedence, match tree, route table and atomic swap
//! - **[`link`]** - Link generation
//! - **[`options`]** / **[`logging`]** - Configuration and tracing setup
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use routeweave::{route_values, Endpoint, LinkRequest, Router, RouterOptions};
//!
//! let router = Router::build(
//!     vec![
//!         Endpoint::builder("products", "Products/Details")
//!             .required_value("controller", "Products")
//!             .required_value("action", "Details")
//!             .build()
//!             .unwrap(),
//!         Endpoint::builder("customers", "Customers/Details/{category}/{region}/{id:int}")
//!             .required_value("controller", "Customers")
//!             .required_value("action", "Details")
//!             .build()
//!             .unwrap(),
//!     ],
//!     RouterOptions::default(),
//! )
//! .unwrap();
//!
//! let m = router.route(Method::GET, "/Customers/Details/Administration/US/10").unwrap();
//! assert_eq!(m.handler_name(), "customers");
//! assert_eq!(m.get("id"), Some("10"));
//!
//! let link = router
//!     .generate(&LinkRequest::new(route_values! {
//!         "controller" => "Products",
//!         "action" => "Details",
//!     }))
//!     .unwrap();
//! assert_eq!(link.path, "/Products/Details");
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber itself.
//! Call [`logging::init_logging`] in applications without one.

pub mod constraints;
pub mod endpoint;
pub mod error;
pub mod link;
pub mod logging;
pub mod options;
pub mod pattern;
pub mod router;
pub mod template;
pub mod values;

pub use constraints::{ConstraintRegistry, RouteConstraint, RouteDirection};
pub use endpoint::{Endpoint, EndpointBuilder, EndpointMetadata};
pub use error::{AmbiguousRouteNameError, RouteTableError, TemplateErrorKind, TemplateSyntaxError};
pub use link::{GeneratedLink, LinkGenerator, LinkRequest};
pub use options::RouterOptions;
pub use pattern::RoutePattern;
pub use router::{RouteMatch, RouteTable, Router};
pub use template::{parse_template, RouteTemplate};
pub use values::RouteValues;
