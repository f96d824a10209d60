//! # Link Generation
//!
//! Reverse routing: given route values, find an endpoint whose template can
//! express them and render its URL.
//!
//! Candidates come from a route name, a handler name, or every endpoint that
//! allows link generation. They are tried in rank order (the same order used
//! for matching) and the first that binds produces the link. Values with no
//! place in the template become query parameters, in the order they were
//! supplied.
//!
//! ```rust
//! use std::sync::Arc;
//! use routeweave::link::{LinkGenerator, LinkRequest};
//! use routeweave::{route_values, Endpoint, RouterOptions};
//!
//! let endpoint = Endpoint::builder("show_user", "users/{id:int}").build().unwrap();
//! let generator = LinkGenerator::new(vec![Arc::new(endpoint)], RouterOptions::default());
//! let link = generator
//!     .generate(&LinkRequest::new(route_values! { "id" => 42, "tab" => "posts" }))
//!     .unwrap();
//! assert_eq!(link.path, "/users/42?tab=posts");
//! ```

mod binder;
mod encode;
mod generator;

pub use generator::{GeneratedLink, LinkGenerator, LinkRequest};
