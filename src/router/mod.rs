//! # Router Module
//!
//! Inbound matching: request path in, best endpoint and route values out.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Ranking endpoints by explicit order, then [`Precedence`], then
//!   registration order
//! - Building an immutable [`MatchTree`] keyed by path segment
//! - Matching request paths with constraints, optional segments and
//!   catch-alls, returning the best endpoint over every successful branch
//! - Publishing rebuilt tables atomically to concurrent readers
//!
//! ## Architecture
//!
//! 1. **Build**: [`RouteTable::build`] sorts endpoints, validates route names
//!    and builds both the match tree and the link generator from the same
//!    ranking.
//!
//! 2. **Match**: [`Router::route`] loads the current table (lock-free) and
//!    walks the tree depth-first, backtracking on constraint failures.
//!
//! 3. **Swap**: [`Router::rebuild`] never edits a live table; it builds a new
//!    one and swaps a single pointer.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routeweave::{Endpoint, Router, RouterOptions};
//!
//! let router = Router::build(
//!     vec![
//!         Endpoint::builder("file", "files/{*path}").build().unwrap(),
//!         Endpoint::builder("readme", "files/README").build().unwrap(),
//!     ],
//!     RouterOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(router.route(Method::GET, "/files/readme").unwrap().handler_name(), "readme");
//! let m = router.route(Method::GET, "/files/a/b/c").unwrap();
//! assert_eq!(m.get("path"), Some("a/b/c"));
//! ```

mod core;
pub mod precedence;
pub mod tree;

pub use core::{RouteMatch, RouteTable, Router};
pub use precedence::Precedence;
pub use tree::{MatchTree, TreeMatch};
