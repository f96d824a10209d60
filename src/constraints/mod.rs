//! # Constraints Module
//!
//! Runtime predicates attached to route parameters. A route only matches when
//! every constraint on every parameter accepts the extracted value, and the
//! link generator re-checks them so it never emits a URL that would not route
//! back to the same endpoint.
//!
//! Constraints are referenced by name in templates (`{id:int}`,
//! `{code:regex(^[a-z]{{3}}$)}`) and resolved through a
//! [`ConstraintRegistry`]. Custom kinds implement [`RouteConstraint`] and are
//! registered under a name, or attached directly to a pattern.
//!
//! A value that fails to parse for a type constraint is simply a failed
//! match; evaluation never errors.

mod builtin;
mod registry;

pub use builtin::{
    AlphaConstraint, FileConstraint, LengthConstraint, RangeConstraint, RegexConstraint,
    RequiredConstraint, TypeConstraint, ValueType,
};
pub use registry::{default_registry, ConstraintFactory, ConstraintRegistry, ResolveError};

use std::fmt;

/// Which side of routing is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    /// Matching a request path.
    IncomingRequest,
    /// Checking values for link generation.
    UrlGeneration,
}

/// A predicate over a single route value.
///
/// `value` is `None` when the parameter has no value (an omitted optional
/// parameter, or an empty value during generation). Most constraints accept
/// a missing value; [`RequiredConstraint`] does not.
pub trait RouteConstraint: fmt::Debug + Send + Sync {
    fn matches(&self, value: Option<&str>, direction: RouteDirection) -> bool;
}
