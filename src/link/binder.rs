//! Binding values to a single candidate endpoint.
//!
//! The binder decides whether one endpoint can produce a link from the
//! explicit and ambient values, and if so renders its path. Order of checks:
//!
//! 1. Ambient values are usable for parameters only if no explicit value for
//!    a required-value key contradicts the ambient one.
//! 2. Parameters are bound in template order: explicit, then ambient, then
//!    default. Once an explicit value differs from the ambient value, later
//!    parameters stop using ambient values.
//! 3. Required values, non-parameter defaults and constraints are checked
//!    against the bound values.
//! 4. Trailing segments with no value, or with their default value, are
//!    dropped; an empty segment before a rendered one rejects the candidate.

use smallvec::SmallVec;

use super::encode::{push_catch_all, push_segment};
use crate::constraints::RouteDirection;
use crate::endpoint::Endpoint;
use crate::options::RouterOptions;
use crate::template::{ParameterKind, RoutePart};
use crate::values::{values_equal, RouteValues};

const OUT: RouteDirection = RouteDirection::UrlGeneration;

/// A rendered candidate.
#[derive(Debug)]
pub(crate) struct Binding<'v> {
    /// Starts with `/`; no base, query or fragment.
    pub path: String,
    /// Explicit values with no place in the path, in supplied order.
    pub query: SmallVec<[(&'v str, &'v str); 4]>,
}

type Bound<'a> = SmallVec<[(&'a str, Option<&'a str>); 8]>;

fn lookup<'a>(bound: &Bound<'a>, name: &str) -> Option<&'a str> {
    bound
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| *v)
}

pub(crate) fn bind<'v>(
    endpoint: &'v Endpoint,
    explicit: &'v RouteValues,
    ambient: &'v RouteValues,
    options: &RouterOptions,
) -> Option<Binding<'v>> {
    let pattern = endpoint.pattern();
    let required = endpoint.required_values();

    let mut use_ambient = required.iter().all(|(key, _)| {
        explicit
            .get(key)
            .is_none_or(|x| values_equal(Some(x), ambient.get(key)))
    });

    let mut bound = Bound::new();
    for p in pattern.template().parameters() {
        let explicit_value = explicit.get(&p.name);
        let ambient_value = if use_ambient {
            ambient.get(&p.name)
        } else {
            None
        };
        if let (Some(x), Some(a)) = (explicit_value, ambient_value) {
            if !values_equal(Some(x), Some(a)) {
                use_ambient = false;
            }
        }
        let value = explicit_value
            .or(ambient_value)
            .filter(|v| !v.is_empty())
            .or_else(|| pattern.default_value(&p.name));
        if value.is_none() && p.kind == ParameterKind::Standard {
            return None;
        }
        bound.push((p.name.as_ref(), value));
    }

    for (key, required_value) in required.iter() {
        let effective = if pattern.is_parameter(key) {
            lookup(&bound, key)
        } else {
            explicit
                .get(key)
                .or_else(|| ambient.get(key))
                .or_else(|| pattern.default_value(key))
        };
        if !values_equal(effective, Some(required_value)) {
            return None;
        }
    }

    for (key, default) in pattern.non_parameter_defaults() {
        if explicit
            .get(key)
            .is_some_and(|x| !values_equal(Some(x), Some(default)))
        {
            return None;
        }
    }

    if !bound
        .iter()
        .all(|(name, value)| pattern.accepts(name, *value, OUT))
    {
        return None;
    }
    for key in pattern.constrained_keys() {
        if pattern.is_parameter(key) {
            continue;
        }
        let value = explicit.get(key).or_else(|| pattern.default_value(key));
        if !pattern.accepts(key, value, OUT) {
            return None;
        }
    }

    let path = render(endpoint, &bound, options)?;

    let query = explicit
        .iter()
        .filter(|(key, value)| {
            !value.is_empty()
                && !pattern.is_parameter(key)
                && pattern.default_value(key).is_none()
                && !required.contains_key(key)
        })
        .collect();

    Some(Binding { path, query })
}

fn render(endpoint: &Endpoint, bound: &Bound<'_>, options: &RouterOptions) -> Option<String> {
    let segments = endpoint.pattern().template().segments();

    let mut keep = segments.len();
    while let Some(p) = keep.checked_sub(1).and_then(|i| segments[i].as_parameter()) {
        let droppable = match lookup(bound, &p.name) {
            None => true,
            Some(value) => {
                options.elide_trailing_defaults
                    && p.default
                        .as_deref()
                        .is_some_and(|d| values_equal(Some(value), Some(d)))
            }
        };
        if !droppable {
            break;
        }
        keep -= 1;
    }

    let mut path = String::with_capacity(64);
    for segment in &segments[..keep] {
        path.push('/');
        if let Some(p) = segment.as_parameter() {
            // a gap: an empty segment before one that is rendered
            let value = lookup(bound, &p.name)?;
            match p.kind {
                ParameterKind::CatchAll { encode_slashes } => {
                    push_catch_all(&mut path, value, encode_slashes);
                }
                _ => push_segment(&mut path, value),
            }
            continue;
        }
        for (i, part) in segment.parts.iter().enumerate() {
            match part {
                RoutePart::Literal(text) => {
                    let before_absent_optional = segment
                        .parts
                        .get(i + 1)
                        .and_then(RoutePart::as_parameter)
                        .is_some_and(|next| {
                            next.is_optional() && lookup(bound, &next.name).is_none()
                        });
                    if !before_absent_optional {
                        path.push_str(text);
                    }
                }
                RoutePart::Parameter(p) => match lookup(bound, &p.name) {
                    Some(value) => push_segment(&mut path, value),
                    None if p.is_optional() => {}
                    None => return None,
                },
            }
        }
    }

    if path.is_empty() {
        path.push('/');
    }
    Some(path)
}
