//! # Route Patterns
//!
//! A [`RoutePattern`] is a parsed template together with its defaults and
//! resolved constraints. It is built once at registration time, never
//! mutated, and shared by the matcher and the link generator.
//!
//! Defaults come from two places: inline (`{action=Index}`) and explicit
//! ([`RoutePatternBuilder::default`]). Explicit defaults may name keys that
//! are not parameters at all (`controller`, `area`); those values are added
//! to every match and must agree with the values a link is generated from.
//!
//! ```
//! use routeweave::pattern::RoutePattern;
//!
//! let pattern = RoutePattern::builder("{action}/{id?}")
//!     .default("controller", "Home")
//!     .default("action", "Index")
//!     .constraint("id", "int")
//!     .build()
//!     .unwrap();
//! assert_eq!(pattern.default_value("controller"), Some("Home"));
//! assert_eq!(pattern.template().omittable_from(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::constraints::{
    default_registry, ConstraintRegistry, ResolveError, RouteConstraint, RouteDirection,
};
use crate::error::{TemplateErrorKind, TemplateSyntaxError};
use crate::router::precedence::Precedence;
use crate::template::{parse_template, ConstraintReference, ParameterPart, RouteTemplate};
use crate::values::{values_equal, RouteValues};

/// A constraint instance attached to a key.
#[derive(Clone)]
pub struct ResolvedConstraint {
    /// How the constraint was written, e.g. `range(1,10)`.
    pub label: Arc<str>,
    pub constraint: Arc<dyn RouteConstraint>,
    /// Equal identities behave identically; lets the match tree share edges.
    pub(crate) identity: Arc<str>,
}

impl fmt::Debug for ResolvedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Immutable template + defaults + constraints.
#[derive(Clone)]
pub struct RoutePattern {
    template: RouteTemplate,
    defaults: RouteValues,
    constraints: Vec<(Arc<str>, Vec<ResolvedConstraint>)>,
    precedence: Precedence,
}

impl RoutePattern {
    /// Parse a template with no extra defaults or constraints.
    ///
    /// # Errors
    ///
    /// See [`RoutePatternBuilder::build`].
    pub fn parse(text: &str) -> Result<Self, TemplateSyntaxError> {
        Self::builder(text).build()
    }

    #[must_use]
    pub fn builder(text: &str) -> RoutePatternBuilder<'_> {
        RoutePatternBuilder {
            text,
            defaults: Vec::new(),
            constraints: Vec::new(),
            registry: None,
        }
    }

    #[must_use]
    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    #[must_use]
    pub fn raw_text(&self) -> &str {
        self.template.raw_text()
    }

    /// All defaults, parameter and non-parameter.
    #[must_use]
    pub fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    #[must_use]
    pub fn default_value(&self, key: &str) -> Option<&str> {
        self.defaults.get(key)
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.template.parameter(name)
    }

    #[must_use]
    pub fn is_parameter(&self, name: &str) -> bool {
        self.template.parameter(name).is_some()
    }

    /// Defaults for keys that are not template parameters.
    pub fn non_parameter_defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults
            .iter()
            .filter(move |(k, _)| !self.is_parameter(k))
    }

    /// Constraints attached to `key`, in declaration order.
    #[must_use]
    pub fn constraints_for(&self, key: &str) -> &[ResolvedConstraint] {
        self.constraints
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map_or(&[], |(_, c)| c.as_slice())
    }

    /// Every key with at least one constraint.
    pub fn constrained_keys(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|(k, _)| k.as_ref())
    }

    /// Run every constraint on `key` against `value`.
    #[inline]
    #[must_use]
    pub fn accepts(&self, key: &str, value: Option<&str>, direction: RouteDirection) -> bool {
        let value = value.filter(|v| !v.is_empty());
        self.constraints_for(key)
            .iter()
            .all(|c| c.constraint.matches(value, direction))
    }

    #[must_use]
    pub fn precedence(&self) -> &Precedence {
        &self.precedence
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template.to_string())
            .field("defaults", &self.defaults)
            .field("constraints", &self.constraints)
            .field("precedence", &self.precedence)
            .finish()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.template.fmt(f)
    }
}

enum PendingConstraint {
    Text(String),
    Instance(Arc<dyn RouteConstraint>),
}

/// Builder for [`RoutePattern`].
pub struct RoutePatternBuilder<'a> {
    text: &'a str,
    defaults: Vec<(Arc<str>, String)>,
    constraints: Vec<(Arc<str>, PendingConstraint)>,
    registry: Option<&'a ConstraintRegistry>,
}

impl<'a> RoutePatternBuilder<'a> {
    /// Add a default. The key may be a parameter or any other route value.
    #[must_use]
    pub fn default(mut self, key: impl Into<Arc<str>>, value: impl ToString) -> Self {
        self.defaults.push((key.into(), value.to_string()));
        self
    }

    /// Attach constraint text (`int`, `range(1,5)`) to a key.
    #[must_use]
    pub fn constraint(mut self, key: impl Into<Arc<str>>, text: &str) -> Self {
        self.constraints
            .push((key.into(), PendingConstraint::Text(text.to_string())));
        self
    }

    /// Attach a constraint instance directly, bypassing the registry.
    #[must_use]
    pub fn custom_constraint(
        mut self,
        key: impl Into<Arc<str>>,
        constraint: Arc<dyn RouteConstraint>,
    ) -> Self {
        self.constraints
            .push((key.into(), PendingConstraint::Instance(constraint)));
        self
    }

    /// Resolve constraint names through `registry` instead of the built-ins.
    #[must_use]
    pub fn registry(mut self, registry: &'a ConstraintRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Parse the template, merge defaults and resolve constraints.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateSyntaxError`] when the template is malformed, an
    /// explicit default conflicts with an inline one, an optional parameter
    /// is given a default, or a constraint cannot be resolved.
    pub fn build(self) -> Result<RoutePattern, TemplateSyntaxError> {
        let text = self.text;
        let err = |kind| TemplateSyntaxError::new(text, kind);
        let registry = self.registry.unwrap_or_else(|| default_registry());
        let mut template = parse_template(text)?;

        let mut defaults = RouteValues::new();
        for p in template.parameters() {
            if let Some(value) = &p.default {
                defaults.push_unique(Arc::clone(&p.name), value.to_string());
            }
        }
        for (key, value) in self.defaults {
            if let Some(p) = template.parameter(&key) {
                if p.is_optional() {
                    return Err(err(TemplateErrorKind::OptionalWithDefault {
                        name: key.to_string(),
                    }));
                }
                if let Some(inline) = &p.default {
                    if !values_equal(Some(inline), Some(&value)) {
                        return Err(err(TemplateErrorKind::ConflictingDefault {
                            name: key.to_string(),
                        }));
                    }
                    continue;
                }
                let name = Arc::clone(&p.name);
                template.set_default(&name, Arc::from(value.as_str()));
                defaults.insert(name, value);
            } else {
                defaults.insert(key, value);
            }
        }

        let mut constraints: Vec<(Arc<str>, Vec<ResolvedConstraint>)> = Vec::new();
        for p in template.parameters() {
            for reference in &p.constraints {
                let resolved = resolve(registry, &p.name, reference).map_err(err)?;
                push_constraint(&mut constraints, &p.name, resolved);
            }
        }
        for (key, pending) in self.constraints {
            let key = template
                .parameter(&key)
                .map_or(key, |p| Arc::clone(&p.name));
            let resolved = match pending {
                PendingConstraint::Text(text) => {
                    let reference = ConstraintReference::parse(&text).ok_or_else(|| {
                        err(TemplateErrorKind::InvalidConstraintSyntax {
                            parameter: key.to_string(),
                            text: text.clone(),
                        })
                    })?;
                    resolve(registry, &key, &reference).map_err(err)?
                }
                PendingConstraint::Instance(constraint) => {
                    let label = format!("{constraint:?}");
                    let identity = format!("{label}@{:p}", Arc::as_ptr(&constraint));
                    ResolvedConstraint {
                        label: Arc::from(label),
                        constraint,
                        identity: Arc::from(identity),
                    }
                }
            };
            push_constraint(&mut constraints, &key, resolved);
        }

        let precedence = Precedence::compute(&template, |name| {
            constraints
                .iter()
                .any(|(k, c)| k.eq_ignore_ascii_case(name) && !c.is_empty())
        });

        Ok(RoutePattern {
            template,
            defaults,
            constraints,
            precedence,
        })
    }
}

fn resolve(
    registry: &ConstraintRegistry,
    key: &str,
    reference: &ConstraintReference,
) -> Result<ResolvedConstraint, TemplateErrorKind> {
    match registry.resolve(reference) {
        Ok(constraint) => {
            let label: Arc<str> = Arc::from(reference.to_string());
            // names only mean the same thing within the default registry;
            // the resolved instance outlives any custom registry
            let identity = if std::ptr::eq(registry, default_registry()) {
                Arc::clone(&label)
            } else {
                Arc::from(format!("{label}@{:p}", Arc::as_ptr(&constraint)))
            };
            Ok(ResolvedConstraint {
                label,
                constraint,
                identity,
            })
        }
        Err(ResolveError::Unknown) => Err(TemplateErrorKind::UnknownConstraint {
            parameter: key.to_string(),
            constraint: reference.name.clone(),
        }),
        Err(ResolveError::InvalidArguments(reason)) => {
            Err(TemplateErrorKind::InvalidConstraintArguments {
                parameter: key.to_string(),
                constraint: reference.name.clone(),
                reason,
            })
        }
    }
}

fn push_constraint(
    constraints: &mut Vec<(Arc<str>, Vec<ResolvedConstraint>)>,
    key: &Arc<str>,
    resolved: ResolvedConstraint,
) {
    match constraints
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
    {
        Some((_, list)) => list.push(resolved),
        None => constraints.push((Arc::clone(key), vec![resolved])),
    }
}
