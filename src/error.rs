//! Errors raised while building route tables.
//!
//! None of these surface per request: a path that matches nothing, or a set of
//! values no route can satisfy, is reported as `None` by the matcher and the
//! link generator.

use std::fmt;

/// What was wrong with a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// A `{` without a closing `}` or a stray `}`.
    UnbalancedBraces,
    /// `{}` or a parameter with nothing but modifiers.
    EmptyParameterName,
    /// A parameter name containing a reserved character.
    InvalidParameterName { name: String },
    /// The same parameter name appears twice (case-insensitive).
    DuplicateParameter { name: String },
    /// A catch-all that is not the final segment.
    CatchAllNotLast { name: String },
    /// A catch-all sharing its segment with other parts.
    CatchAllInComplexSegment { name: String },
    /// A catch-all marked optional.
    OptionalCatchAll { name: String },
    /// A parameter that is both optional and has a default.
    OptionalWithDefault { name: String },
    /// Two parameters in one segment with no literal between them.
    ConsecutiveParameters,
    /// An optional parameter inside a complex segment that is not the final
    /// part, or is not preceded by a literal.
    InvalidOptionalInSegment { name: String },
    /// An optional parameter followed by a segment that cannot be omitted.
    OptionalFollowedByRequired { name: String },
    /// `//` in the template.
    EmptySegment,
    /// A literal containing `?`.
    InvalidLiteral { literal: String },
    /// Malformed constraint text, e.g. `{id:}` or unbalanced parentheses.
    InvalidConstraintSyntax { parameter: String, text: String },
    /// A constraint name with no registered factory.
    UnknownConstraint { parameter: String, constraint: String },
    /// A registered constraint rejected its arguments.
    InvalidConstraintArguments {
        parameter: String,
        constraint: String,
        reason: String,
    },
    /// An inline default and an explicit default disagree.
    ConflictingDefault { name: String },
}

/// A route template failed to parse or violated a structural rule.
///
/// Raised at registration time only; a route table with a malformed template
/// is never built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntaxError {
    /// The template text as supplied.
    pub template: String,
    pub kind: TemplateErrorKind,
}

impl TemplateSyntaxError {
    pub(crate) fn new(template: &str, kind: TemplateErrorKind) -> Self {
        Self {
            template: template.to_string(),
            kind,
        }
    }
}

impl fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedBraces => write!(f, "unbalanced '{{' or '}}'"),
            Self::EmptyParameterName => write!(f, "parameter name must not be empty"),
            Self::InvalidParameterName { name } => {
                write!(f, "parameter name '{name}' contains a reserved character")
            }
            Self::DuplicateParameter { name } => {
                write!(f, "parameter '{name}' appears more than once")
            }
            Self::CatchAllNotLast { name } => {
                write!(f, "catch-all parameter '{name}' must be the last segment")
            }
            Self::CatchAllInComplexSegment { name } => write!(
                f,
                "catch-all parameter '{name}' must be the only part of its segment"
            ),
            Self::OptionalCatchAll { name } => {
                write!(f, "catch-all parameter '{name}' cannot be optional")
            }
            Self::OptionalWithDefault { name } => write!(
                f,
                "parameter '{name}' cannot be optional and have a default value"
            ),
            Self::ConsecutiveParameters => write!(
                f,
                "a segment cannot contain two parameters without a literal between them"
            ),
            Self::InvalidOptionalInSegment { name } => write!(
                f,
                "optional parameter '{name}' must be the last part of its segment and follow a literal"
            ),
            Self::OptionalFollowedByRequired { name } => write!(
                f,
                "optional parameter '{name}' is followed by a segment that cannot be omitted"
            ),
            Self::EmptySegment => write!(f, "the separator '/' cannot appear consecutively"),
            Self::InvalidLiteral { literal } => {
                write!(f, "literal '{literal}' cannot contain '?'")
            }
            Self::InvalidConstraintSyntax { parameter, text } => write!(
                f,
                "invalid constraint '{text}' on parameter '{parameter}'"
            ),
            Self::UnknownConstraint {
                parameter,
                constraint,
            } => write!(
                f,
                "unknown constraint '{constraint}' on parameter '{parameter}'"
            ),
            Self::InvalidConstraintArguments {
                parameter,
                constraint,
                reason,
            } => write!(
                f,
                "constraint '{constraint}' on parameter '{parameter}' has invalid arguments: {reason}"
            ),
            Self::ConflictingDefault { name } => write!(
                f,
                "parameter '{name}' has both an inline and a different explicit default"
            ),
        }
    }
}

impl fmt::Display for TemplateSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route template '{}': {}", self.template, self.kind)
    }
}

impl std::error::Error for TemplateSyntaxError {}

/// Two endpoints share a route name and nothing distinguishes them.
///
/// Endpoints may share a name when their required values differ (link
/// generation picks between them) or when they share a template (e.g. one
/// per HTTP method). Equal required values with different templates cannot be
/// told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousRouteNameError {
    pub route_name: String,
    pub first_template: String,
    pub second_template: String,
}

impl fmt::Display for AmbiguousRouteNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route name '{}' is ambiguous: '{}' and '{}' have the same required values",
            self.route_name, self.first_template, self.second_template
        )
    }
}

impl std::error::Error for AmbiguousRouteNameError {}

/// Any failure while assembling a route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    Template(TemplateSyntaxError),
    AmbiguousRouteName(AmbiguousRouteNameError),
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(e) => e.fmt(f),
            Self::AmbiguousRouteName(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RouteTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Template(e) => Some(e),
            Self::AmbiguousRouteName(e) => Some(e),
        }
    }
}

impl From<TemplateSyntaxError> for RouteTableError {
    fn from(e: TemplateSyntaxError) -> Self {
        Self::Template(e)
    }
}

impl From<AmbiguousRouteNameError> for RouteTableError {
    fn from(e: AmbiguousRouteNameError) -> Self {
        Self::AmbiguousRouteName(e)
    }
}
