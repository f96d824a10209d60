//! # Template Module
//!
//! Parsed form of route template text such as
//! `Customers/Details/{category}/{region}/{id:int}`.
//!
//! ## Grammar
//!
//! Segments are separated by `/`. Each segment is a run of literal text and
//! parameters:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `{name}` | required parameter |
//! | `{name?}` | optional parameter |
//! | `{name=value}` | parameter with a default |
//! | `{name:int:range(1,9)}` | parameter with constraints |
//! | `{*rest}` | catch-all, slashes encoded when generating |
//! | `{**rest}` | catch-all, slashes kept verbatim when generating |
//! | `{{` / `}}` | literal brace |
//!
//! A [`RouteTemplate`] is purely syntactic; constraint names are kept as
//! [`ConstraintReference`]s and resolved later by
//! [`RoutePattern`](crate::pattern::RoutePattern).
//!
//! ## Example
//!
//! ```
//! use routeweave::template::parse_template;
//!
//! let template = parse_template("files/{name}.{ext?}").unwrap();
//! assert_eq!(template.segments().len(), 2);
//! assert_eq!(template.to_string(), "files/{name}.{ext?}");
//! ```

mod parser;

pub use parser::parse_template;

use std::fmt;
use std::sync::Arc;

/// How a parameter participates in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Standard,
    Optional,
    /// Absorbs the rest of the path, including `/`.
    CatchAll {
        /// `{*name}` encodes `/` when generating; `{**name}` does not.
        encode_slashes: bool,
    },
}

/// A constraint as written in the template, e.g. `range(1,10)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintReference {
    pub name: String,
    /// Raw text between the parentheses, if any.
    pub args: Option<String>,
}

impl ConstraintReference {
    /// Parse `name` or `name(args)`.
    ///
    /// Returns `None` for an empty name or unbalanced parentheses.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.find('(') {
            None => {
                if text.is_empty() || text.contains(')') {
                    return None;
                }
                Some(Self {
                    name: text.to_string(),
                    args: None,
                })
            }
            Some(open) => {
                let name = &text[..open];
                let args = text[open + 1..].strip_suffix(')')?;
                if name.is_empty() || !parens_balanced(args) {
                    return None;
                }
                Some(Self {
                    name: name.to_string(),
                    args: Some(args.to_string()),
                })
            }
        }
    }
}

fn parens_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

impl fmt::Display for ConstraintReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.name)?;
        if let Some(args) = &self.args {
            f.write_str("(")?;
            write_escaped(f, args)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A `{...}` part of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPart {
    pub name: Arc<str>,
    pub kind: ParameterKind,
    /// Inline default (`{name=value}`).
    pub default: Option<Arc<str>>,
    pub constraints: Vec<ConstraintReference>,
}

impl ParameterPart {
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.kind == ParameterKind::Optional
    }

    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        matches!(self.kind, ParameterKind::CatchAll { .. })
    }
}

impl fmt::Display for ParameterPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        match self.kind {
            ParameterKind::CatchAll {
                encode_slashes: true,
            } => f.write_str("*")?,
            ParameterKind::CatchAll {
                encode_slashes: false,
            } => f.write_str("**")?,
            _ => {}
        }
        f.write_str(&self.name)?;
        for constraint in &self.constraints {
            write!(f, ":{constraint}")?;
        }
        if self.is_optional() {
            f.write_str("?")?;
        }
        if let Some(default) = &self.default {
            f.write_str("=")?;
            write_escaped(f, default)?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePart {
    Literal(Arc<str>),
    Parameter(ParameterPart),
}

impl RoutePart {
    #[must_use]
    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self {
            Self::Parameter(p) => Some(p),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for RoutePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write_escaped(f, text),
            Self::Parameter(p) => p.fmt(f),
        }
    }
}

/// One `/`-delimited piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSegment {
    pub parts: Vec<RoutePart>,
}

impl RouteSegment {
    /// A segment made of a single part.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    /// The literal text if this segment is exactly one literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [RoutePart::Literal(text)] => Some(text),
            _ => None,
        }
    }

    /// The parameter if this segment is exactly one parameter.
    #[must_use]
    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self.parts.as_slice() {
            [RoutePart::Parameter(p)] => Some(p),
            _ => None,
        }
    }

    /// Whether a request path may stop before this segment.
    ///
    /// True for a lone parameter that is optional, defaulted or a catch-all.
    #[must_use]
    pub fn is_omittable(&self) -> bool {
        self.as_parameter()
            .is_some_and(|p| p.kind != ParameterKind::Standard || p.default.is_some())
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterPart> {
        self.parts.iter().filter_map(RoutePart::as_parameter)
    }
}

impl fmt::Display for RouteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            part.fmt(f)?;
        }
        Ok(())
    }
}

/// A parsed route template.
///
/// Equality is structural: two templates are equal when their segments are,
/// regardless of how the original text was spelled (`/a/` vs `a`).
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    raw: Arc<str>,
    segments: Vec<RouteSegment>,
}

impl RouteTemplate {
    pub(crate) fn new(raw: &str, segments: Vec<RouteSegment>) -> Self {
        Self {
            raw: Arc::from(raw),
            segments,
        }
    }

    /// The text this template was parsed from.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterPart> {
        self.segments.iter().flat_map(RouteSegment::parameters)
    }

    /// Find a parameter by name (ASCII case-insensitive).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.parameters()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Give the named parameter a default, as if it had been written inline.
    /// Returns `false` when no such parameter exists.
    pub(crate) fn set_default(&mut self, name: &str, value: Arc<str>) -> bool {
        let target = self
            .segments
            .iter_mut()
            .flat_map(|s| s.parts.iter_mut())
            .find_map(|part| match part {
                RoutePart::Parameter(p) if p.name.eq_ignore_ascii_case(name) => Some(p),
                _ => None,
            });
        match target {
            Some(p) => {
                p.default = Some(value);
                true
            }
            None => false,
        }
    }

    /// Index of the first segment from which every remaining segment can be
    /// omitted. Equals `segments().len()` when nothing can be dropped.
    #[must_use]
    pub fn omittable_from(&self) -> usize {
        let mut start = self.segments.len();
        while start > 0 && self.segments[start - 1].is_omittable() {
            start -= 1;
        }
        start
    }
}

impl PartialEq for RouteTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for RouteTemplate {}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            segment.fmt(f)?;
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '{' => f.write_str("{{")?,
            '}' => f.write_str("}}")?,
            _ => fmt::Write::write_char(f, c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_reference_parse() {
        let c = ConstraintReference::parse("range(1,10)").unwrap();
        assert_eq!(c.name, "range");
        assert_eq!(c.args.as_deref(), Some("1,10"));
        assert_eq!(c.to_string(), "range(1,10)");

        assert!(ConstraintReference::parse("").is_none());
        assert!(ConstraintReference::parse("(1)").is_none());
        assert!(ConstraintReference::parse("min(1").is_none());
        assert!(ConstraintReference::parse("regex(a)b)").is_none());
    }

    #[test]
    fn test_omittable_from() {
        let t = parse_template("{controller=Home}/{action=Index}/{id?}").unwrap();
        assert_eq!(t.omittable_from(), 0);
        let t = parse_template("api/{version=v1}/users/{id?}").unwrap();
        assert_eq!(t.omittable_from(), 3);
        let t = parse_template("a/b").unwrap();
        assert_eq!(t.omittable_from(), 2);
    }

    #[test]
    fn test_display_escapes_braces() {
        let t = parse_template("lit{{x}}/{id:regex(^\\d{{3}}$)}").unwrap();
        assert_eq!(t.to_string(), "lit{{x}}/{id:regex(^\\d{{3}}$)}");
        assert_eq!(t.segments()[0].as_literal(), Some("lit{x}"));
    }
}
