//! Route template parser.
//!
//! A single left-to-right scan splits the text into segments and parts, then a
//! validation pass checks the structural rules that span segments (unique
//! names, catch-all placement, optional parameters).

use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use super::{
    ConstraintReference, ParameterKind, ParameterPart, RoutePart, RouteSegment, RouteTemplate,
};
use crate::error::{TemplateErrorKind, TemplateSyntaxError};

/// Characters a parameter name may not contain.
const RESERVED_NAME_CHARS: &[char] = &['{', '}', '/', '?', '*', '=', ':'];

/// Parse route template text.
///
/// # Errors
///
/// Returns [`TemplateSyntaxError`] for malformed syntax or a violated
/// structural rule; see the [module docs](super) for the grammar.
pub fn parse_template(text: &str) -> Result<RouteTemplate, TemplateSyntaxError> {
    let err = |kind| TemplateSyntaxError::new(text, kind);

    let body = text.strip_prefix("~/").unwrap_or(text);
    let body = body.strip_prefix('/').unwrap_or(body);
    let body = body.strip_suffix('/').unwrap_or(body);

    let mut segments = Vec::new();
    if body.is_empty() {
        return Ok(RouteTemplate::new(text, segments));
    }

    let mut parts: Vec<RoutePart> = Vec::new();
    let mut literal = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let inner = read_parameter_text(&mut chars).ok_or_else(|| {
                    err(TemplateErrorKind::UnbalancedBraces)
                })?;
                flush_literal(&mut literal, &mut parts);
                let parameter = parse_parameter(&inner).map_err(err)?;
                parts.push(RoutePart::Parameter(parameter));
            }
            '}' => return Err(err(TemplateErrorKind::UnbalancedBraces)),
            '/' => {
                flush_literal(&mut literal, &mut parts);
                if parts.is_empty() {
                    return Err(err(TemplateErrorKind::EmptySegment));
                }
                segments.push(RouteSegment {
                    parts: std::mem::take(&mut parts),
                });
            }
            _ => literal.push(c),
        }
    }

    flush_literal(&mut literal, &mut parts);
    if parts.is_empty() {
        return Err(err(TemplateErrorKind::EmptySegment));
    }
    segments.push(RouteSegment { parts });

    validate(&segments).map_err(err)?;
    Ok(RouteTemplate::new(text, segments))
}

fn flush_literal(literal: &mut String, parts: &mut Vec<RoutePart>) {
    if !literal.is_empty() {
        parts.push(RoutePart::Literal(Arc::from(std::mem::take(literal))));
    }
}

/// Read up to the closing `}` of a parameter, unescaping `{{` and `}}`.
///
/// Returns `None` when the input ends first or a lone `{` appears inside.
fn read_parameter_text(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut inner = String::new();
    while let Some(c) = chars.next() {
        match c {
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                inner.push('}');
            }
            '}' => return Some(inner),
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                inner.push('{');
            }
            '{' => return None,
            _ => inner.push(c),
        }
    }
    None
}

/// Parse the text between the braces: `[*|**]name(:constraint)*[?][=default]`.
fn parse_parameter(text: &str) -> Result<ParameterPart, TemplateErrorKind> {
    let (kind, rest) = if let Some(rest) = text.strip_prefix("**") {
        (
            ParameterKind::CatchAll {
                encode_slashes: false,
            },
            rest,
        )
    } else if let Some(rest) = text.strip_prefix('*') {
        (
            ParameterKind::CatchAll {
                encode_slashes: true,
            },
            rest,
        )
    } else {
        (ParameterKind::Standard, text)
    };

    let name_end = rest.find([':', '=', '?']).unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() {
        return Err(TemplateErrorKind::EmptyParameterName);
    }
    if name.contains(RESERVED_NAME_CHARS) || name.trim() != name {
        return Err(TemplateErrorKind::InvalidParameterName {
            name: name.to_string(),
        });
    }

    let mut rest = &rest[name_end..];
    let mut constraints = Vec::new();
    while let Some(after_colon) = rest.strip_prefix(':') {
        let end = constraint_end(after_colon).ok_or_else(|| {
            TemplateErrorKind::InvalidConstraintSyntax {
                parameter: name.to_string(),
                text: after_colon.to_string(),
            }
        })?;
        let constraint_text = &after_colon[..end];
        let reference = ConstraintReference::parse(constraint_text).ok_or_else(|| {
            TemplateErrorKind::InvalidConstraintSyntax {
                parameter: name.to_string(),
                text: constraint_text.to_string(),
            }
        })?;
        constraints.push(reference);
        rest = &after_colon[end..];
    }

    let mut kind = kind;
    if let Some(after) = rest.strip_prefix('?') {
        if matches!(kind, ParameterKind::CatchAll { .. }) {
            return Err(TemplateErrorKind::OptionalCatchAll {
                name: name.to_string(),
            });
        }
        kind = ParameterKind::Optional;
        rest = after;
    }

    let default = match rest.strip_prefix('=') {
        Some(value) => {
            if kind == ParameterKind::Optional {
                return Err(TemplateErrorKind::OptionalWithDefault {
                    name: name.to_string(),
                });
            }
            Some(Arc::from(value))
        }
        None if rest.is_empty() => None,
        None => {
            return Err(TemplateErrorKind::InvalidParameterName {
                name: text.to_string(),
            })
        }
    };

    Ok(ParameterPart {
        name: Arc::from(name),
        kind,
        default,
        constraints,
    })
}

/// Byte length of one constraint: up to the next `:` or `=` outside
/// parentheses, or a `?` that ends the parameter (`?` or `?=...`).
fn constraint_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ':' | '=' if depth == 0 => return Some(i),
            '?' if depth == 0 => {
                let after = &text[i + 1..];
                if after.is_empty() || after.starts_with('=') {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(text.len())
}

fn validate(segments: &[RouteSegment]) -> Result<(), TemplateErrorKind> {
    let mut seen: Vec<&str> = Vec::new();
    let last = segments.len().saturating_sub(1);

    for (index, segment) in segments.iter().enumerate() {
        for (i, part) in segment.parts.iter().enumerate() {
            match part {
                RoutePart::Literal(text) => {
                    if text.contains('?') {
                        return Err(TemplateErrorKind::InvalidLiteral {
                            literal: text.to_string(),
                        });
                    }
                }
                RoutePart::Parameter(p) => {
                    if seen.iter().any(|s| s.eq_ignore_ascii_case(&p.name)) {
                        return Err(TemplateErrorKind::DuplicateParameter {
                            name: p.name.to_string(),
                        });
                    }
                    seen.push(&p.name);

                    if p.is_catch_all() {
                        if !segment.is_simple() {
                            return Err(TemplateErrorKind::CatchAllInComplexSegment {
                                name: p.name.to_string(),
                            });
                        }
                        if index != last {
                            return Err(TemplateErrorKind::CatchAllNotLast {
                                name: p.name.to_string(),
                            });
                        }
                    }

                    if !segment.is_simple() {
                        if matches!(segment.parts.get(i + 1), Some(RoutePart::Parameter(_))) {
                            return Err(TemplateErrorKind::ConsecutiveParameters);
                        }
                        let follows_literal =
                            i > 0 && matches!(segment.parts[i - 1], RoutePart::Literal(_));
                        if p.is_optional() && (i + 1 != segment.parts.len() || !follows_literal) {
                            return Err(TemplateErrorKind::InvalidOptionalInSegment {
                                name: p.name.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(p) = segment.as_parameter() {
            if p.is_optional() && !segments[index + 1..].iter().all(RouteSegment::is_omittable) {
                return Err(TemplateErrorKind::OptionalFollowedByRequired {
                    name: p.name.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> TemplateErrorKind {
        parse_template(text).unwrap_err().kind
    }

    #[test]
    fn test_literal_segments() {
        let t = parse_template("/Products/Details/").unwrap();
        assert_eq!(t.segments().len(), 2);
        assert_eq!(t.segments()[0].as_literal(), Some("Products"));
        assert_eq!(t.segments()[1].as_literal(), Some("Details"));
    }

    #[test]
    fn test_root_templates() {
        for text in ["", "/", "~/"] {
            assert!(parse_template(text).unwrap().segments().is_empty(), "{text}");
        }
    }

    #[test]
    fn test_parameter_modifiers() {
        let t = parse_template("{a}/{b:int:range(1,5)=3}/{c?}").unwrap();
        let params: Vec<_> = t.parameters().collect();
        assert_eq!(params[0].kind, ParameterKind::Standard);
        assert_eq!(params[1].default.as_deref(), Some("3"));
        assert_eq!(params[1].constraints.len(), 2);
        assert_eq!(params[1].constraints[1].args.as_deref(), Some("1,5"));
        assert!(params[2].is_optional());
    }

    #[test]
    fn test_optional_with_constraint() {
        let t = parse_template("items/{id:int?}").unwrap();
        let p = t.parameter("id").unwrap();
        assert!(p.is_optional());
        assert_eq!(p.constraints[0].name, "int");
    }

    #[test]
    fn test_regex_constraint_keeps_special_characters() {
        let t = parse_template("{code:regex(^[a-z]{{2}}:\\d?$)}").unwrap();
        let p = t.parameter("code").unwrap();
        assert_eq!(p.constraints.len(), 1);
        assert_eq!(p.constraints[0].args.as_deref(), Some("^[a-z]{2}:\\d?$"));
    }

    #[test]
    fn test_slash_inside_constraint_does_not_split() {
        let t = parse_template("a/{p:regex(^x/y$)}").unwrap();
        assert_eq!(t.segments().len(), 2);
    }

    #[test]
    fn test_catch_all_kinds() {
        let t = parse_template("files/{*path}").unwrap();
        assert_eq!(
            t.parameter("path").unwrap().kind,
            ParameterKind::CatchAll {
                encode_slashes: true
            }
        );
        let t = parse_template("files/{**path}").unwrap();
        assert_eq!(
            t.parameter("path").unwrap().kind,
            ParameterKind::CatchAll {
                encode_slashes: false
            }
        );
    }

    #[test]
    fn test_complex_segment() {
        let t = parse_template("{name}.{ext?}").unwrap();
        assert_eq!(t.segments()[0].parts.len(), 3);
        assert!(!t.segments()[0].is_omittable());
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(kind_of("users/{id"), TemplateErrorKind::UnbalancedBraces);
        assert_eq!(kind_of("users/id}"), TemplateErrorKind::UnbalancedBraces);
        assert_eq!(kind_of("users/{}"), TemplateErrorKind::EmptyParameterName);
        assert_eq!(kind_of("users/{?}"), TemplateErrorKind::EmptyParameterName);
        assert_eq!(kind_of("a//b"), TemplateErrorKind::EmptySegment);
        assert_eq!(kind_of("{a}{b}"), TemplateErrorKind::ConsecutiveParameters);
        assert!(matches!(
            kind_of("{id}/{ID}"),
            TemplateErrorKind::DuplicateParameter { .. }
        ));
        assert!(matches!(
            kind_of("{*rest}/tail"),
            TemplateErrorKind::CatchAllNotLast { .. }
        ));
        assert!(matches!(
            kind_of("{*a}/{*b}"),
            TemplateErrorKind::CatchAllNotLast { .. }
        ));
        assert!(matches!(
            kind_of("x{*rest}"),
            TemplateErrorKind::CatchAllInComplexSegment { .. }
        ));
        assert!(matches!(
            kind_of("{*rest?}"),
            TemplateErrorKind::OptionalCatchAll { .. }
        ));
        assert!(matches!(
            kind_of("{a?=1}"),
            TemplateErrorKind::OptionalWithDefault { .. }
        ));
        assert!(matches!(
            kind_of("{a?}/{b}"),
            TemplateErrorKind::OptionalFollowedByRequired { .. }
        ));
        assert!(matches!(
            kind_of("{a?}/b"),
            TemplateErrorKind::OptionalFollowedByRequired { .. }
        ));
        assert!(matches!(
            kind_of("{a?}.{b}"),
            TemplateErrorKind::InvalidOptionalInSegment { .. }
        ));
        assert!(matches!(
            kind_of("{id:}"),
            TemplateErrorKind::InvalidConstraintSyntax { .. }
        ));
        assert!(matches!(
            kind_of("{id:min(1}"),
            TemplateErrorKind::InvalidConstraintSyntax { .. }
        ));
        assert!(matches!(
            kind_of("a?b"),
            TemplateErrorKind::InvalidLiteral { .. }
        ));
        assert!(matches!(
            kind_of("{a?b}"),
            TemplateErrorKind::InvalidParameterName { .. }
        ));
    }

    #[test]
    fn test_optional_chain_is_allowed() {
        assert!(parse_template("{a?}/{b?}").is_ok());
        assert!(parse_template("{a?}/{b=x}/{*rest}").is_ok());
    }

    #[test]
    fn test_reparse_is_structurally_equal() {
        for text in [
            "/Customers/Details/{category}/{region}/{id:int}",
            "{controller=Home}/{action=Index}/{id?}",
            "files/{**path}",
            "blog/{year:int:min(2000)}/{slug:regex(^[a-z-]+$)}",
            "img/{name}.{ext?}",
            "braces{{}}/{v=x{{y}}}",
        ] {
            let first = parse_template(text).unwrap();
            let second = parse_template(&first.to_string()).unwrap();
            assert_eq!(first, second, "{text}");
        }
    }
}
