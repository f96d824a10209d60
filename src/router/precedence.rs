//! Specificity ordering for route patterns.
//!
//! Each segment gets a digit, lower meaning more specific:
//!
//! | Digit | Segment |
//! |---|---|
//! | 1 | literal |
//! | 2 | complex (literals and parameters mixed) |
//! | 3 | parameter with constraints |
//! | 4 | parameter |
//! | 5 | optional or defaulted parameter |
//! | 6 | catch-all |
//!
//! Keys compare digit by digit; when one key is a prefix of the other the
//! shorter one sorts first. So `a/b` < `a/{x}` < `{x}/{y}` < `{x}/{*rest}`.

use smallvec::SmallVec;
use std::fmt;

use crate::template::{ParameterKind, RouteSegment, RouteTemplate};

/// Precedence key of a pattern. Smaller is more specific.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Precedence {
    digits: SmallVec<[u8; 8]>,
}

impl Precedence {
    /// Compute the key for a template. `is_constrained` reports whether a
    /// parameter has any constraint attached (inline or explicit).
    pub fn compute(template: &RouteTemplate, is_constrained: impl Fn(&str) -> bool) -> Self {
        let digits = template
            .segments()
            .iter()
            .map(|segment| segment_digit(segment, &is_constrained))
            .collect();
        Self { digits }
    }

    #[must_use]
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }
}

pub(crate) fn segment_digit(segment: &RouteSegment, is_constrained: &impl Fn(&str) -> bool) -> u8 {
    if segment.as_literal().is_some() {
        return 1;
    }
    let Some(p) = segment.as_parameter() else {
        return 2;
    };
    match p.kind {
        ParameterKind::CatchAll { .. } => 6,
        ParameterKind::Optional => 5,
        ParameterKind::Standard if p.default.is_some() => 5,
        ParameterKind::Standard if is_constrained(&p.name) => 3,
        ParameterKind::Standard => 4,
    }
}

impl fmt::Debug for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Precedence({self})")
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.digits.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
