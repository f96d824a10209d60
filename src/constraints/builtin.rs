//! Built-in constraint kinds.
//!
//! Type checks use culture-invariant parsing: `.` is the only decimal
//! separator and there are no thousands separators.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use super::{RouteConstraint, RouteDirection};

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("decimal regex should be valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Primitive types a value can be required to parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Bool,
    DateTime,
    Decimal,
    Double,
    Float,
    Guid,
}

impl ValueType {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Int => value.parse::<i32>().is_ok(),
            Self::Long => value.parse::<i64>().is_ok(),
            Self::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            Self::DateTime => parses_as_datetime(value),
            Self::Decimal => DECIMAL_RE.is_match(value),
            Self::Double => value.parse::<f64>().is_ok(),
            Self::Float => value.parse::<f32>().is_ok(),
            Self::Guid => uuid::Uuid::parse_str(value).is_ok(),
        }
    }
}

fn parses_as_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
}

/// Value must parse as a [`ValueType`].
#[derive(Debug, Clone, Copy)]
pub struct TypeConstraint {
    pub value_type: ValueType,
}

impl TypeConstraint {
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }
}

impl RouteConstraint for TypeConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        value.is_none_or(|v| self.value_type.accepts(v))
    }
}

/// Value must be ASCII letters only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaConstraint;

impl RouteConstraint for AlphaConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        value.is_none_or(|v| v.chars().all(|c| c.is_ascii_alphabetic()))
    }
}

/// Character count within `min..=max` (`max` unbounded when `None`).
///
/// Backs `length(n)`, `length(min,max)`, `minlength(n)` and `maxlength(n)`.
#[derive(Debug, Clone, Copy)]
pub struct LengthConstraint {
    pub min: usize,
    pub max: Option<usize>,
}

impl RouteConstraint for LengthConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        value.is_none_or(|v| {
            let len = v.chars().count();
            len >= self.min && self.max.is_none_or(|max| len <= max)
        })
    }
}

/// Integer value within bounds; backs `min(n)`, `max(n)` and `range(a,b)`.
#[derive(Debug, Clone, Copy)]
pub struct RangeConstraint {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RouteConstraint for RangeConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        let Some(v) = value else { return true };
        match v.parse::<i64>() {
            Ok(n) => self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max),
            Err(_) => false,
        }
    }
}

/// Case-insensitive regular expression; unanchored unless the pattern
/// anchors itself.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    regex: Regex,
}

impl RegexConstraint {
    /// # Errors
    ///
    /// Returns the regex compile error.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl RouteConstraint for RegexConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        value.is_none_or(|v| self.regex.is_match(v))
    }
}

/// Value must be present and non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredConstraint;

impl RouteConstraint for RequiredConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        value.is_some_and(|v| !v.is_empty())
    }
}

/// `file` / `nonfile`: whether the last path segment has an extension.
#[derive(Debug, Clone, Copy)]
pub struct FileConstraint {
    pub expect_file: bool,
}

impl RouteConstraint for FileConstraint {
    fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
        let Some(v) = value else {
            return !self.expect_file;
        };
        let last = v.rsplit('/').next().unwrap_or(v);
        let is_file = last
            .rfind('.')
            .is_some_and(|dot| dot + 1 < last.len());
        is_file == self.expect_file
    }
}
