//! Name → constraint factory lookup.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::{
    AlphaConstraint, FileConstraint, LengthConstraint, RangeConstraint, RegexConstraint,
    RequiredConstraint, TypeConstraint, ValueType,
};
use super::{RouteConstraint, RouteDirection};
use crate::template::ConstraintReference;

/// Builds a constraint from the raw argument text (`None` when the
/// reference had no parentheses). Errors are human-readable reasons.
pub type ConstraintFactory =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, String> + Send + Sync>;

static DEFAULT_REGISTRY: Lazy<ConstraintRegistry> = Lazy::new(ConstraintRegistry::new);

/// The shared registry holding only the built-in constraints.
#[must_use]
pub fn default_registry() -> &'static ConstraintRegistry {
    &DEFAULT_REGISTRY
}

/// Why a [`ConstraintReference`] could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Unknown,
    InvalidArguments(String),
}

/// Registry of constraint factories keyed by lower-cased name.
///
/// [`ConstraintRegistry::new`] comes pre-loaded with the built-ins; add
/// application-specific kinds with [`register`](Self::register) or
/// [`register_constraint`](Self::register_constraint).
#[derive(Clone)]
pub struct ConstraintRegistry {
    factories: HashMap<String, ConstraintFactory>,
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ConstraintRegistry")
            .field("constraints", &names)
            .finish()
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintRegistry {
    /// A registry containing the built-in constraints.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, value_type) in [
            ("int", ValueType::Int),
            ("long", ValueType::Long),
            ("bool", ValueType::Bool),
            ("datetime", ValueType::DateTime),
            ("decimal", ValueType::Decimal),
            ("double", ValueType::Double),
            ("float", ValueType::Float),
            ("guid", ValueType::Guid),
        ] {
            registry.register_constraint(name, Arc::new(TypeConstraint::new(value_type)));
        }
        registry.register_constraint("alpha", Arc::new(AlphaConstraint));
        registry.register_constraint("required", Arc::new(RequiredConstraint));
        registry.register_constraint("file", Arc::new(FileConstraint { expect_file: true }));
        registry.register_constraint("nonfile", Arc::new(FileConstraint { expect_file: false }));

        registry.register("length", |args| {
            let bounds = parse_numbers::<usize>(args, 1..=2)?;
            let min = bounds[0];
            let max = bounds.get(1).copied().unwrap_or(min);
            if min > max {
                return Err(format!("min {min} is greater than max {max}"));
            }
            Ok(Arc::new(LengthConstraint {
                min,
                max: Some(max),
            }))
        });
        registry.register("minlength", |args| {
            let [min] = single::<usize>(args)?;
            Ok(Arc::new(LengthConstraint { min, max: None }))
        });
        registry.register("maxlength", |args| {
            let [max] = single::<usize>(args)?;
            Ok(Arc::new(LengthConstraint {
                min: 0,
                max: Some(max),
            }))
        });
        registry.register("min", |args| {
            let [min] = single::<i64>(args)?;
            Ok(Arc::new(RangeConstraint {
                min: Some(min),
                max: None,
            }))
        });
        registry.register("max", |args| {
            let [max] = single::<i64>(args)?;
            Ok(Arc::new(RangeConstraint {
                min: None,
                max: Some(max),
            }))
        });
        registry.register("range", |args| {
            let bounds = parse_numbers::<i64>(args, 2..=2)?;
            if bounds[0] > bounds[1] {
                return Err(format!(
                    "min {} is greater than max {}",
                    bounds[0], bounds[1]
                ));
            }
            Ok(Arc::new(RangeConstraint {
                min: Some(bounds[0]),
                max: Some(bounds[1]),
            }))
        });
        registry.register("regex", |args| {
            let pattern = args.ok_or_else(|| "expected a pattern".to_string())?;
            RegexConstraint::new(pattern)
                .map(|c| Arc::new(c) as Arc<dyn RouteConstraint>)
                .map_err(|e| e.to_string())
        });
        registry
    }

    /// A registry with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name` (case-insensitive), replacing any
    /// previous registration.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, String> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Register a constraint that takes no arguments.
    pub fn register_constraint(&mut self, name: &str, constraint: Arc<dyn RouteConstraint>) {
        let key = name.to_string();
        self.register(name, move |args| match args {
            None => Ok(Arc::clone(&constraint)),
            Some(_) => Err(format!("'{key}' takes no arguments")),
        });
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Instantiate the constraint a reference names.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Unknown`] for an unregistered name,
    /// [`ResolveError::InvalidArguments`] when the factory rejects the
    /// arguments.
    pub fn resolve(
        &self,
        reference: &ConstraintReference,
    ) -> Result<Arc<dyn RouteConstraint>, ResolveError> {
        let factory = self
            .factories
            .get(&reference.name.to_ascii_lowercase())
            .ok_or(ResolveError::Unknown)?;
        factory(reference.args.as_deref()).map_err(ResolveError::InvalidArguments)
    }

    /// Evaluate constraint text such as `int` or `range(1,5)` against a raw
    /// value. Unknown or malformed constraints evaluate to `false`.
    #[must_use]
    pub fn evaluate(&self, constraint: &str, value: &str) -> bool {
        ConstraintReference::parse(constraint)
            .and_then(|reference| self.resolve(&reference).ok())
            .is_some_and(|c| {
                let value = (!value.is_empty()).then_some(value);
                c.matches(value, RouteDirection::IncomingRequest)
            })
    }
}

fn parse_numbers<T: std::str::FromStr>(
    args: Option<&str>,
    arity: std::ops::RangeInclusive<usize>,
) -> Result<Vec<T>, String> {
    let args = args.ok_or_else(|| "expected numeric arguments".to_string())?;
    let values = args
        .split(',')
        .map(|a| {
            a.trim()
                .parse::<T>()
                .map_err(|_| format!("'{}' is not a valid number", a.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if !arity.contains(&values.len()) {
        return Err(format!(
            "expected {} to {} arguments, got {}",
            arity.start(),
            arity.end(),
            values.len()
        ));
    }
    Ok(values)
}

fn single<T: std::str::FromStr + Copy>(args: Option<&str>) -> Result<[T; 1], String> {
    let values = parse_numbers::<T>(args, 1..=1)?;
    Ok([values[0]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Even;

    impl RouteConstraint for Even {
        fn matches(&self, value: Option<&str>, _direction: RouteDirection) -> bool {
            value.is_none_or(|v| v.parse::<u64>().is_ok_and(|n| n % 2 == 0))
        }
    }

    #[test]
    fn test_evaluate_builtins() {
        let registry = default_registry();
        assert!(registry.evaluate("int", "10"));
        assert!(!registry.evaluate("int", "abc"));
        assert!(registry.evaluate("range(1,5)", "5"));
        assert!(!registry.evaluate("range(1,5)", "6"));
        assert!(registry.evaluate("length(3)", "abc"));
        assert!(!registry.evaluate("minlength(4)", "abc"));
        assert!(registry.evaluate("regex(^\\d{3}$)", "123"));
        assert!(!registry.evaluate("required", ""));
        assert!(registry.evaluate("INT", "7"));
    }

    #[test]
    fn test_unknown_constraint_fails_closed() {
        assert!(!default_registry().evaluate("nope", "x"));
        assert!(!default_registry().evaluate("range(a,b)", "1"));
    }

    #[test]
    fn test_resolve_errors() {
        let registry = ConstraintRegistry::new();
        let reference = ConstraintReference::parse("range(5,1)").unwrap();
        assert!(matches!(
            registry.resolve(&reference),
            Err(ResolveError::InvalidArguments(_))
        ));
        let reference = ConstraintReference::parse("int(3)").unwrap();
        assert!(matches!(
            registry.resolve(&reference),
            Err(ResolveError::InvalidArguments(_))
        ));
        let reference = ConstraintReference::parse("regex([)").unwrap();
        assert!(matches!(
            registry.resolve(&reference),
            Err(ResolveError::InvalidArguments(_))
        ));
        let reference = ConstraintReference::parse("slug").unwrap();
        assert_eq!(registry.resolve(&reference).unwrap_err(), ResolveError::Unknown);
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ConstraintRegistry::new();
        registry.register_constraint("even", Arc::new(Even));
        assert!(registry.contains("Even"));
        assert!(registry.evaluate("even", "4"));
        assert!(!registry.evaluate("even", "3"));
    }
}
