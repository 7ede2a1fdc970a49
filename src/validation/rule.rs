use std::{
    fmt,
    str::FromStr,
    sync::{Arc, LazyLock},
};

use regex::Regex;

use super::Value;

static BOUNDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?[0-9]+)-(-?[0-9]+)$").expect("this must never fail"));

/// A single parsed validation rule.
///
/// Bounds are inclusive. A rule whose `min` exceeds its `max` is accepted as
/// written and can never be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSpec {
    /// `length=min-max`: the text length in characters lies within the bounds.
    Length {
        /// Minimum length (inclusive).
        min: i64,
        /// Maximum length (inclusive).
        max: i64,
    },
    /// `range=min-max`: the integer value lies within the bounds.
    Range {
        /// Minimum value (inclusive).
        min: i64,
        /// Maximum value (inclusive).
        max: i64,
    },
    /// `string`: the value is textual.
    IsString,
    /// `int`: the value is, or parses as, an integer.
    IsInt,
    /// `float`: the value is, or parses as, a float.
    IsFloat,
}

impl RuleSpec {
    /// The rule name as written in an annotation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Length { .. } => "length",
            Self::Range { .. } => "range",
            Self::IsString => "string",
            Self::IsInt => "int",
            Self::IsFloat => "float",
        }
    }

    /// Compiles the rule into an executable predicate.
    #[must_use]
    pub fn compile(self) -> Predicate {
        let check: Arc<dyn Fn(&Value) -> bool + Send + Sync> = match self {
            Self::Length { min, max } => Arc::new(move |candidate: &Value| {
                candidate.as_text().is_some_and(|text| {
                    let length = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
                    min <= length && length <= max
                })
            }),
            Self::Range { min, max } => Arc::new(move |candidate: &Value| {
                candidate
                    .as_integer()
                    .is_some_and(|value| min <= value && value <= max)
            }),
            Self::IsString => Arc::new(|candidate: &Value| matches!(candidate, Value::Text(_))),
            Self::IsInt => Arc::new(|candidate: &Value| candidate.as_integer().is_some()),
            Self::IsFloat => Arc::new(|candidate: &Value| candidate.as_float().is_some()),
        };

        Predicate { rule: self, check }
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Length { min, max } | Self::Range { min, max } => {
                write!(f, "{}={min}-{max}", self.name())
            }
            Self::IsString | Self::IsInt | Self::IsFloat => f.write_str(self.name()),
        }
    }
}

impl FromStr for RuleSpec {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.trim().split_once('=') {
            Some((name, param)) => (name.trim(), Some(param.trim())),
            None => (s.trim(), None),
        };

        match (name, param) {
            ("length", param) => {
                let (min, max) = parse_bounds(name, param)?;
                Ok(Self::Length { min, max })
            }
            ("range", param) => {
                let (min, max) = parse_bounds(name, param)?;
                Ok(Self::Range { min, max })
            }
            ("string", None) => Ok(Self::IsString),
            ("int", None) => Ok(Self::IsInt),
            ("float", None) => Ok(Self::IsFloat),
            ("string" | "int" | "float", Some(param)) => Err(RuleError::MalformedParameter {
                rule: name.to_string(),
                param: param.to_string(),
            }),
            _ => Err(RuleError::UnknownRule(name.to_string())),
        }
    }
}

/// Parses a `min-max` parameter into a pair of integers.
fn parse_bounds(rule: &str, param: Option<&str>) -> Result<(i64, i64), RuleError> {
    let malformed = || RuleError::MalformedParameter {
        rule: rule.to_string(),
        param: param.unwrap_or_default().to_string(),
    };

    let captures = BOUNDS.captures(param.ok_or_else(malformed)?).ok_or_else(malformed)?;
    let min = captures[1].parse().map_err(|_| malformed())?;
    let max = captures[2].parse().map_err(|_| malformed())?;

    Ok((min, max))
}

/// Parses a comma-separated rule list into rules, preserving their order.
///
/// Empty entries, such as the one left by a trailing comma, are skipped.
///
/// # Errors
///
/// Returns [`RuleError::UnknownRule`] for an unrecognised rule name and
/// [`RuleError::MalformedParameter`] when a rule's parameter does not fit its
/// expected form.
pub fn parse_rules(payload: &str) -> Result<Vec<RuleSpec>, RuleError> {
    payload
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse::<RuleSpec>)
        .collect()
}

/// Parses and compiles a comma-separated rule list.
///
/// ```
/// use fieldbind::validation::{Value, compile};
///
/// let predicates = compile("length=5-10").unwrap();
/// assert!(predicates[0].test(&Value::from("12345")));
/// assert!(!predicates[0].test(&Value::from("1234")));
/// ```
///
/// # Errors
///
/// Fails under the same conditions as [`parse_rules`].
pub fn compile(payload: &str) -> Result<Vec<Predicate>, RuleError> {
    Ok(parse_rules(payload)?
        .into_iter()
        .map(RuleSpec::compile)
        .collect())
}

/// A compiled validation rule.
///
/// Predicates are immutable and cheap to clone; they can be shared freely
/// between threads.
#[derive(Clone)]
pub struct Predicate {
    rule: RuleSpec,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Predicate {
    /// The rule this predicate was compiled from.
    #[must_use]
    pub const fn rule(&self) -> RuleSpec {
        self.rule
    }

    /// Returns `true` if the candidate satisfies the rule.
    #[must_use]
    pub fn test(&self, candidate: &Value) -> bool {
        (self.check)(candidate)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur while parsing a rule list.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleError {
    /// The rule name is not recognised.
    #[error("unknown validation rule '{0}'")]
    UnknownRule(String),

    /// The rule parameter is missing, unexpected, or not a pair of integers.
    #[error("malformed parameter '{param}' for rule '{rule}'")]
    MalformedParameter {
        /// The rule name.
        rule: String,
        /// The parameter as written.
        param: String,
    },
}
