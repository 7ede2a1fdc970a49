use std::str::FromStr;

use non_empty_string::NonEmptyString;

use super::tokenize;
use crate::validation::{RuleError, RuleSpec, Validator, parse_rules};

/// The parsed form of a field annotation.
///
/// ```
/// use fieldbind::annotation::FieldSpec;
///
/// let spec: FieldSpec = r#"source:"email" required validate:"length=1-255""#
///     .parse()
///     .unwrap();
///
/// assert_eq!(spec.source(), Some("email"));
/// assert!(spec.is_required());
/// assert_eq!(spec.rules().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    source: Option<NonEmptyString>,
    required: bool,
    rules: Vec<RuleSpec>,
}

impl FieldSpec {
    /// Parses an annotation.
    ///
    /// An empty annotation yields the default specification: no source key,
    /// not required, no rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a qualifier is unknown, repeated, or malformed, or if
    /// the `validate` payload cannot be parsed.
    pub fn parse(annotation: &str) -> Result<Self, Error> {
        let mut spec = Self::default();
        let mut has_rules = false;

        for qualifier in tokenize(annotation) {
            match qualifier.name() {
                "source" => {
                    if spec.source.is_some() {
                        return Err(Error::DuplicateQualifier("source".to_string()));
                    }
                    let payload = qualifier
                        .payload()
                        .ok_or_else(|| Error::MissingPayload("source".to_string()))?;
                    let source = NonEmptyString::new(payload.to_string())
                        .map_err(|_| Error::EmptySource)?;
                    spec.source = Some(source);
                }
                "required" => {
                    if spec.required {
                        return Err(Error::DuplicateQualifier("required".to_string()));
                    }
                    if qualifier.has_payload() {
                        return Err(Error::UnexpectedPayload("required".to_string()));
                    }
                    spec.required = true;
                }
                "validate" => {
                    if has_rules {
                        return Err(Error::DuplicateQualifier("validate".to_string()));
                    }
                    let payload = qualifier
                        .payload()
                        .ok_or_else(|| Error::MissingPayload("validate".to_string()))?;
                    spec.rules = parse_rules(payload)?;
                    has_rules = true;
                }
                other => return Err(Error::UnknownQualifier(other.to_string())),
            }
        }

        Ok(spec)
    }

    /// The source key given by the `source` qualifier, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().map(NonEmptyString::as_str)
    }

    /// The source key, falling back to the given field name when the
    /// annotation has no `source` qualifier.
    #[must_use]
    pub fn source_or<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.source().unwrap_or(field_name)
    }

    /// Returns `true` if the field carries the `required` qualifier.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// The validation rules, in the order they were written.
    #[must_use]
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// Compiles the rules into a validator.
    #[must_use]
    pub fn validator(&self) -> Validator {
        self.rules.iter().collect()
    }
}

impl FromStr for FieldSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FieldSpec {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Errors that can occur while parsing an annotation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A qualifier appears more than once.
    #[error("duplicate qualifier '{0}'")]
    DuplicateQualifier(String),

    /// A qualifier name is not recognised.
    #[error("unknown qualifier '{0}'")]
    UnknownQualifier(String),

    /// A qualifier that needs a quoted payload was given bare.
    #[error("qualifier '{0}' requires a quoted payload")]
    MissingPayload(String),

    /// A bare qualifier was given a payload.
    #[error("qualifier '{0}' does not take a payload")]
    UnexpectedPayload(String),

    /// The `source` payload is empty.
    #[error("source key must not be empty")]
    EmptySource,

    /// The `validate` payload could not be parsed.
    #[error(transparent)]
    Rule(#[from] RuleError),
}
