use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::instrument;

use super::{Error, Raw, Source, coerce};
use crate::{
    annotation::FieldSpec,
    validation::{Validator, Value},
};

/// The kind of value a destination field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A string.
    Text,
    /// A signed 64-bit integer.
    Integer,
    /// A 64-bit float.
    Float,
    /// A calendar date, stored as midnight UTC.
    Date,
}

impl FieldKind {
    /// The kind name, as used in schema files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "date" => Ok(Self::Date),
            other => Err(Error::UnsupportedFieldKind(other.to_string())),
        }
    }
}

/// A value after coercion to its destination field kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    /// A text value.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A float value.
    Float(f64),
    /// A date value.
    Date(DateTime<Utc>),
}

impl Bound {
    /// The kind of field this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Float(_) => FieldKind::Float,
            Self::Date(_) => FieldKind::Date,
        }
    }
}

type Setter<T, V> = Box<dyn Fn(&mut T, V) + Send + Sync>;

enum Assign<T> {
    Text(Setter<T, String>),
    Integer(Setter<T, i64>),
    Float(Setter<T, f64>),
    Date(Setter<T, DateTime<Utc>>),
}

/// One entry in a [`RecordShape`]: a named field, its annotation, and how to
/// store a coerced value into it.
pub struct FieldDescriptor<T> {
    name: String,
    annotation: String,
    assign: Assign<T>,
}

impl<T> FieldDescriptor<T> {
    /// The field name, used as the source key when the annotation has no
    /// `source` qualifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw annotation. Empty when the field is not annotated.
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// The kind of value the field holds.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self.assign {
            Assign::Text(_) => FieldKind::Text,
            Assign::Integer(_) => FieldKind::Integer,
            Assign::Float(_) => FieldKind::Float,
            Assign::Date(_) => FieldKind::Date,
        }
    }

    /// Parses the field's annotation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Annotation`] if the annotation is invalid.
    pub fn spec(&self) -> Result<FieldSpec, Error> {
        FieldSpec::parse(&self.annotation).map_err(|source| Error::Annotation {
            field: self.name.clone(),
            source,
        })
    }

    fn bind<S: Source + ?Sized>(&self, target: &mut T, source: &S) -> Result<(), Error> {
        let spec = self.spec()?;
        let key = spec.source_or(&self.name);
        if spec.source().is_none() {
            tracing::trace!(field = %self.name, "no source qualifier, using field name");
        }

        let raw = match source.get(key) {
            Some(raw) if !raw.is_missing() => raw,
            _ if spec.is_required() => return Err(Error::RequiredFieldMissing(key.to_string())),
            _ => {
                tracing::debug!(field = %self.name, key, "optional field absent, left unchanged");
                return Ok(());
            }
        };

        let validator = spec.validator();

        match &self.assign {
            Assign::Text(set) => {
                let text = coerce::text(raw).ok_or_else(|| self.coercion_error(raw))?;
                self.check(&validator, &Value::Text(text.to_string()))?;
                set(target, text.to_string());
            }
            Assign::Integer(set) => {
                let value = coerce::integer(raw).ok_or_else(|| self.coercion_error(raw))?;
                self.check(&validator, &Value::Integer(value))?;
                set(target, value);
            }
            Assign::Float(set) => {
                let value = coerce::float(raw).ok_or_else(|| self.coercion_error(raw))?;
                self.check(&validator, &Value::Float(value))?;
                set(target, value);
            }
            Assign::Date(set) => {
                // Rules see the date as written, not the parsed timestamp.
                let text = coerce::text(raw).ok_or_else(|| self.coercion_error(raw))?;
                let date = coerce::date(text).ok_or_else(|| self.coercion_error(raw))?;
                self.check(&validator, &Value::Text(text.to_string()))?;
                set(target, date);
            }
        }

        tracing::debug!(field = %self.name, key, "bound field");
        Ok(())
    }

    fn check(&self, validator: &Validator, candidate: &Value) -> Result<(), Error> {
        match validator.first_failure(candidate) {
            Some(rule) => Err(Error::ValidationFailed {
                field: self.name.clone(),
                value: candidate.to_string(),
                rule,
            }),
            None => Ok(()),
        }
    }

    fn coercion_error(&self, raw: Raw<'_>) -> Error {
        Error::TypeCoercion {
            field: self.name.clone(),
            kind: self.kind(),
            value: raw.to_string(),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("annotation", &self.annotation)
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// The ordered table of fields that make up a target record.
///
/// A shape stands in for runtime introspection: each record type describes its
/// fields once, and the shape drives every binding into that type.
///
/// ```
/// use fieldbind::binding::{FormSource, RecordShape};
///
/// #[derive(Debug, Default)]
/// struct Login {
///     user: String,
///     attempts: i64,
/// }
///
/// let shape = RecordShape::builder()
///     .text("user", r#"source:"username" required validate:"length=3-20""#, |login: &mut Login, value| {
///         login.user = value;
///     })
///     .integer("attempts", r#"validate:"range=0-5""#, |login: &mut Login, value| {
///         login.attempts = value;
///     })
///     .build();
///
/// let form = FormSource::parse("username=alice&attempts=2").unwrap();
/// let login = shape.build(&form).unwrap();
///
/// assert_eq!(login.user, "alice");
/// assert_eq!(login.attempts, 2);
/// ```
#[derive(Debug)]
pub struct RecordShape<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> RecordShape<T> {
    /// Starts building a shape.
    #[must_use]
    pub fn builder() -> RecordShapeBuilder<T> {
        RecordShapeBuilder::default()
    }

    /// The fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Binds values from `source` into `target`, field by field.
    ///
    /// For each field the annotation is parsed, the value is fetched under the
    /// effective source key, checked for presence, coerced, validated and
    /// assigned. Optional fields with no value keep their current contents.
    ///
    /// The pass runs against a copy of `target`, which replaces it only once
    /// every field has bound. On error `target` is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first annotation, presence, coercion or validation error
    /// encountered.
    pub fn bind<S: Source + ?Sized>(&self, target: &mut T, source: &S) -> Result<(), Error>
    where
        T: Clone,
    {
        let mut staged = target.clone();
        self.fill(&mut staged, source)?;
        *target = staged;
        Ok(())
    }

    /// Binds values from `source` into a new default record.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`RecordShape::bind`].
    pub fn build<S: Source + ?Sized>(&self, source: &S) -> Result<T, Error>
    where
        T: Default,
    {
        let mut target = T::default();
        self.fill(&mut target, source)?;
        Ok(target)
    }

    /// Binds each source into its own record, in parallel.
    ///
    /// Results are returned in the same order as `sources`.
    #[must_use]
    pub fn bind_all<S: Source + Sync>(&self, sources: &[S]) -> Vec<Result<T, Error>>
    where
        T: Default + Send,
    {
        sources.par_iter().map(|source| self.build(source)).collect()
    }

    #[instrument(level = "debug", skip_all, fields(fields = self.fields.len()))]
    fn fill<S: Source + ?Sized>(&self, target: &mut T, source: &S) -> Result<(), Error> {
        for field in &self.fields {
            field.bind(target, source)?;
        }
        Ok(())
    }
}

/// Builder for [`RecordShape`].
#[derive(Debug)]
pub struct RecordShapeBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> Default for RecordShapeBuilder<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> RecordShapeBuilder<T> {
    fn push(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        assign: Assign<T>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            annotation: annotation.into(),
            assign,
        });
        self
    }

    /// Adds a text field.
    #[must_use]
    pub fn text(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        set: impl Fn(&mut T, String) + Send + Sync + 'static,
    ) -> Self {
        self.push(name, annotation, Assign::Text(Box::new(set)))
    }

    /// Adds an integer field.
    #[must_use]
    pub fn integer(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        set: impl Fn(&mut T, i64) + Send + Sync + 'static,
    ) -> Self {
        self.push(name, annotation, Assign::Integer(Box::new(set)))
    }

    /// Adds a float field.
    #[must_use]
    pub fn float(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        set: impl Fn(&mut T, f64) + Send + Sync + 'static,
    ) -> Self {
        self.push(name, annotation, Assign::Float(Box::new(set)))
    }

    /// Adds a date field, parsed from `YYYY-MM-DD`.
    #[must_use]
    pub fn date(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        set: impl Fn(&mut T, DateTime<Utc>) + Send + Sync + 'static,
    ) -> Self {
        self.push(name, annotation, Assign::Date(Box::new(set)))
    }

    /// Finishes the shape.
    #[must_use]
    pub fn build(self) -> RecordShape<T> {
        RecordShape {
            fields: self.fields,
        }
    }
}
