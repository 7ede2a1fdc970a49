//! Binding source mappings into typed records.
//!
//! A [`RecordShape`] lists the fields of a target record, each with an
//! annotation and a setter. Binding walks the shape, pulls each value out of a
//! [`Source`], coerces it to the field's [`FieldKind`], validates it, and
//! stores it.
//!
//! Record types usually implement [`Bindable`] so that [`bind_form`] and
//! [`bind_json`] can find their shape:
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use fieldbind::binding::{Bindable, RecordShape, bind_json};
//!
//! #[derive(Debug, Default)]
//! struct Signup {
//!     email: String,
//!     age: i64,
//! }
//!
//! impl Bindable for Signup {
//!     fn shape() -> &'static RecordShape<Self> {
//!         static SHAPE: LazyLock<RecordShape<Signup>> = LazyLock::new(|| {
//!             RecordShape::builder()
//!                 .text("email", r#"required validate:"length=3-255""#, |s: &mut Signup, v| s.email = v)
//!                 .integer("age", r#"validate:"range=13-130""#, |s: &mut Signup, v| s.age = v)
//!                 .build()
//!         });
//!         &SHAPE
//!     }
//! }
//!
//! let signup: Signup = bind_json(br#"{"email": "ada@example.com", "age": 36}"#).unwrap();
//! assert_eq!(signup.age, 36);
//! ```

use tracing::instrument;

use crate::{annotation, validation::RuleSpec};

mod coerce;
pub use coerce::DATE_FORMAT;

mod shape;
pub use shape::{Bound, FieldDescriptor, FieldKind, RecordShape, RecordShapeBuilder};

mod source;
pub use source::{FormSource, JsonSource, Raw, Source, SourceError};

/// A record type with a statically known shape.
pub trait Bindable: Default + Sized + 'static {
    /// The shape describing this record's fields.
    fn shape() -> &'static RecordShape<Self>;
}

/// Binds a source into a new record.
///
/// # Errors
///
/// Returns the first error encountered while binding; see
/// [`RecordShape::bind`].
pub fn bind<T: Bindable, S: Source + ?Sized>(source: &S) -> Result<T, Error> {
    T::shape().build(source)
}

/// Decodes a URL-encoded form body and binds it into a new record.
///
/// # Errors
///
/// Returns [`Error::Source`] if the body cannot be decoded, otherwise the first
/// binding error.
#[instrument(level = "debug", skip_all, fields(bytes = body.len()))]
pub fn bind_form<T: Bindable>(body: &str) -> Result<T, Error> {
    let source = FormSource::parse(body)?;
    bind(&source)
}

/// Decodes a JSON object body and binds it into a new record.
///
/// # Errors
///
/// Returns [`Error::Source`] if the body is not a JSON object, otherwise the
/// first binding error.
#[instrument(level = "debug", skip_all, fields(bytes = body.len()))]
pub fn bind_json<T: Bindable>(body: &[u8]) -> Result<T, Error> {
    let source = JsonSource::parse(body)?;
    bind(&source)
}

/// Errors that can occur while binding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field's annotation could not be parsed.
    #[error("invalid annotation on field '{field}'")]
    Annotation {
        /// The field name.
        field: String,
        /// The parse error.
        source: annotation::Error,
    },

    /// A required field is absent or empty in the source.
    #[error("missing or empty required field '{0}'")]
    RequiredFieldMissing(String),

    /// A value cannot be narrowed to its field's kind.
    #[error("cannot convert {value} to {kind} for field '{field}'")]
    TypeCoercion {
        /// The field name.
        field: String,
        /// The destination kind.
        kind: FieldKind,
        /// The raw value.
        value: String,
    },

    /// A value was rejected by a validation rule.
    #[error("invalid value {value} for field '{field}': failed rule '{rule}'")]
    ValidationFailed {
        /// The field name.
        field: String,
        /// The candidate value.
        value: String,
        /// The first rule that rejected the value.
        rule: RuleSpec,
    },

    /// A destination field kind is not recognised.
    #[error("unsupported field kind '{0}'")]
    UnsupportedFieldKind(String),

    /// The source body could not be decoded.
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::LazyLock};

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::validation::RuleError;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Target {
        text: String,
        number: i64,
        floaty: f64,
        date: Option<DateTime<Utc>>,
    }

    impl Bindable for Target {
        fn shape() -> &'static RecordShape<Self> {
            static SHAPE: LazyLock<RecordShape<Target>> = LazyLock::new(|| {
                RecordShape::builder()
                    .text(
                        "text",
                        r#"source:"test" validate:"length=4-10""#,
                        |target: &mut Target, value| target.text = value,
                    )
                    .integer(
                        "number",
                        r#"source:"number" validate:"range=0-10""#,
                        |target: &mut Target, value| target.number = value,
                    )
                    .float("floaty", r#"source:"floaty""#, |target: &mut Target, value| {
                        target.floaty = value;
                    })
                    .date("date", r#"source:"date""#, |target: &mut Target, value| {
                        target.date = Some(value);
                    })
                    .build()
            });
            &SHAPE
        }
    }

    fn expected_target() -> Target {
        Target {
            text: "test".to_string(),
            number: 2,
            floaty: 1.2,
            date: Some(Utc.with_ymd_and_hms(2020, 6, 30, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn bind_form_end_to_end() {
        let target: Target =
            bind_form("test=test&number=2&floaty=1.2&date=2020-06-30").unwrap();
        assert_eq!(target, expected_target());
    }

    #[test]
    fn bind_json_end_to_end() {
        let target: Target = bind_json(
            br#"{"test": "test", "number": 2, "floaty": 1.2, "date": "2020-06-30"}"#,
        )
        .unwrap();
        assert_eq!(target, expected_target());
    }

    #[test]
    fn bind_from_map() {
        let source = HashMap::from([
            ("test".to_string(), "test".to_string()),
            ("number".to_string(), "2".to_string()),
            ("floaty".to_string(), "1.2".to_string()),
            ("date".to_string(), "2020-06-30".to_string()),
        ]);
        let target: Target = bind(&source).unwrap();
        assert_eq!(target, expected_target());
    }

    #[test]
    fn json_integers_are_narrowed() {
        let target: Target = bind_json(br#"{"test": "test", "number": 4.0}"#).unwrap();
        assert_eq!(target.number, 4);

        let error = bind_json::<Target>(br#"{"test": "test", "number": 4.5}"#).unwrap_err();
        assert!(matches!(
            error,
            Error::TypeCoercion {
                kind: FieldKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let target: Target = bind_form("test=test").unwrap();
        assert_eq!(
            target,
            Target {
                text: "test".to_string(),
                ..Target::default()
            }
        );

        let target: Target = bind_json(br#"{"test": "test", "number": null}"#).unwrap();
        assert_eq!(target.number, 0);
    }

    #[test]
    fn validation_failure_reports_rule() {
        let error = bind_form::<Target>("test=abc").unwrap_err();
        match error {
            Error::ValidationFailed { field, value, rule } => {
                assert_eq!(field, "text");
                assert_eq!(value, "'abc'");
                assert_eq!(rule, RuleSpec::Length { min: 4, max: 10 });
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            bind_form::<Target>("test=test&number=11"),
            Err(Error::ValidationFailed { .. })
        ));
    }

    #[test]
    fn coercion_failures() {
        assert!(matches!(
            bind_form::<Target>("test=test&number=two"),
            Err(Error::TypeCoercion {
                kind: FieldKind::Integer,
                ..
            })
        ));
        assert!(matches!(
            bind_form::<Target>("test=test&floaty=x"),
            Err(Error::TypeCoercion {
                kind: FieldKind::Float,
                ..
            })
        ));
        assert!(matches!(
            bind_form::<Target>("test=test&date=30-06-2020"),
            Err(Error::TypeCoercion {
                kind: FieldKind::Date,
                ..
            })
        ));
        assert!(matches!(
            bind_json::<Target>(br#"{"test": 5}"#),
            Err(Error::TypeCoercion {
                kind: FieldKind::Text,
                ..
            })
        ));
        assert!(matches!(
            bind_json::<Target>(br#"{"test": "test", "number": "2"}"#),
            Err(Error::TypeCoercion {
                kind: FieldKind::Integer,
                ..
            })
        ));
    }

    #[test]
    fn malformed_bodies() {
        assert!(matches!(
            bind_json::<Target>(b"[]"),
            Err(Error::Source(SourceError::NotAnObject(_)))
        ));
        assert!(matches!(
            bind_json::<Target>(b"{"),
            Err(Error::Source(SourceError::Json(_)))
        ));
    }

    #[derive(Debug, Default)]
    struct Counted {
        email: String,
    }

    #[test]
    fn required_is_checked_before_rules() {
        // `length=10-1` rejects every input.
        let shape: RecordShape<Counted> = RecordShape::builder()
            .text(
                "email",
                r#"source:"mail" required validate:"length=10-1""#,
                |record: &mut Counted, value| record.email = value,
            )
            .build();

        for body in ["", "mail=", "other=x"] {
            let source = FormSource::parse(body).unwrap();
            let error = shape.build(&source).unwrap_err();
            assert!(
                matches!(&error, Error::RequiredFieldMissing(key) if key == "mail"),
                "unexpected error for {body:?}: {error}"
            );
        }

        let source = FormSource::parse("mail=someone@example.com").unwrap();
        assert!(matches!(
            shape.build(&source),
            Err(Error::ValidationFailed { .. })
        ));
    }

    #[test]
    fn field_name_is_default_source_key() {
        let shape: RecordShape<Counted> = RecordShape::builder()
            .text("email", "required", |record: &mut Counted, value| {
                record.email = value;
            })
            .build();

        let source = FormSource::parse("email=a%40b.c").unwrap();
        assert_eq!(shape.build(&source).unwrap().email, "a@b.c");
    }

    #[test]
    fn annotation_errors_name_the_field() {
        let shape: RecordShape<Counted> = RecordShape::builder()
            .text(
                "email",
                r#"validate:"honk=12""#,
                |record: &mut Counted, value| record.email = value,
            )
            .build();

        let error = shape.build(&FormSource::default()).unwrap_err();
        match error {
            Error::Annotation { field, source } => {
                assert_eq!(field, "email");
                assert_eq!(
                    source,
                    annotation::Error::Rule(RuleError::UnknownRule("honk".to_string()))
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_bind_leaves_target_unchanged() {
        let mut target = Target {
            text: "before".to_string(),
            ..Target::default()
        };
        let source = FormSource::parse("test=changed&number=99&floaty=2.5").unwrap();

        let error = Target::shape().bind(&mut target, &source).unwrap_err();

        assert!(matches!(error, Error::ValidationFailed { ref field, .. } if field == "number"));
        assert_eq!(
            target,
            Target {
                text: "before".to_string(),
                ..Target::default()
            }
        );
    }

    #[test]
    fn successful_bind_keeps_unbound_fields() {
        let mut target = Target {
            floaty: 9.5,
            ..Target::default()
        };
        let source = FormSource::parse("test=changed&number=3").unwrap();

        Target::shape().bind(&mut target, &source).unwrap();

        assert_eq!(target.text, "changed");
        assert_eq!(target.number, 3);
        assert!((target.floaty - 9.5).abs() < f64::EPSILON);
        assert_eq!(target.date, None);
    }

    #[test]
    fn bind_all_preserves_order() {
        let sources: Vec<FormSource> = ["test=first", "test=x", "test=third&number=3"]
            .into_iter()
            .map(|body| FormSource::parse(body).unwrap())
            .collect();

        let results = Target::shape().bind_all(&sources);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().text, "first");
        assert!(matches!(results[1], Err(Error::ValidationFailed { .. })));
        assert_eq!(results[2].as_ref().unwrap().number, 3);
    }

    #[test]
    fn field_kind_names() {
        for kind in [
            FieldKind::Text,
            FieldKind::Integer,
            FieldKind::Float,
            FieldKind::Date,
        ] {
            assert_eq!(kind.name().parse::<FieldKind>().unwrap(), kind);
        }
        assert!(matches!(
            "boolean".parse::<FieldKind>(),
            Err(Error::UnsupportedFieldKind(kind)) if kind == "boolean"
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::RequiredFieldMissing("email".to_string()).to_string(),
            "missing or empty required field 'email'"
        );
        let error = bind_form::<Target>("test=test&number=two").unwrap_err();
        assert_eq!(
            error.to_string(),
            "cannot convert 'two' to integer for field 'number'"
        );
    }
}
