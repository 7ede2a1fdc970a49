//! Declarative Field Binding
//!
//! Record fields carry annotations such as
//! `source:"email" required validate:"length=3-255"`. Binding walks a
//! record's fields, pulls each value from form or JSON input, coerces it to
//! the field's kind and checks it against the annotated rules.

pub mod annotation;
pub use annotation::FieldSpec;

pub mod validation;
pub use validation::{RuleSpec, Validator, Value};

pub mod binding;
pub use binding::{Bindable, RecordShape, bind_form, bind_json};

/// Record shapes declared in TOML files, bound into dynamic records.
pub mod schema;
pub use schema::{DynamicRecord, Schema};
