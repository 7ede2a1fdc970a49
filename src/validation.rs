//! Validation rules and their execution.
//!
//! A `validate` payload such as `length=1-255,string` is parsed into an ordered
//! list of [`RuleSpec`]s. Each rule compiles into a [`Predicate`] over a
//! candidate [`Value`], and a [`Validator`] runs them in order, stopping at the
//! first rejection.

/// Rule parsing and compilation.
pub mod rule;
pub use rule::{Predicate, RuleError, RuleSpec, compile, parse_rules};

mod validator;
pub use validator::Validator;

mod value;
pub use value::Value;
