//! Field annotations.
//!
//! An annotation is a short declarative string attached to a record field:
//!
//! ```text
//! source:"email" required validate:"length=1-255"
//! ```
//!
//! It is made of qualifiers, each either bare (`required`) or carrying a quoted
//! payload (`source:"email"`). Parsing an annotation yields a [`FieldSpec`].

mod field_spec;
pub use field_spec::{Error, FieldSpec};

/// Qualifier tokenization.
pub mod qualifier;
pub use qualifier::{Qualifier, Qualifiers, tokenize};
