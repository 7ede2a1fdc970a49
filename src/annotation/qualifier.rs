use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-z]+)(?::"([^"]*)")?"#).expect("this must never fail"));

/// A single qualifier within an annotation, such as `required` or
/// `source:"email"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualifier<'a> {
    name: &'a str,
    payload: Option<&'a str>,
}

impl<'a> Qualifier<'a> {
    /// The qualifier name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// The quoted payload, without its quotes, if one was given.
    #[must_use]
    pub const fn payload(&self) -> Option<&'a str> {
        self.payload
    }

    /// Returns `true` if the qualifier carries a payload.
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

/// Lazy iterator over the qualifiers of an annotation.
///
/// Created by [`tokenize`].
#[derive(Debug)]
pub struct Qualifiers<'a> {
    captures: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for Qualifiers<'a> {
    type Item = Qualifier<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let captures = self.captures.next()?;
        let qualifier = Qualifier {
            name: captures.get(1)?.as_str(),
            payload: captures.get(2).map(|payload| payload.as_str()),
        };
        tracing::trace!(
            qualifier = qualifier.name,
            payload = ?qualifier.payload,
            "found qualifier"
        );
        Some(qualifier)
    }
}

/// Splits an annotation into its qualifiers, in order of appearance.
///
/// Qualifier names are runs of lowercase ASCII letters, optionally followed by
/// `:"payload"`. Anything between qualifiers is treated as a separator.
/// Embedded quotes cannot be escaped: a payload ends at the next `"`.
///
/// ```
/// use fieldbind::annotation::tokenize;
///
/// let names: Vec<_> = tokenize(r#"source:"email" required"#)
///     .map(|qualifier| (qualifier.name(), qualifier.payload()))
///     .collect();
///
/// assert_eq!(names, [("source", Some("email")), ("required", None)]);
/// ```
#[must_use]
pub fn tokenize(annotation: &str) -> Qualifiers<'_> {
    Qualifiers {
        captures: QUALIFIER.captures_iter(annotation),
    }
}
