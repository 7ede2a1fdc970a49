use super::{Predicate, RuleError, RuleSpec, Value, rule};

/// An ordered set of predicates applied as a logical AND.
///
/// Evaluation stops at the first predicate that rejects the candidate. A
/// validator with no predicates accepts everything.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    predicates: Vec<Predicate>,
}

impl Validator {
    /// Creates a validator from compiled predicates, kept in the given order.
    #[must_use]
    pub const fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Compiles a validator from a comma-separated rule list.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule list cannot be parsed.
    pub fn parse(payload: &str) -> Result<Self, RuleError> {
        rule::compile(payload).map(Self::new)
    }

    /// Returns `true` if every predicate accepts the candidate.
    #[must_use]
    pub fn validate(&self, candidate: &Value) -> bool {
        self.first_failure(candidate).is_none()
    }

    /// Returns the first rule that rejects the candidate, if any.
    ///
    /// Later predicates are not evaluated once one has failed.
    #[must_use]
    pub fn first_failure(&self, candidate: &Value) -> Option<RuleSpec> {
        self.predicates
            .iter()
            .find(|predicate| !predicate.test(candidate))
            .map(Predicate::rule)
    }

    /// The number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns `true` if there are no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl FromIterator<Predicate> for Validator {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a RuleSpec> for Validator {
    fn from_iter<I: IntoIterator<Item = &'a RuleSpec>>(iter: I) -> Self {
        iter.into_iter().copied().map(RuleSpec::compile).collect()
    }
}
