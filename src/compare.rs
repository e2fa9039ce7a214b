/// Outcome of testing a decoded value against a predicate.
///
/// Both variants carry the decoded value, so the caller can branch on the
/// outcome with `match` instead of passing callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison<T> {
    /// The predicate held for the value.
    Matched(T),
    /// The predicate did not hold for the value.
    NotMatched(T),
}

impl<T> Comparison<T> {
    /// Tests `value` against `predicate`.
    pub fn from_predicate<P>(value: T, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        if predicate(&value) {
            Self::Matched(value)
        } else {
            Self::NotMatched(value)
        }
    }

    /// Returns `true` if the predicate held.
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns a reference to the decoded value, whichever the outcome.
    #[inline]
    pub fn value(&self) -> &T {
        match self {
            Self::Matched(value) | Self::NotMatched(value) => value,
        }
    }

    /// Consumes the outcome, returning the decoded value.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Self::Matched(value) | Self::NotMatched(value) => value,
        }
    }

    /// Invokes exactly one of the two closures with the decoded value.
    pub fn branch<R, M, N>(self, on_match: M, on_mismatch: N) -> R
    where
        M: FnOnce(T) -> R,
        N: FnOnce(T) -> R,
    {
        match self {
            Self::Matched(value) => on_match(value),
            Self::NotMatched(value) => on_mismatch(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_predicate() {
        assert_eq!(Comparison::from_predicate(5, |v| *v > 3), Comparison::Matched(5));
        assert_eq!(Comparison::from_predicate(2, |v| *v > 3), Comparison::NotMatched(2));
    }

    #[test]
    fn test_value_accessors() {
        let matched = Comparison::Matched('a');
        let not_matched = Comparison::NotMatched('b');

        assert!(matched.is_match());
        assert!(!not_matched.is_match());
        assert_eq!(*matched.value(), 'a');
        assert_eq!(not_matched.into_inner(), 'b');
    }

    #[test]
    fn test_branch_fires_exactly_one_side() {
        let (mut on_match, mut on_mismatch) = (0, 0);
        Comparison::Matched(1).branch(|_| on_match += 1, |_| on_mismatch += 1);
        assert_eq!((on_match, on_mismatch), (1, 0));

        let (mut on_match, mut on_mismatch) = (0, 0);
        Comparison::NotMatched(1).branch(|_| on_match += 1, |_| on_mismatch += 1);
        assert_eq!((on_match, on_mismatch), (0, 1));
    }

    #[test]
    fn test_branch_returns_closure_result() {
        let label = Comparison::NotMatched(7).branch(|v| v * 2, |v| v * 3);
        assert_eq!(label, 21);
    }
}
