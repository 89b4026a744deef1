//! Optimistic concurrency expectation for record writes.

use crate::error::{DomainError, DomainResult};

/// What the writer believes the stored `updatedAt` currently is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedRevision {
    /// Skip the check (last writer wins).
    Any,
    /// Require the stored record to still carry this `updatedAt`.
    UpdatedAt(i64),
}

impl ExpectedRevision {
    pub fn matches(self, actual: i64) -> bool {
        match self {
            ExpectedRevision::Any => true,
            ExpectedRevision::UpdatedAt(expected) => expected == actual,
        }
    }

    pub fn check(self, actual: i64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        assert!(ExpectedRevision::Any.matches(0));
        assert!(ExpectedRevision::Any.check(1_700_000_000_000).is_ok());
    }

    #[test]
    fn stale_revision_is_a_conflict() {
        let err = ExpectedRevision::UpdatedAt(10).check(11).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(ExpectedRevision::UpdatedAt(10).check(10).is_ok());
    }
}
