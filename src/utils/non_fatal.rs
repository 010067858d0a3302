use crate::error::AppResult;

/// Outcome of a step whose failure must not abort the surrounding operation
/// (audit log writes, role mirroring, payment customer lookup).
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum NonFatal<T> {
    Applied(T),
    Skipped { reason: String },
}

impl<T> NonFatal<T> {
    /// Turns a fallible result into a tolerated one, logging the failure.
    pub fn tolerate(context: &str, result: AppResult<T>) -> Self {
        match result {
            Ok(value) => NonFatal::Applied(value),
            Err(e) => {
                log::warn!("{context} failed, continuing: {e}");
                NonFatal::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, NonFatal::Applied(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            NonFatal::Applied(value) => Some(value),
            NonFatal::Skipped { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_tolerate_keeps_value() {
        let outcome = NonFatal::tolerate("lookup", Ok::<_, AppError>(7));
        assert!(outcome.is_applied());
        assert_eq!(outcome.ok(), Some(7));
    }

    #[test]
    fn test_tolerate_records_reason() {
        let outcome: NonFatal<()> = NonFatal::tolerate(
            "audit log",
            Err(AppError::InternalError("disk full".to_string())),
        );
        match outcome {
            NonFatal::Skipped { reason } => assert!(reason.contains("disk full")),
            NonFatal::Applied(_) => panic!("expected skipped"),
        }
    }
}
