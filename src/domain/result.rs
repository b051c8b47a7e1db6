//! Result type alias for PHI Guard

use super::errors::PhiGuardError;

/// Result type alias for PHI Guard operations
///
/// # Examples
///
/// ```
/// use phi_guard::domain::result::Result;
/// use phi_guard::domain::errors::PhiGuardError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PhiGuardError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PhiGuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PhiGuardError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(PhiGuardError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
