//! Student identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`StudentId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum StudentIdError {
    /// The input string is empty or whitespace-only.
    #[error("student id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("student id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A student identifier, supplied by the user at checkout.
///
/// ## Constraints
///
/// - Must contain at least one non-whitespace character
/// - Length: at most 64 characters after trimming
///
/// Surrounding whitespace is stripped on parse.
///
/// ## Examples
///
/// ```
/// use ezfood_core::StudentId;
///
/// assert_eq!(StudentId::parse("  s1234 ").unwrap().as_str(), "s1234");
/// assert!(StudentId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Maximum length of a student identifier.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `StudentId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, StudentIdError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(StudentIdError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(StudentIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
