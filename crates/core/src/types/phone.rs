//! Phone number type.
//!
//! Phone numbers are the login identity on the Tunda marketplace, so they get
//! the same validated-newtype treatment an email address would.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character other than digits or a leading +.
    #[error("phone number may only contain digits and a leading +")]
    InvalidCharacter,
    /// The digit count is outside the accepted range.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A subscriber phone number.
///
/// Accepts local Kenyan forms (`0712345678`) and international forms
/// (`+254712345678`). Only structural validation is done here; whether the
/// number is reachable is the backend's problem.
///
/// ## Constraints
///
/// - Length: at most 20 characters (backend column limit)
/// - Optional leading `+`, digits everywhere else
/// - 9 to 15 digits (ITU-T E.164 ceiling)
///
/// ## Examples
///
/// ```
/// use tunda_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("+254712345678").is_ok());
/// assert!(PhoneNumber::parse("0712345678").is_ok());
///
/// assert!(PhoneNumber::parse("").is_err());         // empty
/// assert!(PhoneNumber::parse("07-12-34").is_err()); // punctuation
/// assert!(PhoneNumber::parse("12345").is_err());    // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum length of a phone number string (backend column limit).
    pub const MAX_LENGTH: usize = 20;

    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 9;

    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 20 characters
    /// - Contains anything other than digits and a leading `+`
    /// - Has fewer than 9 or more than 15 digits
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacter);
        }

        if digits.len() < Self::MIN_DIGITS || digits.len() > Self::MAX_DIGITS {
            return Err(PhoneNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
