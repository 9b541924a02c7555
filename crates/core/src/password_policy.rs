//! Password policy and strength estimation.
//!
//! Two related but deliberately different rules live here:
//!
//! - [`validate_password`] is the server-side floor enforced on registration
//!   and password change: at least [`MIN_PASSWORD_LENGTH`] characters with a
//!   lowercase letter, an uppercase letter and a digit.
//! - [`password_strength`] is the advisory meter shown while typing. It also
//!   rewards special characters, which the floor does not require.

use serde::Serialize;

use crate::error::AuthError;

/// Minimum number of characters in an accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters counted as "special" by the strength meter.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Check a password against the server-side policy.
///
/// Rules are evaluated in a fixed order and the first violation is reported.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let checks = StrengthChecks::evaluate(password);

    if !checks.length {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if !checks.lowercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one lowercase letter".into(),
        ));
    }
    if !checks.uppercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter".into(),
        ));
    }
    if !checks.numbers {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one digit".into(),
        ));
    }
    Ok(())
}

/// Individual criteria of the strength meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthChecks {
    pub length: bool,
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub special: bool,
}

impl StrengthChecks {
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            numbers: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        }
    }

    /// Number of satisfied criteria (0..=5).
    pub fn score(&self) -> u8 {
        [
            self.length,
            self.lowercase,
            self.uppercase,
            self.numbers,
            self.special,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Weak = 1,
    Fair = 2,
    Good = 3,
    Strong = 4,
}

impl StrengthLevel {
    /// Map a meter score to a level: `clamp(score - 1, 1, 4)`.
    fn from_score(score: u8) -> Self {
        match score.saturating_sub(1).clamp(1, 4) {
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            _ => Self::Strong,
        }
    }
}

/// Result of [`password_strength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub level: StrengthLevel,
    pub checks: StrengthChecks,
}

/// Estimate how strong a password is. Advisory only.
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = StrengthChecks::evaluate(password);
    PasswordStrength {
        level: StrengthLevel::from_score(checks.score()),
        checks,
    }
}
