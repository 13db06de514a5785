use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

use crate::task::ValidationError;

/// Identifier of a task: a positive integer issued from the store counter.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TaskId(u64);

impl TaskId {
    /// First identifier handed out by an empty store.
    pub const FIRST: Self = Self(1);

    /// Largest identifier, `2^53 - 1`, so ids stay exact as JSON numbers in any reader.
    pub const MAX: Self = Self((1 << 53) - 1);

    /// Wrap a raw value in `1..=MAX`.
    ///
    /// # Errors
    /// Returns [`ValidationError::ZeroId`] when `raw` is zero and
    /// [`ValidationError::IdOutOfRange`] when it exceeds [`TaskId::MAX`].
    pub const fn new(raw: u64) -> Result<Self, ValidationError> {
        if raw == 0 {
            return Err(ValidationError::ZeroId);
        }
        if raw > Self::MAX.0 {
            return Err(ValidationError::IdOutOfRange(raw));
        }
        Ok(Self(raw))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Identifier immediately after this one, or `None` past [`TaskId::MAX`].
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 >= Self::MAX.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<u64> for TaskId {
    type Error = ValidationError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Error produced when parsing a [`TaskId`] from user input.
#[derive(Debug, thiserror::Error)]
pub enum TaskIdParseError {
    /// Input is not an unsigned integer.
    #[error("invalid task id: {0}")]
    NotANumber(#[from] ParseIntError),
    /// Input parsed but is not a valid identifier.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse()?;
        Ok(Self::new(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(TaskId::new(0), Err(ValidationError::ZeroId)));
        assert!("0".parse::<TaskId>().is_err());
    }

    #[test]
    fn parses_and_advances() {
        let id: TaskId = " 41 ".parse().unwrap_or_else(|err| panic!("must parse: {err}"));
        assert_eq!(id.get(), 41);
        assert_eq!(id.next().map(TaskId::get), Some(42));
        assert_eq!(TaskId::default(), TaskId::FIRST);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&TaskId::FIRST.next())
            .unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json, "2");
        assert!(serde_json::from_str::<TaskId>("0").is_err());
        assert!(serde_json::from_str::<TaskId>("\"3\"").is_err());
    }

    #[test]
    fn ids_stop_at_max() {
        assert_eq!(TaskId::MAX.get(), 9_007_199_254_740_991);
        assert!(TaskId::MAX.next().is_none());
        assert_eq!(
            TaskId::new(TaskId::MAX.get() + 1),
            Err(ValidationError::IdOutOfRange(9_007_199_254_740_992))
        );
        assert!(serde_json::from_str::<TaskId>("18446744073709551615").is_err());
        assert!("18446744073709551615".parse::<TaskId>().is_err());
    }
}
