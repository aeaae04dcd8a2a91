pub mod handle;

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of an account.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    /// The matriculation number prefix granting the admin role.
    pub const ADMIN_PREFIX: &'static str = "admin";

    /// Derives the role of a registering account from its matriculation number.
    #[inline]
    pub fn from_matric_number(matric_number: &str) -> Self {
        if matric_number.starts_with(Self::ADMIN_PREFIX) {
            Self::Admin
        } else {
            Self::Student
        }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl Display for Role {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An academic level (year cohort).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u16", into = "u16")]
pub struct Level(pub(crate) u16);

impl Level {
    pub const ALL: [Level; 4] = [Level(100), Level(200), Level(300), Level(400)];

    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }
}

/// Error of converting an integer that is not a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLevel(pub u16);

impl Display for InvalidLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid level {}, expected one of 100, 200, 300, 400", self.0)
    }
}

impl std::error::Error for InvalidLevel {}

impl TryFrom<u16> for Level {
    type Error = InvalidLevel;

    #[inline]
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if Self::ALL.iter().any(|l| l.0 == value) {
            Ok(Self(value))
        } else {
            Err(InvalidLevel(value))
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .parse()
            .map_err(|_| ParseLevelError::NotANumber(s.to_owned()))?;
        Ok(Self::try_from(value)?)
    }
}

/// Error of parsing a level from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseLevelError {
    NotANumber(String),
    Invalid(InvalidLevel),
}

impl From<InvalidLevel> for ParseLevelError {
    #[inline]
    fn from(value: InvalidLevel) -> Self {
        Self::Invalid(value)
    }
}

impl Display for ParseLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseLevelError::NotANumber(s) => write!(f, "level {s:?} is not a number"),
            ParseLevelError::Invalid(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseLevelError {}

impl From<Level> for u16 {
    #[inline]
    fn from(value: Level) -> Self {
        value.0
    }
}

impl Display for Level {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The client-facing view of an account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_number: String,
    #[serde(default)]
    pub phone_number: String,
    pub role: Role,
    pub level: Level,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}
