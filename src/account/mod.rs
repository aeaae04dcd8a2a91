//! Accounts, password hashes and password-reset passcodes.

pub mod mail;

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use portal_shared::account::{handle::RegisterReq, Level, Role, User};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha256::digest;

use crate::{store, Error};

/// Minimum length of a password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A stored account.
///
/// Never handed to clients as is, see [`Account::view`].
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_number: String,
    #[serde(default)]
    pub phone_number: String,
    pub password: PasswordHash,
    pub role: Role,
    pub level: Level,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account from a registration request.
    ///
    /// The role is derived from the matriculation number.
    pub fn register(req: RegisterReq, now: DateTime<Utc>) -> Result<Self, Error> {
        for (field, value) in [
            ("firstName", &req.first_name),
            ("lastName", &req.last_name),
            ("matricNumber", &req.matric_number),
            ("phoneNumber", &req.phone_number),
        ] {
            if value.trim().is_empty() {
                return Err(Error::MalformedRequest(format!("{field} is required")));
            }
        }
        check_password(&req.password)?;

        Ok(Self {
            id: store::new_id(),
            role: Role::from_matric_number(&req.matric_number),
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email.to_string(),
            matric_number: req.matric_number,
            phone_number: req.phone_number,
            password: PasswordHash::new(&req.password),
            level: req.level,
            profile_picture: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The client-facing view of this account.
    pub fn view(&self) -> User {
        User {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            matric_number: self.matric_number.clone(),
            phone_number: self.phone_number.clone(),
            role: self.role,
            level: self.level,
            profile_picture: self.profile_picture.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`].
#[inline]
pub fn check_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(Error::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// A salted SHA-256 password hash, stored as `sha256$<salt>$<hex digest>`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    const SCHEME: &'static str = "sha256";
    const SALT_LEN: usize = 16;

    pub fn new(password: &str) -> Self {
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::SALT_LEN)
            .map(char::from)
            .collect();
        Self::with_salt(&salt, password)
    }

    fn with_salt(salt: &str, password: &str) -> Self {
        Self(format!(
            "{}${salt}${}",
            Self::SCHEME,
            digest(format!("{salt}{password}"))
        ))
    }

    /// Whether `password` hashes to this.
    pub fn matches(&self, password: &str) -> bool {
        let mut parts = self.0.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Self::SCHEME), Some(salt), Some(_)) => Self::with_salt(salt, password) == *self,
            _ => false,
        }
    }
}

/// A six-digit one-time passcode.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(into = "String", try_from = "String")]
pub struct Passcode(u32);

impl Passcode {
    const DIGITS: usize = 6;

    /// Creates a new passcode randomly.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self(rng.gen_range(0..1000000))
    }
}

impl Default for Passcode {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Passcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = Self::DIGITS)
    }
}

impl FromStr for Passcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::PasscodeInvalid);
        }
        s.parse().map(Self).map_err(|_| Error::PasscodeInvalid)
    }
}

impl TryFrom<String> for Passcode {
    type Error = Error;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Passcode> for String {
    #[inline]
    fn from(value: Passcode) -> Self {
        value.to_string()
    }
}

/// A passcode issued to an email for resetting its password.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasscodeRecord {
    pub id: String,
    pub email: String,
    pub otp: Passcode,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl PasscodeRecord {
    /// Minutes a passcode stays valid.
    pub const LIFETIME_MINUTES: i64 = 5;

    /// Issues a fresh passcode to `email`.
    pub fn issue(email: String, now: DateTime<Utc>) -> Self {
        Self {
            id: store::new_id(),
            email,
            otp: Passcode::new(),
            expires_at: now + Duration::minutes(Self::LIFETIME_MINUTES),
            created_at: now,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
