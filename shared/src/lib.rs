//! Wire types shared by the portal backend and its clients.
//!
//! Every request and response body of the HTTP API lives here, so both sides
//! of the wire agree on field names and encodings.

pub mod account;
pub mod content;
pub mod course;
pub mod election;
pub mod stats;
pub mod upload;

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// A plain acknowledgement body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub error: String,
}

/// Deserializes an optional query value, treating an empty one as absent.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.is_empty() => {
            value.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}
