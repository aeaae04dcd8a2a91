pub mod handle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Level;

/// Study notes of a course.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub course: String,
    pub course_code: String,
    pub level: Level,
    pub semester: String,
    #[serde(default)]
    pub lecturer: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// Account id of the uploader.
    pub uploaded_by: String,
    #[serde(default)]
    pub uploader_name: String,
    #[serde(default)]
    pub download_count: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// A past exam question paper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PastQuestion {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub course: String,
    pub course_code: String,
    pub level: Level,
    pub semester: String,
    pub year: u16,
    pub file_url: String,
    pub file_name: String,
    pub uploaded_by: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_by: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// An audit record of a note being downloaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteDownload {
    pub id: String,
    pub note_id: String,
    pub user_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub download_at: DateTime<Utc>,
}
