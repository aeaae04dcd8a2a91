use serde::{Deserialize, Serialize};

use crate::account::Level;

/// Fields a content listing can be sorted by.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    CourseCode,
    Level,
    Year,
    DownloadCount,
}

impl SortField {
    /// The stored field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Title => "title",
            SortField::CourseCode => "courseCode",
            SortField::Level => "level",
            SortField::Year => "year",
            SortField::DownloadCount => "downloadCount",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of content listings.
///
/// Every filter is optional and an empty value counts as absent. An empty
/// query lists everything sorted by creation time, newest first.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::empty_as_none"
    )]
    pub course: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::empty_as_none"
    )]
    pub course_code: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::empty_as_none"
    )]
    pub level: Option<Level>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::empty_as_none"
    )]
    pub semester: Option<String>,
    /// Case-insensitive text matched literally against titles and descriptions.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::empty_as_none"
    )]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteReq {
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
    #[serde(default)]
    pub uploader_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePastQuestionReq {
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
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateAnnouncementReq {
    pub title: String,
    pub content: String,
}
