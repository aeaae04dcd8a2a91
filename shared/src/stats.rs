use serde::{Deserialize, Serialize};

use crate::election::Position;

/// The admin dashboard aggregate.
///
/// Every figure falls back to zero (or an empty list) on its own
/// when the query behind it fails.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_notes: u64,
    pub total_downloads: u64,
    pub total_users: u64,
    pub active_elections: u64,
    pub recent_notes: Vec<PopularNote>,
    pub active_elections_list: Vec<ActiveElection>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopularNote {
    pub id: String,
    pub title: String,
    pub course_code: String,
    pub download_count: u64,
}

/// An open election with the number of votes cast in it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveElection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    pub vote_count: u64,
}
