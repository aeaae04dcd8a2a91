pub mod handle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an election.
///
/// Moved only by the open/close toggle, never by the date window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    #[default]
    Upcoming,
    #[serde(alias = "active")]
    Open,
    Closed,
}

impl ElectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionStatus::Upcoming => "upcoming",
            ElectionStatus::Open => "open",
            ElectionStatus::Closed => "closed",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ElectionKind {
    #[default]
    General,
    LevelBased,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ElectionStatus,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub election_type: ElectionKind,
    /// Zero for general elections.
    #[serde(default)]
    pub target_level: u16,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Election {
    /// Finds a candidate of the given position.
    pub fn candidate(&self, position: &str, candidate: &str) -> Option<&Candidate> {
        self.positions
            .iter()
            .find(|p| p.id == position)?
            .candidates
            .iter()
            .find(|c| c.id == candidate)
    }
}

/// A contestable role of an election.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Zero means all levels.
    #[serde(default)]
    pub level: u16,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub level: u16,
    #[serde(default)]
    pub matric_number: String,
    #[serde(default)]
    pub manifesto: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_winner: bool,
    #[serde(default)]
    pub vote_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub election_id: String,
    pub position_id: String,
    pub candidate_id: String,
    pub user_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub voted_at: DateTime<Utc>,
}

/// Vote count of a candidate of a position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub position_id: String,
    pub candidate_id: String,
    pub count: u64,
}
