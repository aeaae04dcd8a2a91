use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ElectionKind, ElectionStatus, Position};

/// Payload of creating an election or replacing one.
///
/// Positions and candidates sent without an id are given one.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDescriptor {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ElectionStatus,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub election_type: ElectionKind,
    #[serde(default)]
    pub target_level: u16,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VoteReq {
    pub election_id: String,
    pub position_id: String,
    pub candidate_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReq {
    pub is_open: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeclareWinnerReq {
    pub position_id: String,
    pub candidate_id: String,
}
