use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub const UNKNOWN_PARTICIPANT: &str = "Unknown";
pub const PRIVATE_OR_INVALID_PROFILE: &str = "Private or Invalid Profile";

/// One roster row. Malformed rows are kept with placeholder values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub profile_url: String,
}

/// What was scraped from one participant's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreRecord {
    pub badge_count: u32,
    // 0 or 1, never a count
    pub arcade_complete: u8,
    pub error: Option<String>,
}

/// Participant joined with its score. Rank is the row position and is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub name: String,
    pub badge_count: u32,
    pub arcade_complete: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Participant {
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Participant {
            name: name.into(),
            profile_url: profile_url.into(),
        }
    }
}

impl ScoreRecord {
    /// Score of a profile that could not be read. Counts stay at zero.
    pub fn failed(reason: impl Into<String>) -> Self {
        ScoreRecord {
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn private_or_invalid() -> Self {
        ScoreRecord::failed(PRIVATE_OR_INVALID_PROFILE)
    }
}

/// Join participants with their scores by position and rank them by badge count,
/// highest first. Equal badge counts keep roster order.
pub fn assemble(participants: Vec<Participant>, scores: Vec<ScoreRecord>) -> Vec<LeaderboardRow> {
    debug_assert_eq!(participants.len(), scores.len());

    participants
        .into_iter()
        .zip(scores)
        .map(|(participant, score)| LeaderboardRow {
            name: participant.name,
            badge_count: score.badge_count,
            arcade_complete: score.arcade_complete,
            error: score.error,
        })
        // sorted_by_key is a stable sort, ties stay in roster order
        .sorted_by_key(|row| Reverse(row.badge_count))
        .collect()
}
