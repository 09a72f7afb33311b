use chrono::{DateTime, Utc};
use rating_party_core::{RatingEntry, RosterEntry, Scores, WineInfo};
use sqlx::FromRow;
use uuid::Uuid;

/// A rating party
#[derive(Debug, Clone, FromRow)]
pub struct GameData {
    pub id: Uuid,
    pub name: String,
    /// The short code participants join with, stable for the lifetime of the game
    pub code: String,
    pub is_running: bool,
    /// Whether the host has revealed the results to the participants
    pub results_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Someone who joined a game
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantData {
    pub id: Uuid,
    pub game_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A wine that can be rated in a game
#[derive(Debug, Clone, FromRow)]
pub struct WineData {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    pub code: String,
    pub year: i32,
}

/// A participant's rating of a wine
#[derive(Debug, Clone)]
pub struct RatingData {
    pub id: Uuid,
    pub game_id: Uuid,
    pub participant_id: Uuid,
    /// The username of the participant, joined in for display
    pub username: String,
    pub wine_id: Uuid,
    pub scores: Scores,
    pub comments: String,
}

impl From<&RatingData> for RatingEntry {
    fn from(rating: &RatingData) -> Self {
        Self {
            participant_id: rating.participant_id,
            wine_id: rating.wine_id,
            scores: rating.scores,
            comments: rating.comments.clone(),
        }
    }
}

impl From<&ParticipantData> for RosterEntry {
    fn from(participant: &ParticipantData) -> Self {
        Self {
            participant_id: participant.id,
            username: participant.username.clone(),
        }
    }
}

impl From<&WineData> for WineInfo {
    fn from(wine: &WineData) -> Self {
        Self {
            id: wine.id,
            name: wine.name.clone(),
            code: wine.code.clone(),
            year: wine.year,
        }
    }
}
