use async_trait::async_trait;
use rating_party_core::Scores;
use thiserror::Error;
use uuid::Uuid;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn conflict_or(self, resource: &'static str, field: &'static str, value: &str)
        -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can fetch rating party data from a database.
///
/// Every method is a single unit of work. In particular
/// [Database::find_or_create_participant] must never leave two participants
/// with the same username in one game, no matter how many callers race.
#[async_trait]
pub trait Database: Send + Sync {
    async fn list_games(&self) -> Result<Vec<GameData>>;
    async fn game_by_id(&self, game_id: Uuid) -> Result<GameData>;
    async fn game_by_code(&self, code: &str) -> Result<GameData>;
    async fn create_game(&self, new_game: NewGame) -> Result<GameData>;
    async fn update_game(&self, updated_game: UpdatedGame) -> Result<GameData>;
    async fn delete_game(&self, game_id: Uuid) -> Result<GameData>;

    async fn list_participants(&self, game_id: Uuid) -> Result<Vec<ParticipantData>>;
    async fn find_or_create_participant(
        &self,
        new_participant: NewParticipant,
    ) -> Result<ParticipantData>;

    async fn list_wines(&self, game_id: Uuid) -> Result<Vec<WineData>>;
    async fn wine_by_id(&self, wine_id: Uuid) -> Result<WineData>;
    async fn create_wine(&self, new_wine: NewWine) -> Result<WineData>;
    async fn update_wine(&self, updated_wine: UpdatedWine) -> Result<WineData>;
    async fn delete_wine(&self, wine_id: Uuid) -> Result<WineData>;

    async fn list_ratings(&self, game_id: Uuid) -> Result<Vec<RatingData>>;
    async fn list_participant_ratings(
        &self,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<RatingData>>;
    /// Creates the rating of a participant for a wine, or replaces it if it exists
    async fn upsert_rating(&self, new_rating: NewRating) -> Result<RatingData>;
}

#[derive(Debug)]
pub struct NewGame {
    pub name: String,
    /// The join code, must be unique
    pub code: String,
}

#[derive(Debug, Default)]
pub struct UpdatedGame {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_running: Option<bool>,
    pub results_shared: Option<bool>,
}

#[derive(Debug)]
pub struct NewParticipant {
    pub game_id: Uuid,
    pub username: String,
}

#[derive(Debug)]
pub struct NewWine {
    pub game_id: Uuid,
    pub name: String,
    pub code: String,
    pub year: i32,
}

#[derive(Debug)]
pub struct UpdatedWine {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub year: i32,
}

#[derive(Debug)]
pub struct NewRating {
    pub game_id: Uuid,
    pub participant_id: Uuid,
    pub wine_id: Uuid,
    pub scores: Scores,
    pub comments: String,
}
