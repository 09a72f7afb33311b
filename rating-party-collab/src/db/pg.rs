use async_trait::async_trait;
use rating_party_core::Scores;
use sqlx::{postgres::PgPoolOptions, query, query_as, Error as SqlxError, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    Database, DatabaseError, GameData, IntoDatabaseError, NewGame, NewParticipant, NewRating,
    NewWine, ParticipantData, RatingData, Result, UpdatedGame, UpdatedWine, WineData,
};

const GAME_COLUMNS: &str = "id, name, code, is_running, results_shared, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str = "id, game_id, username, created_at";
const WINE_COLUMNS: &str = "id, game_id, name, code, year";
const RATING_SELECT: &str = "
    SELECT
        ratings.id,
        ratings.game_id,
        ratings.participant_id,
        participants.username,
        ratings.wine_id,
        ratings.sight,
        ratings.aroma,
        ratings.taste,
        ratings.overall,
        ratings.comments
    FROM ratings
        INNER JOIN participants ON ratings.participant_id = participants.id";

/// A postgres database implementation for rating party
pub struct PgDatabase {
    pool: PgPool,
}

/// A rating row as stored, before the sub-scores are gathered up
#[derive(FromRow)]
struct RatingRow {
    id: Uuid,
    game_id: Uuid,
    participant_id: Uuid,
    username: String,
    wine_id: Uuid,
    sight: i32,
    aroma: i32,
    taste: i32,
    overall: i32,
    comments: String,
}

impl From<RatingRow> for RatingData {
    fn from(row: RatingRow) -> Self {
        Self {
            id: row.id,
            game_id: row.game_id,
            participant_id: row.participant_id,
            username: row.username,
            wine_id: row.wine_id,
            scores: Scores {
                sight: row.sight,
                aroma: row.aroma,
                taste: row.taste,
                overall: row.overall,
            },
            comments: row.comments,
        }
    }
}

impl PgDatabase {
    /// Connects to the database and brings the schema up to date
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| e.any())?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    async fn rating_by_id(&self, rating_id: Uuid) -> Result<RatingData> {
        query_as::<_, RatingRow>(&format!("{} WHERE ratings.id = $1", RATING_SELECT))
            .bind(rating_id)
            .fetch_one(&self.pool)
            .await
            .map(Into::into)
            .map_err(|e| e.not_found_or("rating", "id"))
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn list_games(&self) -> Result<Vec<GameData>> {
        query_as::<_, GameData>(&format!(
            "SELECT {} FROM games ORDER BY created_at",
            GAME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn game_by_id(&self, game_id: Uuid) -> Result<GameData> {
        query_as::<_, GameData>(&format!("SELECT {} FROM games WHERE id = $1", GAME_COLUMNS))
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("game", "id"))
    }

    async fn game_by_code(&self, code: &str) -> Result<GameData> {
        query_as::<_, GameData>(&format!(
            "SELECT {} FROM games WHERE code = $1",
            GAME_COLUMNS
        ))
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("game", "code"))
    }

    async fn create_game(&self, new_game: NewGame) -> Result<GameData> {
        query_as::<_, GameData>(&format!(
            "INSERT INTO games (id, name, code) VALUES ($1, $2, $3) RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_game.name)
        .bind(&new_game.code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_or("game", "code", &new_game.code))
    }

    async fn update_game(&self, updated_game: UpdatedGame) -> Result<GameData> {
        let game = self.game_by_id(updated_game.id).await?;

        query_as::<_, GameData>(&format!(
            "UPDATE games SET
                name = $1,
                is_running = $2,
                results_shared = $3,
                updated_at = now()
            WHERE id = $4
            RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(updated_game.name.unwrap_or(game.name))
        .bind(updated_game.is_running.unwrap_or(game.is_running))
        .bind(updated_game.results_shared.unwrap_or(game.results_shared))
        .bind(updated_game.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("game", "id"))
    }

    async fn delete_game(&self, game_id: Uuid) -> Result<GameData> {
        query_as::<_, GameData>(&format!(
            "DELETE FROM games WHERE id = $1 RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(game_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("game", "id"))
    }

    async fn list_participants(&self, game_id: Uuid) -> Result<Vec<ParticipantData>> {
        query_as::<_, ParticipantData>(&format!(
            "SELECT {} FROM participants WHERE game_id = $1 ORDER BY username",
            PARTICIPANT_COLUMNS
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn find_or_create_participant(
        &self,
        new_participant: NewParticipant,
    ) -> Result<ParticipantData> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        // A concurrent insert of the same username makes this a no-op
        query(
            "INSERT INTO participants (id, game_id, username)
            VALUES ($1, $2, $3)
            ON CONFLICT (game_id, username) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(new_participant.game_id)
        .bind(&new_participant.username)
        .execute(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        let participant = query_as::<_, ParticipantData>(&format!(
            "SELECT {} FROM participants WHERE game_id = $1 AND username = $2",
            PARTICIPANT_COLUMNS
        ))
        .bind(new_participant.game_id)
        .bind(&new_participant.username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.not_found_or("participant", "game_id:username"))?;

        tx.commit().await.map_err(|e| e.any())?;

        Ok(participant)
    }

    async fn list_wines(&self, game_id: Uuid) -> Result<Vec<WineData>> {
        query_as::<_, WineData>(&format!(
            "SELECT {} FROM wines WHERE game_id = $1 ORDER BY code",
            WINE_COLUMNS
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn wine_by_id(&self, wine_id: Uuid) -> Result<WineData> {
        query_as::<_, WineData>(&format!("SELECT {} FROM wines WHERE id = $1", WINE_COLUMNS))
            .bind(wine_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("wine", "id"))
    }

    async fn create_wine(&self, new_wine: NewWine) -> Result<WineData> {
        query_as::<_, WineData>(&format!(
            "INSERT INTO wines (id, game_id, name, code, year)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}",
            WINE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new_wine.game_id)
        .bind(&new_wine.name)
        .bind(&new_wine.code)
        .bind(new_wine.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_wine(&self, updated_wine: UpdatedWine) -> Result<WineData> {
        query_as::<_, WineData>(&format!(
            "UPDATE wines SET name = $1, code = $2, year = $3 WHERE id = $4 RETURNING {}",
            WINE_COLUMNS
        ))
        .bind(&updated_wine.name)
        .bind(&updated_wine.code)
        .bind(updated_wine.year)
        .bind(updated_wine.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("wine", "id"))
    }

    async fn delete_wine(&self, wine_id: Uuid) -> Result<WineData> {
        query_as::<_, WineData>(&format!(
            "DELETE FROM wines WHERE id = $1 RETURNING {}",
            WINE_COLUMNS
        ))
        .bind(wine_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("wine", "id"))
    }

    async fn list_ratings(&self, game_id: Uuid) -> Result<Vec<RatingData>> {
        let rows = query_as::<_, RatingRow>(&format!(
            "{} WHERE ratings.game_id = $1 ORDER BY participants.username, ratings.wine_id",
            RATING_SELECT
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_participant_ratings(
        &self,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<RatingData>> {
        let rows = query_as::<_, RatingRow>(&format!(
            "{} WHERE ratings.game_id = $1 AND ratings.participant_id = $2 ORDER BY ratings.wine_id",
            RATING_SELECT
        ))
        .bind(game_id)
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_rating(&self, new_rating: NewRating) -> Result<RatingData> {
        let record: (Uuid,) = query_as(
            "INSERT INTO ratings (
                id, game_id, participant_id, wine_id, sight, aroma, taste, overall, comments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (participant_id, wine_id) DO UPDATE SET
                sight = EXCLUDED.sight,
                aroma = EXCLUDED.aroma,
                taste = EXCLUDED.taste,
                overall = EXCLUDED.overall,
                comments = EXCLUDED.comments,
                updated_at = now()
            RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(new_rating.game_id)
        .bind(new_rating.participant_id)
        .bind(new_rating.wine_id)
        .bind(new_rating.scores.sight)
        .bind(new_rating.scores.aroma)
        .bind(new_rating.scores.taste)
        .bind(new_rating.scores.overall)
        .bind(&new_rating.comments)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.rating_by_id(record.0).await
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }

    fn conflict_or(self, resource: &'static str, field: &'static str, value: &str) -> DatabaseError {
        match &self {
            SqlxError::Database(e) if e.is_unique_violation() => DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            },
            _ => self.any(),
        }
    }
}
