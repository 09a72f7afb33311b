use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rating_party_core::Scores;
use uuid::Uuid;

use crate::{
    Database, DatabaseError, GameData, NewGame, NewParticipant, NewRating, NewWine,
    ParticipantData, RatingData, Result, UpdatedGame, UpdatedWine, WineData,
};

/// A database that lives in process memory, used when no postgres url is configured
#[derive(Default)]
pub struct MemoryDatabase {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    games: HashMap<Uuid, GameData>,
    participants: HashMap<Uuid, ParticipantData>,
    wines: HashMap<Uuid, WineData>,
    ratings: HashMap<Uuid, StoredRating>,
}

/// A rating as stored, the username is joined in on the way out
#[derive(Clone)]
struct StoredRating {
    id: Uuid,
    game_id: Uuid,
    participant_id: Uuid,
    wine_id: Uuid,
    scores: Scores,
    comments: String,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn game(&self, game_id: Uuid) -> Result<&GameData> {
        self.games.get(&game_id).ok_or(DatabaseError::NotFound {
            resource: "game",
            identifier: "id",
        })
    }

    fn wine(&self, wine_id: Uuid) -> Result<&WineData> {
        self.wines.get(&wine_id).ok_or(DatabaseError::NotFound {
            resource: "wine",
            identifier: "id",
        })
    }

    fn participant(&self, participant_id: Uuid) -> Result<&ParticipantData> {
        self.participants
            .get(&participant_id)
            .ok_or(DatabaseError::NotFound {
                resource: "participant",
                identifier: "id",
            })
    }

    fn rating_data(&self, rating: &StoredRating) -> Result<RatingData> {
        let participant = self.participant(rating.participant_id)?;

        Ok(RatingData {
            id: rating.id,
            game_id: rating.game_id,
            participant_id: rating.participant_id,
            username: participant.username.clone(),
            wine_id: rating.wine_id,
            scores: rating.scores,
            comments: rating.comments.clone(),
        })
    }

    fn ratings_where(&self, predicate: impl Fn(&StoredRating) -> bool) -> Result<Vec<RatingData>> {
        let mut ratings = self
            .ratings
            .values()
            .filter(|r| predicate(r))
            .map(|r| self.rating_data(r))
            .collect::<Result<Vec<_>>>()?;

        ratings.sort_by(|a, b| {
            a.username
                .cmp(&b.username)
                .then_with(|| a.wine_id.cmp(&b.wine_id))
        });

        Ok(ratings)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn list_games(&self) -> Result<Vec<GameData>> {
        let state = self.state.read();
        let mut games: Vec<_> = state.games.values().cloned().collect();

        games.sort_by_key(|g| g.created_at);

        Ok(games)
    }

    async fn game_by_id(&self, game_id: Uuid) -> Result<GameData> {
        self.state.read().game(game_id).cloned()
    }

    async fn game_by_code(&self, code: &str) -> Result<GameData> {
        self.state
            .read()
            .games
            .values()
            .find(|g| g.code == code)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "game",
                identifier: "code",
            })
    }

    async fn create_game(&self, new_game: NewGame) -> Result<GameData> {
        let mut state = self.state.write();

        if state.games.values().any(|g| g.code == new_game.code) {
            return Err(DatabaseError::Conflict {
                resource: "game",
                field: "code",
                value: new_game.code,
            });
        }

        let now = Utc::now();
        let game = GameData {
            id: Uuid::new_v4(),
            name: new_game.name,
            code: new_game.code,
            is_running: false,
            results_shared: false,
            created_at: now,
            updated_at: now,
        };

        state.games.insert(game.id, game.clone());

        Ok(game)
    }

    async fn update_game(&self, updated_game: UpdatedGame) -> Result<GameData> {
        let mut state = self.state.write();

        let game = state
            .games
            .get_mut(&updated_game.id)
            .ok_or(DatabaseError::NotFound {
                resource: "game",
                identifier: "id",
            })?;

        if let Some(name) = updated_game.name {
            game.name = name;
        }

        if let Some(is_running) = updated_game.is_running {
            game.is_running = is_running;
        }

        if let Some(results_shared) = updated_game.results_shared {
            game.results_shared = results_shared;
        }

        game.updated_at = Utc::now();

        Ok(game.clone())
    }

    async fn delete_game(&self, game_id: Uuid) -> Result<GameData> {
        let mut state = self.state.write();

        let game = state.games.remove(&game_id).ok_or(DatabaseError::NotFound {
            resource: "game",
            identifier: "id",
        })?;

        state.participants.retain(|_, p| p.game_id != game_id);
        state.wines.retain(|_, w| w.game_id != game_id);
        state.ratings.retain(|_, r| r.game_id != game_id);

        Ok(game)
    }

    async fn list_participants(&self, game_id: Uuid) -> Result<Vec<ParticipantData>> {
        let state = self.state.read();
        let mut participants: Vec<_> = state
            .participants
            .values()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect();

        participants.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(participants)
    }

    async fn find_or_create_participant(
        &self,
        new_participant: NewParticipant,
    ) -> Result<ParticipantData> {
        // Lookup and insert happen under the same write lock
        let mut state = self.state.write();

        state.game(new_participant.game_id)?;

        let existing = state.participants.values().find(|p| {
            p.game_id == new_participant.game_id && p.username == new_participant.username
        });

        if let Some(participant) = existing {
            return Ok(participant.clone());
        }

        let participant = ParticipantData {
            id: Uuid::new_v4(),
            game_id: new_participant.game_id,
            username: new_participant.username,
            created_at: Utc::now(),
        };

        state
            .participants
            .insert(participant.id, participant.clone());

        Ok(participant)
    }

    async fn list_wines(&self, game_id: Uuid) -> Result<Vec<WineData>> {
        let state = self.state.read();
        let mut wines: Vec<_> = state
            .wines
            .values()
            .filter(|w| w.game_id == game_id)
            .cloned()
            .collect();

        wines.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.id.cmp(&b.id)));

        Ok(wines)
    }

    async fn wine_by_id(&self, wine_id: Uuid) -> Result<WineData> {
        self.state.read().wine(wine_id).cloned()
    }

    async fn create_wine(&self, new_wine: NewWine) -> Result<WineData> {
        let mut state = self.state.write();

        state.game(new_wine.game_id)?;

        let wine = WineData {
            id: Uuid::new_v4(),
            game_id: new_wine.game_id,
            name: new_wine.name,
            code: new_wine.code,
            year: new_wine.year,
        };

        state.wines.insert(wine.id, wine.clone());

        Ok(wine)
    }

    async fn update_wine(&self, updated_wine: UpdatedWine) -> Result<WineData> {
        let mut state = self.state.write();

        let wine = state
            .wines
            .get_mut(&updated_wine.id)
            .ok_or(DatabaseError::NotFound {
                resource: "wine",
                identifier: "id",
            })?;

        wine.name = updated_wine.name;
        wine.code = updated_wine.code;
        wine.year = updated_wine.year;

        Ok(wine.clone())
    }

    async fn delete_wine(&self, wine_id: Uuid) -> Result<WineData> {
        let mut state = self.state.write();

        let wine = state.wines.remove(&wine_id).ok_or(DatabaseError::NotFound {
            resource: "wine",
            identifier: "id",
        })?;

        state.ratings.retain(|_, r| r.wine_id != wine_id);

        Ok(wine)
    }

    async fn list_ratings(&self, game_id: Uuid) -> Result<Vec<RatingData>> {
        self.state
            .read()
            .ratings_where(|r| r.game_id == game_id)
    }

    async fn list_participant_ratings(
        &self,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<RatingData>> {
        self.state
            .read()
            .ratings_where(|r| r.game_id == game_id && r.participant_id == participant_id)
    }

    async fn upsert_rating(&self, new_rating: NewRating) -> Result<RatingData> {
        let mut state = self.state.write();

        state.game(new_rating.game_id)?;
        state.wine(new_rating.wine_id)?;
        state.participant(new_rating.participant_id)?;

        let existing_id = state
            .ratings
            .values()
            .find(|r| {
                r.participant_id == new_rating.participant_id && r.wine_id == new_rating.wine_id
            })
            .map(|r| r.id);

        let rating = StoredRating {
            id: existing_id.unwrap_or_else(Uuid::new_v4),
            game_id: new_rating.game_id,
            participant_id: new_rating.participant_id,
            wine_id: new_rating.wine_id,
            scores: new_rating.scores,
            comments: new_rating.comments,
        };

        state.ratings.insert(rating.id, rating.clone());
        state.rating_data(&rating)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    async fn setup() -> (MemoryDatabase, GameData) {
        let db = MemoryDatabase::new();
        let game = db
            .create_game(NewGame {
                name: "Friday tasting".to_string(),
                code: "AB12C".to_string(),
            })
            .await
            .unwrap();

        (db, game)
    }

    #[tokio::test]
    async fn test_game_code_conflict() {
        let (db, _) = setup().await;

        let result = db
            .create_game(NewGame {
                name: "Another".to_string(),
                code: "AB12C".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(DatabaseError::Conflict { field: "code", .. })
        ));
    }

    #[tokio::test]
    async fn test_find_or_create_participant_is_idempotent() {
        let (db, game) = setup().await;

        let first = db
            .find_or_create_participant(NewParticipant {
                game_id: game.id,
                username: "alice".to_string(),
            })
            .await
            .unwrap();

        let second = db
            .find_or_create_participant(NewParticipant {
                game_id: game.id,
                username: "alice".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(db.list_participants(game.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_participants_are_unique() {
        let (db, game) = setup().await;
        let db = Arc::new(db);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();

                tokio::spawn(async move {
                    db.find_or_create_participant(NewParticipant {
                        game_id: game.id,
                        username: "bob".to_string(),
                    })
                    .await
                    .unwrap()
                    .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(db.list_participants(game.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rating_replaces() {
        let (db, game) = setup().await;

        let participant = db
            .find_or_create_participant(NewParticipant {
                game_id: game.id,
                username: "carol".to_string(),
            })
            .await
            .unwrap();

        let wine = db
            .create_wine(NewWine {
                game_id: game.id,
                name: "Barolo".to_string(),
                code: "A".to_string(),
                year: 2016,
            })
            .await
            .unwrap();

        let rating = |overall| NewRating {
            game_id: game.id,
            participant_id: participant.id,
            wine_id: wine.id,
            scores: Scores {
                sight: 1,
                aroma: 2,
                taste: 3,
                overall,
            },
            comments: String::new(),
        };

        let first = db.upsert_rating(rating(4)).await.unwrap();
        let second = db.upsert_rating(rating(9)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.username, "carol");

        let ratings = db.list_ratings(game.id).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].scores.overall, 9);
    }

    #[tokio::test]
    async fn test_delete_game_cascades() {
        let (db, game) = setup().await;

        let participant = db
            .find_or_create_participant(NewParticipant {
                game_id: game.id,
                username: "dave".to_string(),
            })
            .await
            .unwrap();

        let wine = db
            .create_wine(NewWine {
                game_id: game.id,
                name: "Rioja".to_string(),
                code: "B".to_string(),
                year: 2019,
            })
            .await
            .unwrap();

        db.upsert_rating(NewRating {
            game_id: game.id,
            participant_id: participant.id,
            wine_id: wine.id,
            scores: Scores::default(),
            comments: "flat".to_string(),
        })
        .await
        .unwrap();

        db.delete_game(game.id).await.unwrap();

        assert!(db.game_by_id(game.id).await.unwrap_err().is_not_found());
        assert!(db.wine_by_id(wine.id).await.unwrap_err().is_not_found());
        assert!(db.list_participants(game.id).await.unwrap().is_empty());
        assert!(db.list_ratings(game.id).await.unwrap().is_empty());
    }
}
