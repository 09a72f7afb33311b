use log::{info, warn};
use uuid::Uuid;

use crate::{util::random_code, DatabaseError, GameData, NewGame, PartyContext, UpdatedGame};

pub struct GameManager {
    context: PartyContext,
}

impl GameManager {
    pub const CODE_LENGTH: usize = 5;
    const MAX_CODE_ATTEMPTS: usize = 5;

    pub fn new(context: &PartyContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Lists every game, oldest first
    pub async fn list(&self) -> Result<Vec<GameData>, DatabaseError> {
        self.context.database.list_games().await
    }

    pub async fn get(&self, game_id: Uuid) -> Result<GameData, DatabaseError> {
        self.context.database.game_by_id(game_id).await
    }

    /// Creates a game with a freshly generated join code
    pub async fn create(&self, name: &str) -> Result<GameData, DatabaseError> {
        let mut attempt = 1;

        loop {
            let new_game = NewGame {
                name: name.to_string(),
                code: random_code(Self::CODE_LENGTH),
            };

            match self.context.database.create_game(new_game).await {
                Ok(game) => {
                    info!("Created game {} ({}) with code {}", game.name, game.id, game.code);
                    return Ok(game);
                }
                Err(DatabaseError::Conflict { value, .. }) if attempt < Self::MAX_CODE_ATTEMPTS => {
                    warn!("Join code {} is taken, generating another", value);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn update(&self, updated_game: UpdatedGame) -> Result<GameData, DatabaseError> {
        self.context.database.update_game(updated_game).await
    }

    /// Deletes a game along with its wines, participants and ratings
    pub async fn delete(&self, game_id: Uuid) -> Result<GameData, DatabaseError> {
        let game = self.context.database.delete_game(game_id).await?;
        info!("Deleted game {} ({})", game.name, game.id);

        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use rating_party_core::AuthConfig;

    use super::*;
    use crate::{MemoryDatabase, Party};

    fn party() -> Party {
        Party::new(MemoryDatabase::new(), AuthConfig::new("ivory", "ebony"))
    }

    #[tokio::test]
    async fn test_create_game() {
        let party = party();

        let game = party.games.create("Friday tasting").await.unwrap();

        assert_eq!(game.name, "Friday tasting");
        assert_eq!(game.code.len(), GameManager::CODE_LENGTH);
        assert!(!game.is_running);
        assert!(!game.results_shared);
        assert_eq!(party.games.get(game.id).await.unwrap().code, game.code);
    }

    #[tokio::test]
    async fn test_update_game_flags() {
        let party = party();
        let game = party.games.create("Friday tasting").await.unwrap();

        let updated = party
            .games
            .update(UpdatedGame {
                id: game.id,
                is_running: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Friday tasting");
        assert!(updated.is_running);
        assert!(!updated.results_shared);
        assert_eq!(updated.code, game.code);
    }

    #[tokio::test]
    async fn test_delete_game() {
        let party = party();
        let game = party.games.create("Friday tasting").await.unwrap();

        let deleted = party.games.delete(game.id).await.unwrap();

        assert_eq!(deleted.id, game.id);
        assert!(party.games.list().await.unwrap().is_empty());
        assert!(party.games.delete(game.id).await.unwrap_err().is_not_found());
    }
}
