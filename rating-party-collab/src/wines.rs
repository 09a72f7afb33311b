use uuid::Uuid;

use crate::{DatabaseError, NewWine, PartyContext, UpdatedWine, WineData};

pub struct WineManager {
    context: PartyContext,
}

impl WineManager {
    pub fn new(context: &PartyContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Lists the wines of a game ordered by code
    pub async fn list(&self, game_id: Uuid) -> Result<Vec<WineData>, DatabaseError> {
        self.context.database.game_by_id(game_id).await?;
        self.context.database.list_wines(game_id).await
    }

    /// Returns a wine, as long as it belongs to the given game
    pub async fn get(&self, game_id: Uuid, wine_id: Uuid) -> Result<WineData, DatabaseError> {
        let wine = self.context.database.wine_by_id(wine_id).await?;

        if wine.game_id != game_id {
            return Err(DatabaseError::NotFound {
                resource: "wine",
                identifier: "id",
            });
        }

        Ok(wine)
    }

    pub async fn create(&self, new_wine: NewWine) -> Result<WineData, DatabaseError> {
        self.context.database.game_by_id(new_wine.game_id).await?;
        self.context.database.create_wine(new_wine).await
    }

    pub async fn update(
        &self,
        game_id: Uuid,
        updated_wine: UpdatedWine,
    ) -> Result<WineData, DatabaseError> {
        self.get(game_id, updated_wine.id).await?;
        self.context.database.update_wine(updated_wine).await
    }

    /// Deletes a wine along with its ratings
    pub async fn delete(&self, game_id: Uuid, wine_id: Uuid) -> Result<WineData, DatabaseError> {
        self.get(game_id, wine_id).await?;
        self.context.database.delete_wine(wine_id).await
    }
}
