use uuid::Uuid;

use crate::{DatabaseError, ParticipantData, PartyContext};

pub struct ParticipantManager {
    context: PartyContext,
}

impl ParticipantManager {
    pub fn new(context: &PartyContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Lists the roster of a game ordered by username
    pub async fn list(&self, game_id: Uuid) -> Result<Vec<ParticipantData>, DatabaseError> {
        self.context.database.game_by_id(game_id).await?;
        self.context.database.list_participants(game_id).await
    }
}
