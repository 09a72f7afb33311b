use rating_party_core::{
    compute_leaderboard, AggregationError, Identity, ItemResult, RatingEntry, RosterEntry, Scores,
    View, WineInfo,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{DatabaseError, NewRating, PartyContext, RatingData};

pub struct RatingManager {
    context: PartyContext,
}

#[derive(Debug, Error)]
pub enum RatingError {
    /// Only participants rate, an admin or anonymous caller cannot
    #[error("Only participants of the game can submit ratings")]
    NotAParticipant,
    #[error("Scores must be between 0 and {}", Scores::MAX)]
    ScoreOutOfRange,
    #[error(transparent)]
    Aggregation(AggregationError),
    #[error(transparent)]
    Db(DatabaseError),
}

impl From<DatabaseError> for RatingError {
    fn from(value: DatabaseError) -> Self {
        Self::Db(value)
    }
}

impl RatingManager {
    pub fn new(context: &PartyContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Lists raw ratings: every rating of the game for an admin, only their own for a participant
    pub async fn list(
        &self,
        game_id: Uuid,
        identity: &Identity,
    ) -> Result<Vec<RatingData>, RatingError> {
        let database = &self.context.database;
        database.game_by_id(game_id).await?;

        let ratings = match identity {
            Identity::Admin => database.list_ratings(game_id).await?,
            Identity::Participant { participant_id, .. } => {
                database
                    .list_participant_ratings(game_id, *participant_id)
                    .await?
            }
            Identity::Anonymous => return Err(RatingError::NotAParticipant),
        };

        Ok(ratings)
    }

    /// Creates or replaces the caller's rating of a wine
    pub async fn upsert(
        &self,
        game_id: Uuid,
        wine_id: Uuid,
        identity: &Identity,
        scores: Scores,
        comments: String,
    ) -> Result<RatingData, RatingError> {
        let participant_id = identity
            .participant_id()
            .ok_or(RatingError::NotAParticipant)?;

        if !scores.is_in_range() {
            return Err(RatingError::ScoreOutOfRange);
        }

        let wine = self.context.database.wine_by_id(wine_id).await?;
        if wine.game_id != game_id {
            return Err(RatingError::Db(DatabaseError::NotFound {
                resource: "wine",
                identifier: "id",
            }));
        }

        let rating = self
            .context
            .database
            .upsert_rating(NewRating {
                game_id,
                participant_id,
                wine_id,
                scores,
                comments,
            })
            .await?;

        Ok(rating)
    }

    /// Computes the ranked leaderboard of a game in the view the identity is entitled to
    pub async fn leaderboard(
        &self,
        game_id: Uuid,
        identity: &Identity,
    ) -> Result<Vec<ItemResult>, RatingError> {
        let database = &self.context.database;
        database.game_by_id(game_id).await?;

        let (ratings, participants, wines) = tokio::try_join!(
            database.list_ratings(game_id),
            database.list_participants(game_id),
            database.list_wines(game_id),
        )?;

        let ratings: Vec<RatingEntry> = ratings.iter().map(Into::into).collect();
        let roster: Vec<RosterEntry> = participants.iter().map(Into::into).collect();
        let wines: Vec<WineInfo> = wines.iter().map(Into::into).collect();

        compute_leaderboard(&ratings, &roster, &wines, View::from(identity))
            .map_err(RatingError::Aggregation)
    }
}

#[cfg(test)]
mod tests {
    use rating_party_core::AuthConfig;

    use super::*;
    use crate::{Credentials, GameData, MemoryDatabase, NewWine, Party, SignIn, WineData};

    struct Fixture {
        party: Party,
        game: GameData,
        wines: Vec<WineData>,
    }

    impl Fixture {
        async fn new() -> Self {
            let party = Party::new(MemoryDatabase::new(), AuthConfig::new("ivory", "ebony"));
            let game = party.games.create("Friday tasting").await.unwrap();

            let mut wines = Vec::new();
            for (code, name) in [("W1", "Barolo"), ("W2", "Rioja")] {
                let wine = party
                    .wines
                    .create(NewWine {
                        game_id: game.id,
                        name: name.to_string(),
                        code: code.to_string(),
                        year: 2016,
                    })
                    .await
                    .unwrap();

                wines.push(wine);
            }

            Self { party, game, wines }
        }

        async fn join(&self, username: &str) -> Identity {
            let sign_in = self
                .party
                .auth
                .sign_in(Credentials {
                    username: username.to_string(),
                    passcode: self.game.code.clone(),
                })
                .await
                .unwrap();

            let SignIn::Participant { participant, .. } = sign_in else {
                panic!("expected a participant sign-in");
            };

            Identity::Participant {
                participant_id: participant.id,
                game_id: self.game.id,
            }
        }

        async fn rate(&self, identity: &Identity, wine: usize, score: i32) {
            self.party
                .ratings
                .upsert(
                    self.game.id,
                    self.wines[wine].id,
                    identity,
                    Scores {
                        sight: score,
                        aroma: score,
                        taste: score,
                        overall: score,
                    },
                    String::new(),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_leaderboard_scenario() {
        let fixture = Fixture::new().await;
        let p1 = fixture.join("p1").await;
        let p2 = fixture.join("p2").await;

        fixture.rate(&p1, 0, 3).await;
        fixture.rate(&p2, 0, 2).await;
        fixture.rate(&p2, 1, 4).await;

        let results = fixture
            .party
            .ratings
            .leaderboard(fixture.game.id, &Identity::Admin)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].wine.code, "W2");
        assert_eq!(results[0].average, 16.0);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].wine.code, "W1");
        assert_eq!(results[1].average, 10.0);
        assert_eq!(results[1].raters, 2);
        assert_eq!(results[1].rank, 2);

        let scores = results[1].scores.as_ref().unwrap();
        assert_eq!(scores.get("p1"), Some(&12));
        assert_eq!(scores.get("p2"), Some(&8));

        let participant_view = fixture
            .party
            .ratings
            .leaderboard(fixture.game.id, &p1)
            .await
            .unwrap();

        assert!(participant_view.iter().all(|r| r.scores.is_none()));
    }

    #[tokio::test]
    async fn test_participant_sees_own_ratings() {
        let fixture = Fixture::new().await;
        let p1 = fixture.join("p1").await;
        let p2 = fixture.join("p2").await;

        fixture.rate(&p1, 0, 1).await;
        fixture.rate(&p2, 0, 2).await;
        fixture.rate(&p2, 1, 2).await;

        let own = fixture
            .party
            .ratings
            .list(fixture.game.id, &p1)
            .await
            .unwrap();

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].username, "p1");

        let all = fixture
            .party
            .ratings
            .list(fixture.game.id, &Identity::Admin)
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_admin_cannot_rate() {
        let fixture = Fixture::new().await;

        let result = fixture
            .party
            .ratings
            .upsert(
                fixture.game.id,
                fixture.wines[0].id,
                &Identity::Admin,
                Scores::default(),
                String::new(),
            )
            .await;

        assert!(matches!(result, Err(RatingError::NotAParticipant)));
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_rejected() {
        let fixture = Fixture::new().await;
        let p1 = fixture.join("p1").await;

        for scores in [
            Scores {
                sight: -1,
                ..Default::default()
            },
            Scores {
                aroma: Scores::MAX + 1,
                ..Default::default()
            },
            Scores {
                sight: i32::MAX,
                aroma: 1,
                ..Default::default()
            },
        ] {
            let result = fixture
                .party
                .ratings
                .upsert(
                    fixture.game.id,
                    fixture.wines[0].id,
                    &p1,
                    scores,
                    String::new(),
                )
                .await;

            assert!(
                matches!(result, Err(RatingError::ScoreOutOfRange)),
                "{scores:?} should be refused"
            );
        }

        let leaderboard = fixture
            .party
            .ratings
            .leaderboard(fixture.game.id, &Identity::Admin)
            .await
            .unwrap();

        assert!(leaderboard.is_empty());
    }

    #[tokio::test]
    async fn test_rating_wine_of_other_game() {
        let fixture = Fixture::new().await;
        let p1 = fixture.join("p1").await;
        let other = fixture.party.games.create("Saturday tasting").await.unwrap();

        let result = fixture
            .party
            .ratings
            .upsert(
                other.id,
                fixture.wines[0].id,
                &p1,
                Scores::default(),
                "lovely".to_string(),
            )
            .await;

        assert!(matches!(result, Err(RatingError::Db(e)) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_rerating_replaces_previous_score() {
        let fixture = Fixture::new().await;
        let p1 = fixture.join("p1").await;

        fixture.rate(&p1, 0, 1).await;
        fixture.rate(&p1, 0, 5).await;

        let results = fixture
            .party
            .ratings
            .leaderboard(fixture.game.id, &Identity::Admin)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].average, 20.0);
        assert_eq!(results[0].raters, 1);
    }
}
