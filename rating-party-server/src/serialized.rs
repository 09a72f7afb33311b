//! All schemas that are exposed from endpoints are defined here
//! along with the ToSerialized impls

use chrono::{DateTime, Utc};
use rating_party_collab::{GameData, ParticipantData, RatingData, SignIn, WineData};
use rating_party_core::ItemResult;
use serde::{ser::SerializeMap, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResult {
    jwt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    game_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    game_id: Uuid,
    game_name: String,
    game_code: String,
    is_running: bool,
    are_results_shared: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    participant_id: Uuid,
    game_id: Uuid,
    username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wine {
    wine_id: Uuid,
    wine_name: String,
    wine_code: String,
    wine_year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    rating_id: Uuid,
    game_id: Uuid,
    participant_id: Uuid,
    username: String,
    wine_id: Uuid,
    sight_rating: i32,
    aroma_rating: i32,
    taste_rating: i32,
    overall_rating: i32,
    total_rating: i64,
    comments: String,
}

/// One leaderboard row.
///
/// Individual scores are flattened into the row keyed by username, so the
/// shape depends on who is asking and cannot be a fixed schema.
#[derive(Debug)]
pub struct LeaderboardRow(ItemResult);

impl Serialize for LeaderboardRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let result = &self.0;
        let scores = result.scores.as_ref();

        let mut map = serializer.serialize_map(Some(6 + scores.map_or(0, |s| s.len())))?;

        map.serialize_entry("wineId", &result.wine.id)?;
        map.serialize_entry("wineName", &result.wine.name)?;
        map.serialize_entry("wineCode", &result.wine.code)?;
        map.serialize_entry("wineYear", &result.wine.year)?;

        for (username, score) in scores.into_iter().flatten() {
            map.serialize_entry(username, score)?;
        }

        map.serialize_entry("avg", &result.average)?;
        map.serialize_entry("rank", &result.rank)?;
        map.end()
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<SignInResult> for SignIn {
    fn to_serialized(&self) -> SignInResult {
        match self {
            SignIn::Admin { token } => SignInResult {
                jwt: token.token.clone(),
                is_admin: Some(true),
                game_id: None,
            },
            SignIn::Participant { token, participant } => SignInResult {
                jwt: token.token.clone(),
                is_admin: None,
                game_id: Some(participant.game_id),
            },
        }
    }
}

impl ToSerialized<Game> for GameData {
    fn to_serialized(&self) -> Game {
        Game {
            game_id: self.id,
            game_name: self.name.clone(),
            game_code: self.code.clone(),
            is_running: self.is_running,
            are_results_shared: self.results_shared,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ToSerialized<Participant> for ParticipantData {
    fn to_serialized(&self) -> Participant {
        Participant {
            participant_id: self.id,
            game_id: self.game_id,
            username: self.username.clone(),
        }
    }
}

impl ToSerialized<Wine> for WineData {
    fn to_serialized(&self) -> Wine {
        Wine {
            wine_id: self.id,
            wine_name: self.name.clone(),
            wine_code: self.code.clone(),
            wine_year: self.year,
        }
    }
}

impl ToSerialized<Rating> for RatingData {
    fn to_serialized(&self) -> Rating {
        Rating {
            rating_id: self.id,
            game_id: self.game_id,
            participant_id: self.participant_id,
            username: self.username.clone(),
            wine_id: self.wine_id,
            sight_rating: self.scores.sight,
            aroma_rating: self.scores.aroma,
            taste_rating: self.scores.taste,
            overall_rating: self.scores.overall,
            total_rating: self.scores.total(),
            comments: self.comments.clone(),
        }
    }
}

impl ToSerialized<LeaderboardRow> for ItemResult {
    fn to_serialized(&self) -> LeaderboardRow {
        LeaderboardRow(self.clone())
    }
}
