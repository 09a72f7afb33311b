use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServerError;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignInSchema {
    #[validate(length(max = 128))]
    pub username: String,
    /// The admin passcode, or the join code of a game
    #[validate(length(max = 128))]
    pub passcode: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewGameSchema {
    #[validate(length(min = 1, max = 128))]
    pub game_name: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGameSchema {
    #[validate(length(min = 1, max = 128))]
    pub game_name: Option<String>,
    pub is_running: Option<bool>,
    pub are_results_shared: Option<bool>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WineSchema {
    #[validate(length(min = 1, max = 128))]
    pub wine_name: String,
    #[validate(length(min = 1, max = 16))]
    pub wine_code: String,
    #[validate(range(min = 1))]
    pub wine_year: i32,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RatingSchema {
    #[validate(range(min = 0, max = 100))]
    pub sight_rating: i32,
    #[validate(range(min = 0, max = 100))]
    pub aroma_rating: i32,
    #[validate(range(min = 0, max = 100))]
    pub taste_rating: i32,
    #[validate(range(min = 0, max = 100))]
    pub overall_rating: i32,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub comments: String,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| ServerError::BadRequest(format!("Request body is invalid: {}", e)))?;

        Ok(Self(value))
    }
}
