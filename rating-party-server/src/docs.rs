use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{errors, games, ratings, schemas, serialized, sessions, wines};

#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::sign_in,
        games::list_games,
        games::create_game,
        games::game,
        games::update_game,
        games::delete_game,
        games::participants,
        wines::list_wines,
        wines::create_wine,
        wines::wine,
        wines::update_wine,
        wines::delete_wine,
        ratings::list_ratings,
        ratings::leaderboard,
        ratings::put_rating,
    ),
    components(schemas(
        schemas::SignInSchema,
        schemas::NewGameSchema,
        schemas::UpdateGameSchema,
        schemas::WineSchema,
        schemas::RatingSchema,
        serialized::SignInResult,
        serialized::Game,
        serialized::Participant,
        serialized::Wine,
        serialized::Rating,
        errors::ErrorBody,
    )),
    modifiers(&Security),
    info(
        title = "rating-party",
        description = "rating-party-server exposes endpoints to run wine rating games"
    )
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
