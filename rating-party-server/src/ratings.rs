use axum::{
    extract::State,
    routing::{get, put},
    Json,
};
use rating_party_core::Scores;
use uuid::Uuid;

use crate::{
    auth::{Access, InGame, ServerPath},
    context::ServerContext,
    errors::ServerResult,
    schemas::{RatingSchema, ValidatedJson},
    serialized::{LeaderboardRow, Rating, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/ratings",
    tag = "ratings",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Rating>, description = "Every rating for the admin, only their own for a participant")
    )
)]
async fn list_ratings(
    access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Vec<Rating>>> {
    let ratings = context
        .party
        .ratings
        .list(game_id, &access.identity)
        .await?;

    Ok(Json(ratings.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/ratings/results",
    tag = "ratings",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Ranked wines with wineId, wineName, wineCode, wineYear, avg and rank. Admins also get one score per username.")
    )
)]
async fn leaderboard(
    access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Vec<LeaderboardRow>>> {
    let results = context
        .party
        .ratings
        .leaderboard(game_id, &access.identity)
        .await?;

    Ok(Json(results.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/api/v1/games/{game_id}/wines/{wine_id}/ratings",
    tag = "ratings",
    request_body = RatingSchema,
    params(
        ("game_id" = Uuid, Path, description = "The game"),
        ("wine_id" = Uuid, Path, description = "The wine being rated")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Rating),
        (status = 400, body = crate::errors::ErrorBody, description = "A score is outside 0 to 100"),
        (status = 403, body = crate::errors::ErrorBody, description = "Caller is not a participant of the game")
    )
)]
async fn put_rating(
    access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath((game_id, wine_id)): ServerPath<(Uuid, Uuid)>,
    ValidatedJson(body): ValidatedJson<RatingSchema>,
) -> ServerResult<Json<Rating>> {
    let scores = Scores {
        sight: body.sight_rating,
        aroma: body.aroma_rating,
        taste: body.taste_rating,
        overall: body.overall_rating,
    };

    let rating = context
        .party
        .ratings
        .upsert(game_id, wine_id, &access.identity, scores, body.comments)
        .await?;

    Ok(Json(rating.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/games/:game_id/ratings", get(list_ratings))
        .route("/games/:game_id/ratings/results", get(leaderboard))
        .route("/games/:game_id/wines/:wine_id/ratings", put(put_rating))
}
