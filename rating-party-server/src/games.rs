use axum::{extract::State, routing::get, Json};
use rating_party_collab::UpdatedGame;
use uuid::Uuid;

use crate::{
    auth::{Access, AdminOnly, InGame, ServerPath},
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewGameSchema, UpdateGameSchema, ValidatedJson},
    serialized::{Game, Participant, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/v1/games",
    tag = "games",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Game>)
    )
)]
async fn list_games(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Game>>> {
    let games = context.party.games.list().await?;

    Ok(Json(games.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/v1/games",
    tag = "games",
    request_body = NewGameSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game)
    )
)]
async fn create_game(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewGameSchema>,
) -> ServerResult<Json<Game>> {
    let game = context.party.games.create(body.game_name.trim()).await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}",
    tag = "games",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game)
    )
)]
async fn game(
    _access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Game>> {
    let game = context.party.games.get(game_id).await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/api/v1/games/{game_id}",
    tag = "games",
    request_body = UpdateGameSchema,
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game)
    )
)]
async fn update_game(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateGameSchema>,
) -> ServerResult<Json<Game>> {
    let game = context
        .party
        .games
        .update(UpdatedGame {
            id: game_id,
            name: body.game_name.map(|n| n.trim().to_string()),
            is_running: body.is_running,
            results_shared: body.are_results_shared,
        })
        .await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/games/{game_id}",
    tag = "games",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game, description = "The game that was deleted")
    )
)]
async fn delete_game(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Game>> {
    let game = context.party.games.delete(game_id).await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/participants",
    tag = "games",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Participant>)
    )
)]
async fn participants(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Vec<Participant>>> {
    let participants = context.party.participants.list(game_id).await?;

    Ok(Json(participants.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/:game_id",
            get(game).put(update_game).delete(delete_game),
        )
        .route("/games/:game_id/participants", get(participants))
}
