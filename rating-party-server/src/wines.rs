use axum::{extract::State, routing::get, Json};
use rating_party_collab::{NewWine, UpdatedWine};
use uuid::Uuid;

use crate::{
    auth::{Access, AdminOnly, InGame, ServerPath},
    context::ServerContext,
    errors::ServerResult,
    schemas::{ValidatedJson, WineSchema},
    serialized::{ToSerialized, Wine},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/wines",
    tag = "wines",
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Wine>, description = "Wines of the game ordered by code")
    )
)]
async fn list_wines(
    _access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
) -> ServerResult<Json<Vec<Wine>>> {
    let wines = context.party.wines.list(game_id).await?;

    Ok(Json(wines.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/wines",
    tag = "wines",
    request_body = WineSchema,
    params(
        ("game_id" = Uuid, Path, description = "The game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Wine)
    )
)]
async fn create_wine(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath(game_id): ServerPath<Uuid>,
    ValidatedJson(body): ValidatedJson<WineSchema>,
) -> ServerResult<Json<Wine>> {
    let wine = context
        .party
        .wines
        .create(NewWine {
            game_id,
            name: body.wine_name,
            code: body.wine_code,
            year: body.wine_year,
        })
        .await?;

    Ok(Json(wine.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/wines/{wine_id}",
    tag = "wines",
    params(
        ("game_id" = Uuid, Path, description = "The game"),
        ("wine_id" = Uuid, Path, description = "A wine of the game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Wine)
    )
)]
async fn wine(
    _access: Access<InGame>,
    State(context): State<ServerContext>,
    ServerPath((game_id, wine_id)): ServerPath<(Uuid, Uuid)>,
) -> ServerResult<Json<Wine>> {
    let wine = context.party.wines.get(game_id, wine_id).await?;

    Ok(Json(wine.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/api/v1/games/{game_id}/wines/{wine_id}",
    tag = "wines",
    request_body = WineSchema,
    params(
        ("game_id" = Uuid, Path, description = "The game"),
        ("wine_id" = Uuid, Path, description = "A wine of the game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Wine)
    )
)]
async fn update_wine(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath((game_id, wine_id)): ServerPath<(Uuid, Uuid)>,
    ValidatedJson(body): ValidatedJson<WineSchema>,
) -> ServerResult<Json<Wine>> {
    let wine = context
        .party
        .wines
        .update(
            game_id,
            UpdatedWine {
                id: wine_id,
                name: body.wine_name,
                code: body.wine_code,
                year: body.wine_year,
            },
        )
        .await?;

    Ok(Json(wine.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/games/{game_id}/wines/{wine_id}",
    tag = "wines",
    params(
        ("game_id" = Uuid, Path, description = "The game"),
        ("wine_id" = Uuid, Path, description = "A wine of the game")
    ),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Wine, description = "The wine that was deleted")
    )
)]
async fn delete_wine(
    _access: Access<AdminOnly>,
    State(context): State<ServerContext>,
    ServerPath((game_id, wine_id)): ServerPath<(Uuid, Uuid)>,
) -> ServerResult<Json<Wine>> {
    let wine = context.party.wines.delete(game_id, wine_id).await?;

    Ok(Json(wine.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/games/:game_id/wines", get(list_wines).post(create_wine))
        .route(
            "/games/:game_id/wines/:wine_id",
            get(wine).put(update_wine).delete(delete_wine),
        )
}
