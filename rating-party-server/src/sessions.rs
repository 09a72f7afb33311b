use axum::{extract::State, routing::post, Json};
use rating_party_collab::Credentials;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{SignInSchema, ValidatedJson},
    serialized::{SignInResult, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/signin",
    tag = "sessions",
    request_body = SignInSchema,
    responses(
        (status = 200, body = SignInResult),
        (status = 400, body = crate::errors::ErrorBody, description = "Username is invalid"),
        (status = 401, body = crate::errors::ErrorBody, description = "Passcode matches neither the admin nor a game")
    )
)]
async fn sign_in(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SignInSchema>,
) -> ServerResult<Json<SignInResult>> {
    let sign_in = context
        .party
        .auth
        .sign_in(Credentials {
            username: body.username,
            passcode: body.passcode,
        })
        .await?;

    Ok(Json(sign_in.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/signin", post(sign_in))
}
