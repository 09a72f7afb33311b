use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{header, request::Parts},
};
use rating_party_core::{Identity, Requirement};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    context::ServerContext,
    errors::ServerError,
    request::RequestContext,
};

/// A route requirement that can be named in a handler signature
pub trait RouteRequirement: Send + Sync + 'static {
    const REQUIREMENT: Requirement;
}

/// Only the administrator may call the route
pub struct AdminOnly;

/// The administrator, or a participant of the game in the path
pub struct InGame;

impl RouteRequirement for AdminOnly {
    const REQUIREMENT: Requirement = Requirement::AdminOnly;
}

impl RouteRequirement for InGame {
    const REQUIREMENT: Requirement = Requirement::AuthenticatedInGame;
}

/// Proof that the caller passed authentication and the gate for requirement `R`
pub struct Access<R> {
    pub identity: Identity,
    requirement: PhantomData<R>,
}

#[async_trait]
impl<R> FromRequestParts<ServerContext> for Access<R>
where
    R: RouteRequirement,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let request = parts
            .extensions
            .get::<Arc<RequestContext>>()
            .cloned()
            .ok_or_else(|| ServerError::Internal("Request is not being tracked".to_string()))?;

        let token = bearer_token(parts)?;
        let claims = state.party.auth.authenticate(token)?;
        request.set_claims(claims);

        let game_id = path_game_id(parts, state).await?;

        let identity = state.party.auth.authorize(
            R::REQUIREMENT,
            request.claims().as_ref(),
            game_id,
        )?;
        request.set_identity(identity);

        Ok(Self {
            identity,
            requirement: PhantomData,
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Result<&str, ServerError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServerError::Unauthorized("Missing authorization".to_string()))?
        .to_str()
        .map_err(|_| ServerError::Unauthorized("Authorization header is malformed".to_string()))?;

    let mut split = header.split_ascii_whitespace();

    match (split.next(), split.next(), split.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(ServerError::Unauthorized(
            "Authorization must be Bearer".to_string(),
        )),
    }
}

/// The game named by the request path, if the route has one
async fn path_game_id(
    parts: &mut Parts,
    state: &ServerContext,
) -> Result<Option<Uuid>, ServerError> {
    let Ok(Path(params)) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await
    else {
        return Ok(None);
    };

    params
        .get("game_id")
        .map(|id| {
            id.parse::<Uuid>()
                .map_err(|_| ServerError::BadRequest("Game id must be a UUID".to_string()))
        })
        .transpose()
}

/// Wraps [Path] so a bad path parameter becomes a JSON error
pub struct ServerPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ServerPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        Ok(Self(value))
    }
}
