mod auth;
mod context;
mod docs;
mod errors;
mod games;
mod ratings;
mod request;
mod schemas;
mod serialized;
mod sessions;
mod wines;

use std::{
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::{middleware, routing::get};
use log::info;
use rating_party_collab::Party;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::ServerContext;
pub use errors::{ServerError, ServerResult};
pub use request::{RequestContext, REQUEST_ID_HEADER};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 3000;

pub type Router = axum::Router<ServerContext>;

/// Builds the complete application, with every route under `/api/v1`
pub fn app(party: Party) -> axum::Router {
    let context = ServerContext {
        party: Arc::new(party),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .merge(sessions::router())
        .merge(games::router())
        .merge(wines::router())
        .merge(ratings::router());

    Router::new()
        .nest("/api/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .fallback(not_found)
        .layer(middleware::from_fn(request::track_requests))
        .layer(cors)
        .with_state(context)
}

/// Starts the rating party server
pub async fn run_server(party: Party, port: u16) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on {}", addr);

    axum::serve(listener, app(party).into_make_service()).await
}

async fn not_found() -> ServerError {
    ServerError::NotFound {
        resource: "route",
        identifier: "path",
    }
}
