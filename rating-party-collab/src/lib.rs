mod auth;
mod db;
mod games;
mod participants;
mod ratings;
mod util;
mod wines;

use std::sync::Arc;

pub use auth::*;
pub use db::*;
pub use games::*;
pub use participants::*;
pub use ratings::*;
pub use wines::*;

use rating_party_core::{AuthConfig, Gate, TokenService};

/// The rating party system, facilitating sign-in, game management, rating, and more.
pub struct Party {
    pub auth: Auth,
    pub games: GameManager,
    pub wines: WineManager,
    pub participants: ParticipantManager,
    pub ratings: RatingManager,
}

/// A type passed to the various managers of the system, to access shared state.
#[derive(Clone)]
pub struct PartyContext {
    pub database: Arc<dyn Database>,
    pub tokens: Arc<TokenService>,
    pub gate: Arc<Gate>,
    pub config: Arc<AuthConfig>,
}

impl Party {
    pub fn new<Db>(database: Db, config: AuthConfig) -> Self
    where
        Db: Database + 'static,
    {
        let context = PartyContext {
            database: Arc::new(database),
            tokens: Arc::new(TokenService::new(&config)),
            gate: Arc::new(Gate::new(&config)),
            config: Arc::new(config),
        };

        Self {
            auth: Auth::new(&context),
            games: GameManager::new(&context),
            wines: WineManager::new(&context),
            participants: ParticipantManager::new(&context),
            ratings: RatingManager::new(&context),
        }
    }
}
