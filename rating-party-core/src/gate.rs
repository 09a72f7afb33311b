use thiserror::Error;
use uuid::Uuid;

use crate::{AuthConfig, Claims};

/// What a route demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may call the route
    Public,
    /// The caller must be an admin, or a participant of the game in the path
    AuthenticatedInGame,
    /// The caller must be an admin
    AdminOnly,
}

/// The effective identity of a caller once the gate has admitted them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// No credential was presented on a public route
    Anonymous,
    Admin,
    Participant {
        participant_id: Uuid,
        game_id: Uuid,
    },
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn participant_id(&self) -> Option<Uuid> {
        match self {
            Self::Participant { participant_id, .. } => Some(*participant_id),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Admin access is required")]
    AdminRequired,
    #[error("Token is not scoped to this game")]
    GameMismatch,
    #[error("Token is missing the {0} claim")]
    MissingClaim(&'static str),
    #[error("Token claim {0} is malformed")]
    MalformedClaim(&'static str),
    /// The route declared a game scope but the path carries no game
    #[error("Route does not identify a game")]
    MissingGame,
    /// The gate ran before authentication populated the claims
    #[error("Authorization was attempted before authentication")]
    NotAuthenticated,
}

impl GateError {
    /// Every denial is a forbidden request, except for a pipeline that is wired wrong
    pub fn is_forbidden(&self) -> bool {
        !matches!(self, Self::NotAuthenticated)
    }
}

/// Decides whether validated claims may access a route, and who the caller is.
pub struct Gate {
    admin_subject: String,
}

impl Gate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            admin_subject: config.admin_subject.clone(),
        }
    }

    /// Admits or denies a caller.
    ///
    /// `claims` are the claims authentication produced, if any, and `game_id`
    /// is the game named by the request path, if the route has one.
    pub fn authorize(
        &self,
        requirement: Requirement,
        claims: Option<&Claims>,
        game_id: Option<Uuid>,
    ) -> Result<Identity, GateError> {
        if requirement == Requirement::Public {
            let identity = claims
                .and_then(|c| self.identify(c).ok())
                .unwrap_or(Identity::Anonymous);

            return Ok(identity);
        }

        let claims = claims.ok_or(GateError::NotAuthenticated)?;

        if claims.sub.is_empty() {
            return Err(GateError::MissingClaim("sub"));
        }

        if claims.sub == self.admin_subject {
            return Ok(Identity::Admin);
        }

        if requirement == Requirement::AdminOnly {
            return Err(GateError::AdminRequired);
        }

        let path_game_id = game_id.ok_or(GateError::MissingGame)?;
        let identity = self.identify(claims)?;

        match identity {
            Identity::Participant { game_id, .. } if game_id == path_game_id => Ok(identity),
            _ => Err(GateError::GameMismatch),
        }
    }

    /// Derives the identity encoded in the claims, without looking at any route
    fn identify(&self, claims: &Claims) -> Result<Identity, GateError> {
        if claims.sub == self.admin_subject {
            return Ok(Identity::Admin);
        }

        let game_id = claims
            .game_id
            .as_deref()
            .ok_or(GateError::MissingClaim("gameId"))?
            .parse::<Uuid>()
            .map_err(|_| GateError::MalformedClaim("gameId"))?;

        let participant_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| GateError::MalformedClaim("sub"))?;

        Ok(Identity::Participant {
            participant_id,
            game_id,
        })
    }
}
