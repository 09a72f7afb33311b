use log::info;
use rating_party_core::{Claims, GateError, Identity, IssuedToken, Requirement, TokenError};
use thiserror::Error;
use uuid::Uuid;

use crate::{DatabaseError, NewParticipant, ParticipantData, PartyContext};

/// Keys a leaderboard row already uses, so no username may take them
pub const RESERVED_USERNAMES: [&str; 6] =
    ["wineId", "wineName", "wineCode", "wineYear", "avg", "rank"];

pub const MAX_USERNAME_LENGTH: usize = 64;

pub struct Auth {
    context: PartyContext,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Passcode is incorrect, or no game has the given join code
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid username: {0}")]
    InvalidUsername(&'static str),
    #[error(transparent)]
    Token(TokenError),
    #[error(transparent)]
    Gate(GateError),
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

/// The outcome of a successful sign-in
#[derive(Debug)]
pub enum SignIn {
    Admin {
        token: IssuedToken,
    },
    Participant {
        token: IssuedToken,
        participant: ParticipantData,
    },
}

impl SignIn {
    pub fn token(&self) -> &IssuedToken {
        match self {
            Self::Admin { token } => token,
            Self::Participant { token, .. } => token,
        }
    }
}

impl Auth {
    pub fn new(context: &PartyContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Signs in either the administrator or a participant of a game.
    ///
    /// The admin username only ever takes the admin path. Any other username
    /// joins the game whose code equals the passcode, creating the participant
    /// on first sign-in.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<SignIn, AuthError> {
        let username = credentials.username.trim();

        if username == self.context.config.admin_subject {
            let token = self
                .context
                .tokens
                .issue_admin(&credentials.passcode)
                .map_err(|e| match e {
                    TokenError::InvalidPasscode => AuthError::InvalidCredentials,
                    e => AuthError::Token(e),
                })?;

            info!("Administrator signed in");
            return Ok(SignIn::Admin { token });
        }

        validate_username(username)?;

        let game = self
            .context
            .database
            .game_by_code(&credentials.passcode)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AuthError::InvalidCredentials,
                e => AuthError::Db(e),
            })?;

        let participant = self
            .context
            .database
            .find_or_create_participant(NewParticipant {
                game_id: game.id,
                username: username.to_string(),
            })
            .await
            .map_err(AuthError::Db)?;

        let token = self
            .context
            .tokens
            .issue_participant(participant.id, game.id)
            .map_err(AuthError::Token)?;

        info!(
            "{} signed in to game {} ({})",
            participant.username, game.name, game.id
        );

        Ok(SignIn::Participant { token, participant })
    }

    /// Validates a raw bearer token
    pub fn authenticate(&self, raw: &str) -> Result<Claims, AuthError> {
        self.context.tokens.validate(raw).map_err(AuthError::Token)
    }

    /// Admits or denies authenticated claims for a route, returning the caller's identity
    pub fn authorize(
        &self,
        requirement: Requirement,
        claims: Option<&Claims>,
        game_id: Option<Uuid>,
    ) -> Result<Identity, AuthError> {
        self.context
            .gate
            .authorize(requirement, claims, game_id)
            .map_err(AuthError::Gate)
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername("username is empty"));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername("username is too long"));
    }

    if RESERVED_USERNAMES.contains(&username) {
        return Err(AuthError::InvalidUsername("username is reserved"));
    }

    Ok(())
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub passcode: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rating_party_core::AuthConfig;

    use super::*;
    use crate::{GameData, MemoryDatabase, Party};

    async fn setup() -> (Party, GameData) {
        let party = Party::new(MemoryDatabase::new(), AuthConfig::new("ivory", "ebony"));
        let game = party.games.create("Friday tasting").await.unwrap();

        (party, game)
    }

    fn credentials(username: &str, passcode: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            passcode: passcode.to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_sign_in() {
        let (party, _) = setup().await;

        let sign_in = party.auth.sign_in(credentials("admin", "ivory")).await.unwrap();
        assert!(matches!(sign_in, SignIn::Admin { .. }));

        let claims = party.auth.authenticate(&sign_in.token().token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.game_id, None);
    }

    #[tokio::test]
    async fn test_admin_wrong_passcode() {
        let (party, game) = setup().await;

        // A game code is not an admin passcode
        let result = party.auth.sign_in(credentials("admin", &game.code)).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_participant_sign_in() {
        let (party, game) = setup().await;

        let sign_in = party
            .auth
            .sign_in(credentials("  alice ", &game.code))
            .await
            .unwrap();

        let SignIn::Participant { token, participant } = sign_in else {
            panic!("expected a participant sign-in");
        };

        assert_eq!(participant.username, "alice");
        assert_eq!(participant.game_id, game.id);

        let claims = party.auth.authenticate(&token.token).unwrap();
        assert_eq!(claims.sub, participant.id.to_string());
        assert_eq!(claims.game_id, Some(game.id.to_string()));

        let identity = party
            .auth
            .authorize(Requirement::AuthenticatedInGame, Some(&claims), Some(game.id))
            .unwrap();
        assert_eq!(identity.participant_id(), Some(participant.id));
    }

    #[tokio::test]
    async fn test_unknown_game_code() {
        let (party, _) = setup().await;

        let result = party.auth.sign_in(credentials("alice", "ZZZZZZ")).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_invalid_usernames() {
        let (party, game) = setup().await;
        let long_username = "x".repeat(65);

        for username in ["", "   ", "avg", "wineName", long_username.as_str()] {
            let result = party.auth.sign_in(credentials(username, &game.code)).await;

            assert!(
                matches!(result, Err(AuthError::InvalidUsername(_))),
                "{username:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_repeated_sign_in_is_same_participant() {
        let (party, game) = setup().await;

        let first = party.auth.sign_in(credentials("bob", &game.code)).await.unwrap();
        let second = party.auth.sign_in(credentials("bob", &game.code)).await.unwrap();

        let first_claims = party.auth.authenticate(&first.token().token).unwrap();
        let second_claims = party.auth.authenticate(&second.token().token).unwrap();

        assert_eq!(first_claims.sub, second_claims.sub);
        assert_eq!(party.participants.list(game.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_sign_ins_converge() {
        let (party, game) = setup().await;
        let party = Arc::new(party);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let party = party.clone();
                let code = game.code.clone();

                tokio::spawn(async move {
                    let sign_in = party.auth.sign_in(credentials("carol", &code)).await.unwrap();
                    party.auth.authenticate(&sign_in.token().token).unwrap().sub
                })
            })
            .collect();

        let mut subjects = Vec::new();
        for handle in handles {
            subjects.push(handle.await.unwrap());
        }

        subjects.dedup();
        assert_eq!(subjects.len(), 1);
        assert_eq!(party.participants.list(game.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_participant_cannot_reach_other_game() {
        let (party, game) = setup().await;
        let other = party.games.create("Saturday tasting").await.unwrap();

        let sign_in = party.auth.sign_in(credentials("dave", &game.code)).await.unwrap();
        let claims = party.auth.authenticate(&sign_in.token().token).unwrap();

        let result = party
            .auth
            .authorize(Requirement::AuthenticatedInGame, Some(&claims), Some(other.id));

        assert!(matches!(result, Err(AuthError::Gate(GateError::GameMismatch))));
    }
}
