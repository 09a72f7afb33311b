use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::AuthConfig;

/// The claims carried by a capability token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The admin sentinel, or the id of a participant
    pub sub: String,
    /// The game a participant joined. Admin tokens carry none.
    #[serde(rename = "gameId", default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// A freshly signed token along with the claims it encodes
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The offered admin passcode does not match
    #[error("Invalid passcode")]
    InvalidPasscode,
    #[error("Token has expired")]
    Expired,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token was signed with an unexpected algorithm")]
    UnexpectedAlgorithm,
    /// Anything else that makes the token unreadable, including missing claims
    #[error("Token is malformed: {0}")]
    Malformed(String),
    /// Signing failed, this is never the caller's fault
    #[error("Token could not be signed: {0}")]
    Signing(String),
}

/// Issues and validates capability tokens.
///
/// Tokens are HMAC signed with a single shared secret. The service keeps no
/// state besides its keys, so validity is a function of the signature and `exp`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: AuthConfig,
}

impl TokenService {
    const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
    const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
        [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.signing_secret.as_bytes();

        let mut validation = Validation::new(Self::SIGNING_ALGORITHM);
        validation.algorithms = Self::ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            config: config.clone(),
        }
    }

    /// Issues an unrestricted administrator token if the passcode matches
    pub fn issue_admin(&self, passcode: &str) -> Result<IssuedToken, TokenError> {
        if self.config.admin_passcode.is_empty() || passcode != self.config.admin_passcode {
            return Err(TokenError::InvalidPasscode);
        }

        self.issue(self.config.admin_subject.clone(), None)
    }

    /// Issues a token scoped to a single participant in a single game
    pub fn issue_participant(
        &self,
        participant_id: Uuid,
        game_id: Uuid,
    ) -> Result<IssuedToken, TokenError> {
        self.issue(participant_id.to_string(), Some(game_id.to_string()))
    }

    /// Verifies the signature, algorithm, issuer, audience and expiry of a raw token
    pub fn validate(&self, raw: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(raw, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnexpectedAlgorithm
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        // The decoder still accepts a token expiring this very second
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    fn issue(&self, sub: String, game_id: Option<String>) -> Result<IssuedToken, TokenError> {
        let issued_at = Utc::now().timestamp();

        let claims = Claims {
            sub,
            game_id,
            iat: issued_at,
            exp: issued_at + self.config.token_lifetime_in_seconds(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = self.sign(&claims)?;

        Ok(IssuedToken { token, claims })
    }

    pub(crate) fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(
            &Header::new(Self::SIGNING_ALGORITHM),
            claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
