use std::time::Duration;

/// The configuration of the capability layer.
///
/// Built once at start-up and handed to [crate::TokenService] and [crate::Gate].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The passcode the administrator signs in with
    pub admin_passcode: String,
    /// The shared HMAC secret tokens are signed with
    pub signing_secret: String,
    /// The `iss` claim written into and expected on every token
    pub issuer: String,
    /// The `aud` claim written into and expected on every token
    pub audience: String,
    /// The `sub` claim that marks a token as an administrator token
    pub admin_subject: String,
    /// How long an issued token stays valid
    pub token_lifetime: Duration,
}

impl AuthConfig {
    pub const DEFAULT_ISSUER: &'static str = "rating-party";
    pub const DEFAULT_ADMIN_SUBJECT: &'static str = "admin";
    pub const DEFAULT_TOKEN_LIFETIME_IN_HOURS: u64 = 24;

    pub fn new(admin_passcode: impl Into<String>, signing_secret: impl Into<String>) -> Self {
        Self {
            admin_passcode: admin_passcode.into(),
            signing_secret: signing_secret.into(),
            ..Default::default()
        }
    }

    /// Token lifetime in whole seconds, as written into `exp`
    pub fn token_lifetime_in_seconds(&self) -> i64 {
        self.token_lifetime.as_secs() as i64
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_passcode: String::new(),
            signing_secret: String::new(),
            issuer: Self::DEFAULT_ISSUER.to_string(),
            audience: Self::DEFAULT_ISSUER.to_string(),
            admin_subject: Self::DEFAULT_ADMIN_SUBJECT.to_string(),
            token_lifetime: Duration::from_secs(Self::DEFAULT_TOKEN_LIFETIME_IN_HOURS * 60 * 60),
        }
    }
}
