//! Account endpoints: sign in, sign up, current user, token refresh.
//!
//! Sign-in and refresh are the only places a token enters the session.
//! Credentials live for the duration of one request and are never stored.

use crate::error::ClientError;
use crate::http::{ApiClient, RequestOptions};
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};

const SIGN_IN_PATH: &str = "/auth/signin";
const SIGN_UP_PATH: &str = "/auth/signup";
const ME_PATH: &str = "/auth/me";
const REFRESH_PATH: &str = "/auth/refresh";

/// Body of `POST /auth/signin`.
#[derive(Clone, Serialize)]
pub struct SignIn {
    pub user_email: String,
    pub password: String,
}

impl SignIn {
    pub fn new(user_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignIn")
            .field("user_email", &self.user_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/signup`.
#[derive(Clone, Serialize)]
pub struct SignUp {
    pub user_name: String,
    pub user_email: String,
    pub password: String,
}

impl std::fmt::Debug for SignUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUp")
            .field("user_name", &self.user_name)
            .field("user_email", &self.user_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Public account data returned by sign-up and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

/// Exchange credentials for a token and store it in `session`.
pub async fn sign_in(
    client: &ApiClient,
    session: &mut SessionStore,
    credentials: &SignIn,
) -> Result<(), ClientError> {
    let response: TokenResponse = client
        .post(SIGN_IN_PATH, Some(credentials), RequestOptions::new())
        .await
        .map_err(|e| e.with_fallback("Failed to sign in"))?;

    let token = accept_token(response)?;
    session.set_token(Some(token))?;
    tracing::info!("Signed in as {}", credentials.user_email);
    Ok(())
}

/// Create an account. Does not sign in.
pub async fn sign_up(client: &ApiClient, account: &SignUp) -> Result<UserProfile, ClientError> {
    let profile: UserProfile = client
        .post(SIGN_UP_PATH, Some(account), RequestOptions::new())
        .await
        .map_err(|e| e.with_fallback("Failed to sign up"))?;

    tracing::info!("Registered account {}", profile.user_email);
    Ok(profile)
}

/// Account behind the current token.
pub async fn current_user(
    client: &ApiClient,
    session: &SessionStore,
) -> Result<UserProfile, ClientError> {
    session
        .authenticated_call(|token| async move {
            client.get(ME_PATH, RequestOptions::authorized(&token)).await
        })
        .await
        .map_err(|e| e.with_fallback("Failed to load account"))
}

/// Swap the current token for a freshly issued one.
pub async fn refresh(client: &ApiClient, session: &mut SessionStore) -> Result<(), ClientError> {
    let response: TokenResponse = session
        .authenticated_call(|token| async move {
            client
                .post::<(), _>(REFRESH_PATH, None, RequestOptions::authorized(&token))
                .await
        })
        .await
        .map_err(|e| e.with_fallback("Failed to refresh token"))?;

    let token = accept_token(response)?;
    session.set_token(Some(token))?;
    tracing::debug!("Session token refreshed");
    Ok(())
}

fn accept_token(response: TokenResponse) -> Result<String, ClientError> {
    if !response.token_type.eq_ignore_ascii_case("bearer") {
        return Err(ClientError::Decode(format!(
            "unsupported token type '{}'",
            response.token_type
        )));
    }
    if response.access_token.trim().is_empty() {
        return Err(ClientError::Decode("empty access token".into()));
    }
    Ok(response.access_token)
}
