//! Shopper sign-in.
//!
//! Identity is delegated to Firebase Authentication. The storefront never
//! sees or stores password hashes; it exchanges an email and password for the
//! account's uid and email and keeps that [`Identity`] in the session.

mod error;

pub use error::AuthError;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use zenos_core::{Email, Identity};

use crate::config::FirebaseConfig;

const SIGN_IN_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

/// Exchanges credentials for an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password,
    /// or a transport/provider error.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Identity, AuthError>;
}

/// Firebase Authentication REST client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl FirebaseAuthClient {
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self::with_endpoint(config, SIGN_IN_URL)
    }

    /// Create a client against a non-default endpoint (emulators, tests).
    #[must_use]
    pub fn with_endpoint(config: &FirebaseConfig, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&SignInRequest {
                email: email.as_str(),
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(map_error_code(status.as_u16(), &code));
        }

        let signed_in: SignInResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Provider {
                status: status.as_u16(),
                message: format!("unexpected response: {e}"),
            })?;

        debug!(uid = %signed_in.local_id, "Signed in");
        Ok(signed_in.into_identity())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SignInResponse {
    fn into_identity(self) -> Identity {
        let email = self.email.and_then(|e| Email::parse(&e).ok());
        Identity::new(self.local_id, email)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error code to an `AuthError`.
///
/// Codes may carry a detail suffix, e.g. `TOO_MANY_ATTEMPTS_TRY_LATER : ...`.
fn map_error_code(status: u16, message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_EMAIL"
        | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        _ => AuthError::Provider {
            status,
            message: message.to_string(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    fn config() -> FirebaseConfig {
        FirebaseConfig {
            project_id: "zenos-motors".to_string(),
            api_key: SecretString::from("AIzaSyD3k9Qw7pLm2Xv8Rt5Yb1Nc4Hj6Gf0Ez"),
            collection: "cards".to_string(),
        }
    }

    /// Fake Identity Toolkit accepting one account.
    async fn serve_identity_toolkit() -> String {
        let app = Router::new().route(
            "/signIn",
            post(|Json(body): Json<Value>| async move {
                if body["email"] == "admin@gmail.com" && body["password"] == "hunter22" {
                    (
                        axum::http::StatusCode::OK,
                        Json(json!({
                            "localId": "uid-1",
                            "email": "admin@gmail.com",
                            "idToken": "token",
                            "registered": true
                        })),
                    )
                } else {
                    (
                        axum::http::StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}
                        })),
                    )
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/signIn")
    }

    #[test]
    fn test_map_error_code() {
        assert!(matches!(
            map_error_code(400, "INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_code(400, "TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
            AuthError::TooManyAttempts
        ));
        assert!(matches!(
            map_error_code(400, "USER_DISABLED"),
            AuthError::UserDisabled
        ));
        assert!(matches!(
            map_error_code(500, "INTERNAL"),
            AuthError::Provider { status: 500, .. }
        ));
    }

    #[test]
    fn test_response_without_email() {
        let response: SignInResponse = serde_json::from_str(r#"{"localId": "anon"}"#).unwrap();
        let identity = response.into_identity();
        assert_eq!(identity.uid, "anon");
        assert!(identity.email.is_none());
    }

    #[tokio::test]
    async fn test_sign_in() {
        let endpoint = serve_identity_toolkit().await;
        let client = FirebaseAuthClient::with_endpoint(&config(), endpoint);
        let email = Email::parse("admin@gmail.com").unwrap();

        let identity = client.sign_in(&email, "hunter22").await.unwrap();
        assert_eq!(identity.uid, "uid-1");
        assert_eq!(identity.email, Some(email.clone()));

        let wrong = client.sign_in(&email, "nope").await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_empty_password_short_circuits() {
        let client = FirebaseAuthClient::with_endpoint(&config(), "http://127.0.0.1:9/unused");
        let email = Email::parse("a@b.co").unwrap();
        assert!(matches!(
            client.sign_in(&email, "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
