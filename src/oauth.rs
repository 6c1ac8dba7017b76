use serde::Deserialize;
use std::time::Duration;

use crate::{config::AppConfig, error::ApiError};

const GOOGLE_DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";

// Fallbacks used when the discovery document cannot be fetched.
const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

// Outbound calls are bounded so a slow provider cannot hold a request open.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// ProviderEndpoints
///
/// The subset of the OpenID discovery document this client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            authorization_endpoint: DEFAULT_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: DEFAULT_USERINFO_ENDPOINT.to_string(),
        }
    }
}

/// VerifiedIdentity
///
/// Profile of a subject whose email the provider has verified. Only this
/// type crosses from the OAuth layer into the user directory; unverified
/// identities never get one.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct RawUserInfo {
    sub: String,
    email: String,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// GoogleOAuthClient
///
/// Exchanges an authorization code from the provider's redirect callback for
/// a verified identity: code -> access token -> userinfo. Construction takes
/// explicit credentials; nothing here reads the environment.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    discovery_url: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            discovery_url: GOOGLE_DISCOVERY_URL.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
        )
    }

    /// Overrides the discovery document location. Used by tests to point the
    /// client at a stub provider.
    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = url.into();
        self
    }

    /// endpoints
    ///
    /// Fetches the discovery document, falling back to the known Google
    /// endpoints when the fetch fails. Login must still work during a
    /// transient discovery outage.
    pub async fn endpoints(&self) -> ProviderEndpoints {
        match self
            .http
            .get(&self.discovery_url)
            .timeout(DISCOVERY_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.json::<ProviderEndpoints>().await.unwrap_or_else(|e| {
                tracing::warn!("discovery document malformed, using defaults: {}", e);
                ProviderEndpoints::default()
            }),
            Err(e) => {
                tracing::warn!("discovery fetch failed, using defaults: {}", e);
                ProviderEndpoints::default()
            }
        }
    }

    /// authorize_url
    ///
    /// Builds the provider URL the browser is redirected to. `state` carries
    /// the frontend's returnTo path through the round trip.
    pub async fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> String {
        let endpoints = self.endpoints().await;

        let mut url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&prompt=select_account",
            endpoints.authorization_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("openid email profile"),
        );
        if let Some(state) = state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }
        url
    }

    /// verify_code
    ///
    /// Full code-for-identity exchange. Fails with `UpstreamAuth` on any
    /// transport or provider error and with `EmailNotVerified` when the
    /// provider has not verified the subject's email; in the latter case no
    /// user record may be created or updated from this identity.
    pub async fn verify_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<VerifiedIdentity, ApiError> {
        let endpoints = self.endpoints().await;

        let token_resp = self
            .http
            .post(&endpoints.token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamAuth(format!("token exchange failed: {e}")))?;

        if !token_resp.status().is_success() {
            return Err(ApiError::UpstreamAuth(format!(
                "token endpoint returned {}",
                token_resp.status()
            )));
        }

        let token: TokenResponse = token_resp
            .json()
            .await
            .map_err(|e| ApiError::UpstreamAuth(format!("token response malformed: {e}")))?;

        let userinfo: RawUserInfo = self
            .http
            .get(&endpoints.userinfo_endpoint)
            .bearer_auth(&token.access_token)
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamAuth(format!("userinfo fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| ApiError::UpstreamAuth(format!("userinfo malformed: {e}")))?;

        if userinfo.email_verified != Some(true) {
            return Err(ApiError::EmailNotVerified);
        }

        let name = userinfo.name.unwrap_or_else(|| userinfo.email.clone());

        Ok(VerifiedIdentity {
            sub: userinfo.sub,
            email: userinfo.email,
            name,
            picture: userinfo.picture,
        })
    }
}
