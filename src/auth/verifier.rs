//! Provider token verification (Google, GitHub)
//!
//! Turns a bearer token obtained by a client-side OAuth flow into the
//! provider's verified email and subject id. Transport errors and unexpected
//! statuses are propagated as they are; nothing here retries.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use super::error::AuthError;
use super::models::{Provider, VerifiedIdentity};

const USER_AGENT: &str = "waitlist-server";

/// Verifies a provider-issued bearer token
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, provider: Provider, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Provider endpoints queried by [`HttpTokenVerifier`]
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub google_tokeninfo: String,
    pub github_user: String,
    pub github_emails: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google_tokeninfo: "https://www.googleapis.com/oauth2/v1/tokeninfo".to_string(),
            github_user: "https://api.github.com/user".to_string(),
            github_emails: "https://api.github.com/user/emails".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Same paths as the real providers, rooted at `base`
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            google_tokeninfo: format!("{}/oauth2/v1/tokeninfo", base),
            github_user: format!("{}/user", base),
            github_emails: format!("{}/user/emails", base),
        }
    }
}

#[derive(Deserialize)]
struct GoogleTokenInfo {
    email: Option<String>,
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct GithubUser {
    id: i64,
    email: Option<String>,
}

#[derive(Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// Token verifier backed by the providers' HTTP APIs
#[derive(Clone)]
pub struct HttpTokenVerifier {
    http_client: HttpClient,
    endpoints: ProviderEndpoints,
}

impl Default for HttpTokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTokenVerifier {
    pub fn new() -> Self {
        Self::with_endpoints(ProviderEndpoints::default())
    }

    pub fn with_endpoints(endpoints: ProviderEndpoints) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoints,
        }
    }

    pub async fn verify_google(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let response = self
            .http_client
            .get(&self.endpoints.google_tokeninfo)
            .query(&[("access_token", token)])
            .send()
            .await?;

        if response.status().is_client_error() {
            return Err(AuthError::InvalidToken);
        }

        let info: GoogleTokenInfo = response.error_for_status()?.json().await?;
        let email = info
            .email
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::InvalidToken)?;
        let provider_id = info.user_id.ok_or(AuthError::InvalidToken)?;

        Ok(VerifiedIdentity { email, provider_id })
    }

    pub async fn verify_github(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let response = self.github_get(&self.endpoints.github_user, token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken);
        }
        let user: GithubUser = response.error_for_status()?.json().await?;

        // No public email on the profile: fall back to the emails endpoint
        let email = match user.email.filter(|email| !email.is_empty()) {
            Some(email) => email,
            None => self.github_primary_email(token).await?,
        };

        Ok(VerifiedIdentity {
            email,
            provider_id: user.id.to_string(),
        })
    }

    async fn github_primary_email(&self, token: &str) -> Result<String, AuthError> {
        let response = self.github_get(&self.endpoints.github_emails, token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken);
        }
        let emails: Vec<GithubEmail> = response.error_for_status()?.json().await?;

        emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
            .ok_or(AuthError::NoVerifiedEmail)
    }

    async fn github_get(&self, url: &str, token: &str) -> Result<reqwest::Response, AuthError> {
        Ok(self
            .http_client
            .get(url)
            .bearer_auth(token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?)
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, provider: Provider, token: &str) -> Result<VerifiedIdentity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let identity = match provider {
            Provider::Google => self.verify_google(token).await?,
            Provider::Github => self.verify_github(token).await?,
        };
        log::debug!(
            "Verified {} token for subject {}",
            provider,
            identity.provider_id
        );
        Ok(identity)
    }
}
