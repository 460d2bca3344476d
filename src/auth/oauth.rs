//! Redirect-based OAuth2 login (Google, GitHub)
//!
//! The CSRF `state` parameter is a signed, short-lived token naming the
//! provider, so callbacks can be validated by any server instance without
//! shared storage.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::models::Provider;
use super::session::unix_now;

/// How long a user has to complete the provider's consent screen
pub const STATE_TTL_SECS: usize = 5 * 60;

const STATE_AUDIENCE: &str = "oauth-state";

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth configuration for all providers
#[derive(Clone, Default)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    /// Public base URL of this API, used to build callback URLs
    pub redirect_base_url: String,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        Self {
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            github_client_id: std::env::var("GITHUB_CLIENT_ID").ok(),
            github_client_secret: std::env::var("GITHUB_CLIENT_SECRET").ok(),
            redirect_base_url: std::env::var("OAUTH_REDIRECT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        }
    }

    fn credentials(&self, provider: Provider) -> Option<(&String, &String)> {
        match provider {
            Provider::Google => self
                .google_client_id
                .as_ref()
                .zip(self.google_client_secret.as_ref()),
            Provider::Github => self
                .github_client_id
                .as_ref()
                .zip(self.github_client_secret.as_ref()),
        }
    }

    pub fn is_provider_configured(&self, provider: Provider) -> bool {
        self.credentials(provider).is_some()
    }

    pub fn callback_url(&self, provider: Provider) -> String {
        format!(
            "{}/api/auth/oauth/{}/callback",
            self.redirect_base_url.trim_end_matches('/'),
            provider.as_str()
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    provider: Provider,
    nonce: String,
    aud: String,
    exp: usize,
    iat: usize,
}

/// OAuth manager
pub struct OAuthManager {
    config: OAuthConfig,
    http_client: HttpClient,
    state_encoding: EncodingKey,
    state_decoding: DecodingKey,
}

impl OAuthManager {
    pub fn new(config: OAuthConfig, state_secret: &str) -> Self {
        // token endpoints must not be followed through redirects
        let http_client = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            config,
            http_client,
            state_encoding: EncodingKey::from_secret(state_secret.as_bytes()),
            state_decoding: DecodingKey::from_secret(state_secret.as_bytes()),
        }
    }

    /// Providers with both client id and secret configured
    pub fn get_configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.config.is_provider_configured(*p))
            .collect()
    }

    /// Get authorization URL for a provider
    pub fn authorize_url(&self, provider: Provider) -> Result<String, AuthError> {
        let client = self.create_client(provider)?;
        let state = self.issue_state(provider)?;

        let mut auth_request = client.authorize_url(move || CsrfToken::new(state));
        for scope in scopes(provider) {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (url, _state) = auth_request.url();
        Ok(url.to_string())
    }

    /// Validate the callback state and exchange the code for a provider access token
    pub async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        state: &str,
    ) -> Result<String, AuthError> {
        self.verify_state(provider, state)?;
        let client = self.create_client(provider)?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        Ok(token_result.access_token().secret().clone())
    }

    pub fn issue_state(&self, provider: Provider) -> Result<String, AuthError> {
        let mut nonce = [0u8; 16];
        getrandom::getrandom(&mut nonce)?;

        let now = unix_now();
        let claims = StateClaims {
            provider,
            nonce: URL_SAFE_NO_PAD.encode(nonce),
            aud: STATE_AUDIENCE.to_string(),
            exp: now + STATE_TTL_SECS,
            iat: now,
        };
        Ok(encode(&Header::default(), &claims, &self.state_encoding)?)
    }

    pub fn verify_state(&self, provider: Provider, state: &str) -> Result<(), AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(&[STATE_AUDIENCE]);
        validation.leeway = 0;

        let claims = decode::<StateClaims>(state, &self.state_decoding, &validation)
            .map_err(|_| AuthError::InvalidOAuthState)?
            .claims;

        if claims.provider != provider {
            return Err(AuthError::InvalidOAuthState);
        }
        Ok(())
    }

    fn create_client(&self, provider: Provider) -> Result<ConfiguredClient, AuthError> {
        let (client_id, client_secret) = self
            .config
            .credentials(provider)
            .ok_or(AuthError::ProviderNotConfigured(provider))?;

        let (auth_url, token_url) = match provider {
            Provider::Google => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
            ),
            Provider::Github => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
            ),
        };

        let redirect_url = RedirectUrl::new(self.config.callback_url(provider)).map_err(|e| {
            log::error!("Invalid OAuth redirect base URL: {}", e);
            AuthError::ProviderNotConfigured(provider)
        })?;
        let auth_url = AuthUrl::new(auth_url.to_string())
            .map_err(|_| AuthError::ProviderNotConfigured(provider))?;
        let token_url = TokenUrl::new(token_url.to_string())
            .map_err(|_| AuthError::ProviderNotConfigured(provider))?;

        Ok(BasicClient::new(ClientId::new(client_id.clone()))
            .set_client_secret(ClientSecret::new(client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url))
    }
}

fn scopes(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Google => &["openid", "email", "profile"],
        Provider::Github => &["user:email"],
    }
}
