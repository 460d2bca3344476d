//! Authentication data models

use serde::{Deserialize, Serialize};

/// Supported social login providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Github,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Github];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" => Some(Provider::Google),
            "github" => Some(Provider::Github),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A social identity linked to an organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProvider {
    pub provider: Provider,
    pub provider_id: String,
}

impl SocialProvider {
    pub fn new(provider: Provider, provider_id: impl Into<String>) -> Self {
        Self {
            provider,
            provider_id: provider_id.into(),
        }
    }
}

/// Organizer account, the identity root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub social_providers: Vec<SocialProvider>,
    pub created_at: String,
    pub updated_at: String,
}

impl Organizer {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// The linked entry for `provider`, if any
    pub fn linked(&self, provider: Provider) -> Option<&SocialProvider> {
        self.social_providers
            .iter()
            .find(|link| link.provider == provider)
    }

    pub fn has_provider(&self, provider: Provider) -> bool {
        self.linked(provider).is_some()
    }

    /// Password (if set) plus every linked provider
    pub fn auth_method_count(&self) -> usize {
        usize::from(self.has_password()) + self.social_providers.len()
    }
}

/// Fields for a new organizer record
#[derive(Debug, Clone)]
pub struct NewOrganizer {
    pub email: String,
    pub password_hash: Option<String>,
    pub social_providers: Vec<SocialProvider>,
}

/// Identity returned by a provider for a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub provider_id: String,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "organizerId")]
    pub organizer_id: String,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at timestamp
}

/// Tag shown in the profile for each way an organizer can sign in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Email,
    Google,
    Github,
}

impl From<Provider> for AuthMethod {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Google => AuthMethod::Google,
            Provider::Github => AuthMethod::Github,
        }
    }
}

/// Public view of an organizer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

impl From<&Organizer> for OrganizerResponse {
    fn from(organizer: &Organizer) -> Self {
        Self {
            id: organizer.id.clone(),
            email: organizer.email.clone(),
            created_at: organizer.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProfile {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub auth_methods: Vec<AuthMethod>,
    pub social_providers: Vec<SocialProvider>,
}

/// Longest address accepted anywhere an email is entered
pub const EMAIL_MAX: usize = 254;

/// Light shape check: one `@`, a non-empty local part, a dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// API request/response types
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Provider-issued token from a client-side OAuth flow
#[derive(Debug, Deserialize)]
pub struct SocialTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// OAuth callback query
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
