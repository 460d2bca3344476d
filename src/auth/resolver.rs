//! Identity resolution: signup, password login and social login

use std::sync::Arc;

use super::error::AuthError;
use super::models::{
    is_valid_email, NewOrganizer, Organizer, OrganizerResponse, Provider, SocialProvider,
    VerifiedIdentity,
};
use super::password::{hash_password, verify_dummy, verify_password};
use super::store::OrganizerStore;
use super::verifier::TokenVerifier;

/// Finds or creates the organizer behind a set of credentials
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn OrganizerStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn OrganizerStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Create a password-based organizer
    pub fn signup(&self, email: &str, password: &str) -> Result<Organizer, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if self.store.find_by_email(email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if password.is_empty() {
            return Err(AuthError::PasswordRequired);
        }

        let organizer = self.store.create(NewOrganizer {
            email: email.to_string(),
            password_hash: Some(hash_password(password)?),
            social_providers: Vec::new(),
        })?;

        log::info!("Organizer {} signed up with email", organizer.id);
        Ok(organizer)
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`;
    /// an account without a password yields `SocialOnlyAccount`.
    pub fn login(&self, email: &str, password: &str) -> Result<Organizer, AuthError> {
        let Some(organizer) = self.store.find_by_email(email)? else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash = organizer
            .password_hash
            .as_deref()
            .ok_or(AuthError::SocialOnlyAccount)?;

        if !verify_password(password, password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(organizer)
    }

    /// Authenticate with a provider-issued token
    pub async fn authenticate_social(
        &self,
        provider: Provider,
        token: &str,
    ) -> Result<Organizer, AuthError> {
        let identity = self.verifier.verify(provider, token).await?;
        self.resolve_identity(provider, identity)
    }

    /// Map a verified provider identity to an organizer, linking or creating as needed
    pub fn resolve_identity(
        &self,
        provider: Provider,
        identity: VerifiedIdentity,
    ) -> Result<Organizer, AuthError> {
        let VerifiedIdentity { email, provider_id } = identity;

        if let Some(linked) = self
            .store
            .find_by_provider_identity(provider, &provider_id)?
        {
            if linked.email != email {
                log::warn!(
                    "{} identity {} is linked to organizer {} under a different email",
                    provider,
                    provider_id,
                    linked.id
                );
                return Err(AuthError::ProviderIdentityConflict);
            }
            return Ok(linked);
        }

        match self.store.find_by_email(&email)? {
            Some(organizer) => {
                if organizer.has_provider(provider) {
                    // a different subject id for a provider this account already uses
                    return Err(AuthError::ProviderIdentityConflict);
                }

                // SECURITY REVIEW: implicit link on email match trusts the
                // provider's email verification for an existing account.
                log::warn!(
                    "Implicitly linking {} identity {} to organizer {} by email match",
                    provider,
                    provider_id,
                    organizer.id
                );
                self.store
                    .add_provider(&organizer.id, &SocialProvider::new(provider, provider_id))?;
                self.store
                    .find_by_id(&organizer.id)?
                    .ok_or(AuthError::NotFound)
            }
            None => {
                let organizer = self.store.create(NewOrganizer {
                    email,
                    password_hash: None,
                    social_providers: vec![SocialProvider::new(provider, provider_id)],
                })?;
                log::info!("Organizer {} signed up with {}", organizer.id, provider);
                Ok(organizer)
            }
        }
    }

    /// Profile lookup for an already-verified session
    pub fn validate_organizer(&self, organizer_id: &str) -> Result<OrganizerResponse, AuthError> {
        self.store
            .find_by_id(organizer_id)?
            .as_ref()
            .map(OrganizerResponse::from)
            .ok_or(AuthError::NotFound)
    }
}
