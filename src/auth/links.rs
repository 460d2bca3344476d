//! Linking and unlinking social providers on an authenticated organizer

use std::sync::Arc;

use super::error::AuthError;
use super::models::{AuthMethod, FullProfile, Organizer, Provider, SocialProvider};
use super::store::OrganizerStore;
use super::verifier::TokenVerifier;

#[derive(Clone)]
pub struct ProviderLinkManager {
    store: Arc<dyn OrganizerStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl ProviderLinkManager {
    pub fn new(store: Arc<dyn OrganizerStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    fn load(&self, organizer_id: &str) -> Result<Organizer, AuthError> {
        self.store
            .find_by_id(organizer_id)?
            .ok_or(AuthError::NotFound)
    }

    /// Attach the identity behind `token` to the organizer
    pub async fn link_provider(
        &self,
        organizer_id: &str,
        provider: Provider,
        token: &str,
    ) -> Result<Organizer, AuthError> {
        let identity = self.verifier.verify(provider, token).await?;
        let organizer = self.load(organizer_id)?;

        if organizer.has_provider(provider) {
            return Err(AuthError::AlreadyLinked);
        }

        if let Some(owner) = self
            .store
            .find_by_provider_identity(provider, &identity.provider_id)?
        {
            if owner.id != organizer.id {
                return Err(AuthError::ProviderTaken);
            }
        }

        self.store.add_provider(
            &organizer.id,
            &SocialProvider::new(provider, identity.provider_id),
        )?;

        log::info!("Linked {} to organizer {}", provider, organizer.id);
        self.load(&organizer.id)
    }

    /// Remove a provider, refusing to leave the organizer without a way to sign in
    pub fn unlink_provider(
        &self,
        organizer_id: &str,
        provider: Provider,
    ) -> Result<Organizer, AuthError> {
        let organizer = self.load(organizer_id)?;
        check_unlink(&organizer, provider)?;

        if !self.store.remove_provider(&organizer.id, provider)? {
            // another request changed the links since they were loaded
            check_unlink(&self.load(&organizer.id)?, provider)?;
            return Err(AuthError::LastMethodRemaining);
        }

        log::info!("Unlinked {} from organizer {}", provider, organizer.id);
        self.load(&organizer.id)
    }

    pub fn get_full_profile(&self, organizer_id: &str) -> Result<FullProfile, AuthError> {
        let organizer = self.load(organizer_id)?;
        Ok(full_profile(organizer))
    }
}

fn check_unlink(organizer: &Organizer, provider: Provider) -> Result<(), AuthError> {
    if !organizer.has_provider(provider) {
        return Err(AuthError::NotLinked);
    }
    if organizer.auth_method_count() <= 1 {
        return Err(AuthError::LastMethodRemaining);
    }
    Ok(())
}

fn full_profile(organizer: Organizer) -> FullProfile {
    let mut auth_methods = Vec::new();
    if organizer.has_password() {
        auth_methods.push(AuthMethod::Email);
    }
    for link in &organizer.social_providers {
        let method = AuthMethod::from(link.provider);
        if !auth_methods.contains(&method) {
            auth_methods.push(method);
        }
    }

    FullProfile {
        id: organizer.id,
        email: organizer.email,
        created_at: organizer.created_at,
        auth_methods,
        social_providers: organizer.social_providers,
    }
}
