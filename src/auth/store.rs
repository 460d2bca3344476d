//! Credential store contract

use super::models::{NewOrganizer, Organizer, Provider, SocialProvider};
use crate::db::StoreResult;

/// Persistence for organizer records.
///
/// Writes must report unique-index violations as
/// [`StoreError::Conflict`](crate::db::StoreError::Conflict) naming the
/// constraint, since both `email` and `(provider, provider_id)` are unique.
pub trait OrganizerStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Organizer>>;

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Organizer>>;

    fn find_by_provider_identity(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> StoreResult<Option<Organizer>>;

    /// Insert a new organizer, assigning its id and timestamps
    fn create(&self, organizer: NewOrganizer) -> StoreResult<Organizer>;

    /// Append one provider link after the organizer's existing ones.
    ///
    /// Fails with `NotFound` when the organizer does not exist.
    fn add_provider(&self, organizer_id: &str, link: &SocialProvider) -> StoreResult<()>;

    /// Remove the organizer's link for `provider` unless it is their last
    /// sign-in method. Returns whether a link was removed.
    fn remove_provider(&self, organizer_id: &str, provider: Provider) -> StoreResult<bool>;
}
