//! Persistence contracts consumed by the session authority and the cats handlers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{Cat, CatChanges, NewCat, NewIdentity, UserIdentity};
use crate::error::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identity records. Emails arrive already normalised.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create_identity(&self, new: NewIdentity) -> StoreResult<UserIdentity>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserIdentity>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserIdentity>>;

    /// Unconditional overwrite. Fails with `NotFound` for an unknown id.
    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<&str>) -> StoreResult<()>;

    /// Replaces the stored hash only if it still equals `expected`.
    /// Returns `false` when another writer got there first or the id is unknown.
    async fn compare_and_set_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        new: Option<&str>,
    ) -> StoreResult<bool>;
}

/// Cats, with writes scoped to the owning user.
#[async_trait]
pub trait CatStore: Send + Sync {
    async fn create_cat(&self, new: NewCat, owner: Uuid) -> StoreResult<Cat>;

    /// Page of cats ordered by creation time, plus the total count.
    async fn list_cats(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Cat>, i64)>;

    async fn find_cat(&self, id: Uuid) -> StoreResult<Option<Cat>>;

    /// `None` when the cat does not exist or belongs to someone else.
    async fn update_owned_cat(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: CatChanges,
    ) -> StoreResult<Option<Cat>>;

    /// `false` when the cat does not exist or belongs to someone else.
    async fn delete_owned_cat(&self, id: Uuid, owner: Uuid) -> StoreResult<bool>;
}
