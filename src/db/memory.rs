//! Process-local store used by the test-suite and for running without Postgres.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Cat, CatChanges, NewCat, NewIdentity, UserIdentity};
use crate::db::store::{CatStore, CredentialStore, StoreResult};
use crate::error::StoreError;

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, UserIdentity>,
    id_by_email: HashMap<String, Uuid>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<Users>>,
    cats: Arc<RwLock<HashMap<Uuid, Cat>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_id.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_identity(&self, new: NewIdentity) -> StoreResult<UserIdentity> {
        let mut users = self.users.write().await;
        if users.id_by_email.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = UserIdentity::new(new);
        users.id_by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserIdentity>> {
        let users = self.users.read().await;
        Ok(users
            .id_by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserIdentity>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<&str>) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.refresh_token_hash = hash.map(str::to_owned);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn compare_and_set_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        new: Option<&str>,
    ) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.by_id.get_mut(&id) {
            Some(user) if user.refresh_token_hash.as_deref() == Some(expected) => {
                user.refresh_token_hash = new.map(str::to_owned);
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CatStore for MemoryStore {
    async fn create_cat(&self, new: NewCat, owner: Uuid) -> StoreResult<Cat> {
        let cat = Cat::new(new, owner);
        self.cats.write().await.insert(cat.id, cat.clone());
        Ok(cat)
    }

    async fn list_cats(&self, offset: i64, limit: i64) -> StoreResult<(Vec<Cat>, i64)> {
        let cats = self.cats.read().await;
        let mut all: Vec<&Cat> = cats.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, cats.len() as i64))
    }

    async fn find_cat(&self, id: Uuid) -> StoreResult<Option<Cat>> {
        Ok(self.cats.read().await.get(&id).cloned())
    }

    async fn update_owned_cat(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: CatChanges,
    ) -> StoreResult<Option<Cat>> {
        let mut cats = self.cats.write().await;
        match cats.get_mut(&id) {
            Some(cat) if cat.added_by == owner => {
                cat.apply(changes);
                Ok(Some(cat.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_owned_cat(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let mut cats = self.cats.write().await;
        let owned = cats.get(&id).map_or(false, |cat| cat.added_by == owner);
        if owned {
            cats.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> NewIdentity {
        NewIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Tester".to_string(),
            refresh_token_hash: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_creates_nothing() {
        let store = MemoryStore::new();
        store.create_identity(identity("a@x.com")).await.unwrap();

        let err = store.create_identity(identity("a@x.com")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = MemoryStore::new();
        let user = store.create_identity(identity("a@x.com")).await.unwrap();

        assert_eq!(store.find_by_email("a@x.com").await.unwrap().unwrap().id, user.id);
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().email, "a@x.com");
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_refresh_hash_unknown_id() {
        let store = MemoryStore::new();
        let err = store.set_refresh_token_hash(Uuid::new_v4(), Some("h")).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn test_compare_and_set() {
        let store = MemoryStore::new();
        let user = store.create_identity(identity("a@x.com")).await.unwrap();

        // Nothing stored yet, so nothing can match.
        assert!(!store.compare_and_set_refresh_token_hash(user.id, "h1", Some("h2")).await.unwrap());

        store.set_refresh_token_hash(user.id, Some("h1")).await.unwrap();
        assert!(store.compare_and_set_refresh_token_hash(user.id, "h1", Some("h2")).await.unwrap());
        assert!(!store.compare_and_set_refresh_token_hash(user.id, "h1", Some("h3")).await.unwrap());
        assert!(store.compare_and_set_refresh_token_hash(user.id, "h2", None).await.unwrap());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.has_session());
    }

    #[tokio::test]
    async fn test_cat_ownership() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let cat = store
            .create_cat(NewCat { name: "Tom".into(), age: 2, breed: "Tabby".into() }, owner)
            .await
            .unwrap();

        let changes = CatChanges { name: Some("Jerry".into()), ..Default::default() };
        assert!(store.update_owned_cat(cat.id, stranger, changes.clone()).await.unwrap().is_none());
        assert!(!store.delete_owned_cat(cat.id, stranger).await.unwrap());

        let updated = store.update_owned_cat(cat.id, owner, changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "Jerry");
        assert!(store.delete_owned_cat(cat.id, owner).await.unwrap());
        assert!(store.find_cat(cat.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for i in 0..5 {
            store
                .create_cat(NewCat { name: format!("cat{}", i), age: i, breed: "Mix".into() }, owner)
                .await
                .unwrap();
        }

        let (page, total) = store.list_cats(2, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let (page, _) = store.list_cats(4, 10).await.unwrap();
        assert_eq!(page.len(), 1);
    }
}
