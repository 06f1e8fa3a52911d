use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user. `password_hash` and `refresh_token_hash` stay inside the server.
#[derive(Debug, Clone, FromRow)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    pub fn new(new: NewIdentity) -> Self {
        let now = Utc::now();
        Self {
            id: new.id,
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            refresh_token_hash: new.refresh_token_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }
}

/// The id is chosen by the caller so a session can be issued before the insert.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub refresh_token_hash: Option<String>,
}

/// Public projection of a user returned by the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<UserIdentity> for UserProfile {
    fn from(user: UserIdentity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub breed: String,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cat {
    pub fn new(new: NewCat, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            age: new.age,
            breed: new.breed,
            added_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: CatChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
        if let Some(breed) = changes.breed {
            self.breed = breed;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCat {
    pub name: String,
    pub age: i32,
    pub breed: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub breed: Option<String>,
}

/// Listing row; owner and update time are left out of the public listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatSummary {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub breed: String,
    pub created_at: DateTime<Utc>,
}

impl From<Cat> for CatSummary {
    fn from(cat: Cat) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            age: cat.age,
            breed: cat.breed,
            created_at: cat.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identity_has_no_session() {
        let user = UserIdentity::new(NewIdentity {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "hash".into(),
            name: "A".into(),
            refresh_token_hash: None,
        });
        assert!(!user.has_session());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_profile_drops_secrets() {
        let mut user = UserIdentity::new(NewIdentity {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "hash".into(),
            name: "A".into(),
            refresh_token_hash: None,
        });
        user.refresh_token_hash = Some("rt".into());
        let json = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_cat_partial_update() {
        let mut cat = Cat::new(
            NewCat { name: "Tom".into(), age: 3, breed: "Tabby".into() },
            Uuid::new_v4(),
        );
        cat.apply(CatChanges { age: Some(4), ..Default::default() });
        assert_eq!(cat.name, "Tom");
        assert_eq!(cat.age, 4);
        assert_eq!(cat.breed, "Tabby");
    }
}
