use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::hashing::SecretHasher;
use crate::auth::tokens::{TokenKind, TokenPair, TokenSigner};
use crate::config::{AuthConfig, HashingConfig};
use crate::db::models::{NewIdentity, UserIdentity, UserProfile};
use crate::db::store::CredentialStore;
use crate::error::{AppError, AuthError, StoreError};
use crate::validation::normalize_email;
use crate::Result;

/// Caller identity proven by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessIdentity {
    pub subject_id: Uuid,
    pub email: String,
}

/// Issues, rotates and revokes token pairs.
///
/// Each identity holds at most one live refresh token, stored only as a hash.
/// Refresh and logout must present exactly that token; anything else is
/// rejected even if its signature is still valid.
pub struct SessionAuthority {
    store: Arc<dyn CredentialStore>,
    signer: TokenSigner,
    hasher: SecretHasher,
}

impl SessionAuthority {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        auth: &AuthConfig,
        hashing: &HashingConfig,
    ) -> Result<Self> {
        Ok(Self {
            store,
            signer: TokenSigner::new(auth)?,
            hasher: SecretHasher::new(hashing)?,
        })
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<TokenPair> {
        if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "Email, password, and name are required".into(),
            )
            .into());
        }

        // The first session is hashed before the insert so the identity and
        // its refresh token hash land in a single write.
        let id = Uuid::new_v4();
        let email = normalize_email(email);
        let pair = self.signer.issue_pair(id, &email)?;
        let new = NewIdentity {
            id,
            email,
            password_hash: self.hasher.hash(password).await?,
            name: name.trim().to_string(),
            refresh_token_hash: Some(self.hasher.hash(&pair.refresh_token).await?),
        };

        let user = match self.store.create_identity(new).await {
            Ok(user) => user,
            Err(StoreError::DuplicateEmail) => return Err(AuthError::EmailExists.into()),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, email = %user.email, "user signed up");
        Ok(pair)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = self.store.find_by_email(&normalize_email(email)).await?;

        // Unknown emails still pay for one verification against the decoy hash.
        let stored_hash = user
            .as_ref()
            .map_or(self.hasher.decoy_hash(), |u| u.password_hash.as_str());
        let verified = self.hasher.verify(password, stored_hash).await? && user.is_some();

        // Unknown email and wrong password must be indistinguishable to the caller.
        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("sign-in rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let pair = self.start_session(&user).await?;
        info!(user_id = %user.id, "user signed in");
        Ok(pair)
    }

    pub async fn refresh_tokens(&self, presented: &str) -> Result<TokenPair> {
        let (user, current_hash) = self.authorize_refresh_token(presented).await?;

        let pair = self.signer.issue_pair(user.id, &user.email)?;
        let new_hash = self.hasher.hash(&pair.refresh_token).await?;

        if !self
            .store
            .compare_and_set_refresh_token_hash(user.id, &current_hash, Some(&new_hash))
            .await?
        {
            warn!(user_id = %user.id, "refresh lost a race with a concurrent rotation");
            return Err(AuthError::AccessDenied.into());
        }

        info!(user_id = %user.id, "tokens rotated");
        Ok(pair)
    }

    pub async fn logout(&self, presented: &str) -> Result<()> {
        let (user, current_hash) = self.authorize_refresh_token(presented).await?;

        if !self
            .store
            .compare_and_set_refresh_token_hash(user.id, &current_hash, None)
            .await?
        {
            return Err(AuthError::AccessDenied.into());
        }

        info!(user_id = %user.id, "user logged out");
        Ok(())
    }

    /// Stateless; no store lookup.
    pub fn verify_access_token(&self, token: &str) -> std::result::Result<AccessIdentity, AuthError> {
        let claims = self.signer.verify(TokenKind::Access, token)?;
        Ok(AccessIdentity {
            subject_id: claims.subject_id()?,
            email: claims.email,
        })
    }

    pub async fn profile(&self, id: Uuid) -> Result<UserProfile> {
        self.store
            .find_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn start_session(&self, user: &UserIdentity) -> Result<TokenPair> {
        let pair = self.signer.issue_pair(user.id, &user.email)?;
        let refresh_hash = self.hasher.hash(&pair.refresh_token).await?;
        self.store
            .set_refresh_token_hash(user.id, Some(&refresh_hash))
            .await?;
        Ok(pair)
    }

    /// Signature, expiry, live session and stored-hash match, in that order.
    /// Returns the identity and the exact stored hash for the follow-up compare-and-set.
    async fn authorize_refresh_token(&self, presented: &str) -> Result<(UserIdentity, String)> {
        let claims = self.signer.verify(TokenKind::Refresh, presented)?;
        let user_id = claims.subject_id()?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::AccessDenied)?;
        let current_hash = user
            .refresh_token_hash
            .clone()
            .ok_or(AuthError::AccessDenied)?;

        if !self.hasher.verify(presented, &current_hash).await? {
            warn!(user_id = %user.id, "superseded refresh token presented");
            return Err(AuthError::AccessDenied.into());
        }

        Ok((user, current_hash))
    }
}
