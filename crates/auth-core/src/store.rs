// ============================
// crates/auth-core/src/store.rs
// ============================
//! Credential storage abstraction with in-memory and flat-file backends.
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs as tokio_fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AuthError;

/// A registered user. The password hash is never serialized out of the
/// store boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored normalized (trimmed, lowercased)
    pub email: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Trait for credential store backends.
///
/// `create_user` must be atomic with respect to concurrent registration of
/// the same normalized email: the second concurrent create fails with
/// `DuplicateEmail`, never last-writer-wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user, enforcing email uniqueness
    async fn create_user(&self, new: NewUser) -> Result<User, AuthError>;

    /// Look up a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Replace a user's password hash
    async fn update_password_hash(&self, user_id: Uuid, new_hash: &str) -> Result<(), AuthError>;
}

#[derive(Default)]
struct MemoryInner {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory implementation of the `UserStore` trait. Check-and-insert
/// happens under a single write lock, which gives the uniqueness guarantee.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AuthError> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&new.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email.clone(),
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        inner.by_email.insert(new.email, user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let inner = self.inner.read().await;
        let user = inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn update_password_hash(&self, user_id: Uuid, new_hash: &str) -> Result<(), AuthError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&user_id) {
            Some(user) => {
                user.password_hash = new_hash.to_string();
                Ok(())
            },
            None => Err(AuthError::UserNotFound),
        }
    }
}

/// Flat-file implementation of the `UserStore` trait.
///
/// Each user lives in `{root}/users/{id}.json`; an in-memory email index is
/// rebuilt on startup. Uniqueness is reserved in the index under the write
/// lock before the file write, and the reservation is released if the write
/// fails, so the file I/O itself never runs under the lock.
#[derive(Clone)]
pub struct FlatFileUserStore {
    root: PathBuf,
    index: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl FlatFileUserStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;

        // Rebuild the email index from the user documents on disk
        let mut index = HashMap::new();
        for entry in fs::read_dir(root.join("users"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<User>(&content) {
                Ok(user) => {
                    index.insert(user.email, user.id);
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable user document");
                },
            }
        }

        Ok(Self {
            root,
            index: Arc::new(RwLock::new(index)),
        })
    }

    fn user_path(&self, id: Uuid) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    async fn read_user(&self, id: Uuid) -> Result<User, AuthError> {
        let path = self.user_path(id);
        let content = tokio_fs::read_to_string(&path)
            .await
            .map_err(|e| AuthError::Storage(format!("read {}: {e}", path.display())))?;
        let user = serde_json::from_str(&content)?;
        Ok(user)
    }

    async fn write_user(&self, user: &User) -> Result<(), AuthError> {
        let path = self.user_path(user.id);
        let json = serde_json::to_string_pretty(&StoredUser::from(user))?;
        tokio_fs::write(&path, json)
            .await
            .map_err(|e| AuthError::Storage(format!("write {}: {e}", path.display())))?;
        Ok(())
    }
}

/// On-disk form of a user. `User` skips the hash when serializing, which is
/// the right default everywhere except here.
#[derive(Serialize)]
struct StoredUser<'a> {
    id: Uuid,
    name: &'a str,
    email: &'a str,
    password_hash: &'a str,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for StoredUser<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            name: &user.name,
            email: &user.email,
            password_hash: &user.password_hash,
            created_at: user.created_at,
        }
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AuthError> {
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };

        // Reserve the email before touching the filesystem
        {
            let mut index = self.index.write().await;
            if index.contains_key(&user.email) {
                return Err(AuthError::DuplicateEmail);
            }
            index.insert(user.email.clone(), user.id);
        }

        if let Err(e) = self.write_user(&user).await {
            // Release the reservation so the email can be retried
            self.index.write().await.remove(&user.email);
            return Err(e);
        }

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let id = {
            let index = self.index.read().await;
            index.get(email).copied()
        };

        match id {
            Some(id) => Ok(Some(self.read_user(id).await?)),
            None => Ok(None),
        }
    }

    async fn update_password_hash(&self, user_id: Uuid, new_hash: &str) -> Result<(), AuthError> {
        let mut user = match self.read_user(user_id).await {
            Ok(user) => user,
            Err(AuthError::Storage(_)) if !self.user_path(user_id).exists() => {
                return Err(AuthError::UserNotFound)
            },
            Err(e) => return Err(e),
        };

        user.password_hash = new_hash.to_string();
        self.write_user(&user).await
    }
}
