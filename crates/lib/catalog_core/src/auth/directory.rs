//! User directory: the external identity source consulted on login and
//! `whoami`.
//!
//! The token lifecycle only needs two lookups, so the seam is a small async
//! trait. [`StaticUserDirectory`] is the bundled implementation, loaded from a
//! YAML users file and/or a bootstrap admin account.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::AuthError;
use crate::models::auth::{User, UserWithPassword};

/// Lookup interface for users and their password hashes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user (with password hash) by unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserWithPassword>, AuthError>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
    password_hash: String,
}

/// Immutable in-memory directory.
#[derive(Debug, Default, Clone)]
pub struct StaticUserDirectory {
    by_username: HashMap<String, UserWithPassword>,
    username_by_id: HashMap<String, String>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Usernames and IDs must be unique.
    pub fn insert(&mut self, user: User, password_hash: String) -> Result<(), AuthError> {
        if user.username.is_empty() || user.id.is_empty() {
            return Err(AuthError::ValidationError(
                "user id and username must not be empty".into(),
            ));
        }
        if self.by_username.contains_key(&user.username) {
            return Err(AuthError::ValidationError(format!(
                "duplicate username '{}'",
                user.username
            )));
        }
        if self.username_by_id.contains_key(&user.id) {
            return Err(AuthError::ValidationError(format!(
                "duplicate user id '{}'",
                user.id
            )));
        }
        self.username_by_id
            .insert(user.id.clone(), user.username.clone());
        self.by_username.insert(
            user.username.clone(),
            UserWithPassword {
                user,
                password_hash,
            },
        );
        Ok(())
    }

    /// Add the bootstrap admin account. Its ID is its username so tokens
    /// survive restarts.
    pub fn with_bootstrap_admin(
        mut self,
        username: &str,
        password_hash: String,
    ) -> Result<Self, AuthError> {
        self.insert(
            User {
                id: username.to_string(),
                username: username.to_string(),
                display_name: "Administrator".to_string(),
            },
            password_hash,
        )?;
        Ok(self)
    }

    /// Parse a users document:
    ///
    /// ```yaml
    /// users:
    ///   - id: "u-1"
    ///     username: admin
    ///     display_name: Administrator
    ///     password_hash: "$2b$10$..."
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AuthError> {
        let file: UsersFile = serde_yaml::from_str(yaml)
            .map_err(|e| AuthError::ValidationError(format!("users file: {e}")))?;
        let mut dir = Self::new();
        for entry in file.users {
            let display_name = entry
                .display_name
                .unwrap_or_else(|| entry.username.clone());
            dir.insert(
                User {
                    id: entry.id,
                    username: entry.username,
                    display_name,
                },
                entry.password_hash,
            )?;
        }
        Ok(dir)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, AuthError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Internal(format!("read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserWithPassword>, AuthError> {
        Ok(self.by_username.get(username).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .username_by_id
            .get(id)
            .and_then(|username| self.by_username.get(username))
            .map(|u| u.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = r#"
users:
  - id: "u-1"
    username: alice
    display_name: Alice Example
    password_hash: "$2b$04$hash-alice"
  - id: "u-2"
    username: bob
    password_hash: "$2b$04$hash-bob"
"#;

    #[tokio::test]
    async fn loads_users_from_yaml() {
        let dir = StaticUserDirectory::from_yaml_str(USERS).unwrap();
        assert_eq!(dir.len(), 2);

        let alice = dir.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.user.id, "u-1");
        assert_eq!(alice.user.display_name, "Alice Example");
        assert_eq!(alice.password_hash, "$2b$04$hash-alice");

        // display_name falls back to the username.
        let bob = dir.find_by_id("u-2").await.unwrap().unwrap();
        assert_eq!(bob.display_name, "bob");
    }

    #[tokio::test]
    async fn unknown_users_are_none() {
        let dir = StaticUserDirectory::from_yaml_str(USERS).unwrap();
        assert!(dir.find_by_username("mallory").await.unwrap().is_none());
        assert!(dir.find_by_id("u-404").await.unwrap().is_none());
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let yaml = r#"
users:
  - { id: "1", username: dup, password_hash: "x" }
  - { id: "2", username: dup, password_hash: "y" }
"#;
        assert!(matches!(
            StaticUserDirectory::from_yaml_str(yaml),
            Err(AuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn bootstrap_admin_uses_username_as_id() {
        let dir = StaticUserDirectory::new()
            .with_bootstrap_admin("admin", "hash".into())
            .unwrap();
        let admin = dir.find_by_id("admin").await.unwrap().unwrap();
        assert_eq!(admin.username, "admin");
    }

    #[test]
    fn empty_document_is_an_empty_directory() {
        let dir = StaticUserDirectory::from_yaml_str("users: []").unwrap();
        assert!(dir.is_empty());
    }
}
