//! # User directory
//!
//! Username → credentials/tags mapping. Users are created at sign-up and
//! never mutated; the follow graph and the transport layer read it for
//! registration and visibility checks.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use winsome_core::{AppError, Result, User, MAX_TAGS};

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user. `password_hash` is the already-hashed credential
    /// produced by the transport-side hasher. Tags are normalized to
    /// lowercase and deduplicated; 1..=`MAX_TAGS` must remain.
    pub fn register(&self, username: &str, password_hash: &str, tags: &[String]) -> Result<()> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        let mut tags: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        if tags.is_empty() {
            return Err(AppError::Validation(
                "at least one interest tag is required".into(),
            ));
        }
        if tags.len() > MAX_TAGS {
            return Err(AppError::Validation(format!(
                "at most {MAX_TAGS} interest tags are allowed"
            )));
        }

        // entry() gives atomic insert-if-absent, so two concurrent sign-ups
        // with the same name cannot both win.
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AppError::UserExists(username.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(User {
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    tags,
                });
                tracing::debug!(user = username, "registered");
                Ok(())
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Result<User> {
        self.users
            .get(username)
            .map(|u| u.value().clone())
            .ok_or_else(|| AppError::UnknownUser(username.to_string()))
    }

    /// All registered users, sorted by name. Independent copies.
    pub fn list(&self) -> Vec<User> {
        let mut out: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        out
    }

    /// All other users whose tag set intersects `username`'s, sorted by name.
    /// Backs the `visible_users` operation of the follow graph.
    pub fn visible_to(&self, username: &str) -> Result<Vec<User>> {
        let me = self.get(username)?;
        let mut out: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.key() != username && me.shares_tag_with(u.value()))
            .map(|u| u.value().clone())
            .collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(out)
    }

    /// Restores a user record verbatim from a snapshot. Tags were validated
    /// at original sign-up; a duplicate here means the snapshot is corrupt.
    pub fn restore(&self, user: User) -> Result<()> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::Snapshot(format!(
                "duplicate user `{}`",
                user.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_with(names: &[(&str, &[&str])]) -> UserDirectory {
        let dir = UserDirectory::new();
        for (name, tags) in names {
            let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
            dir.register(name, "hash", &tags).unwrap();
        }
        dir
    }

    #[test]
    fn test_register_and_get() {
        let dir = dir_with(&[("alice", &["Sport", "music"])]);
        let alice = dir.get("alice").unwrap();
        // normalized to lowercase, sorted
        assert_eq!(alice.tags, vec!["music", "sport"]);
        assert_eq!(dir.get("ghost"), Err(AppError::UnknownUser("ghost".into())));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = dir_with(&[("alice", &["sport"])]);
        let err = dir.register("alice", "other", &["music".into()]).unwrap_err();
        assert_eq!(err, AppError::UserExists("alice".into()));
    }

    #[test]
    fn test_tag_validation() {
        let dir = UserDirectory::new();
        assert!(matches!(
            dir.register("bob", "h", &[]),
            Err(AppError::Validation(_))
        ));
        let too_many: Vec<String> = (0..6).map(|i| format!("tag{i}")).collect();
        assert!(matches!(
            dir.register("bob", "h", &too_many),
            Err(AppError::Validation(_))
        ));
        // whitespace-only tags are discarded before the emptiness check
        assert!(matches!(
            dir.register("bob", "h", &["  ".into()]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_visibility_requires_shared_tag() {
        let dir = dir_with(&[
            ("alice", &["sport"]),
            ("bob", &["sport", "cinema"]),
            ("carol", &["cooking"]),
        ]);
        let visible = dir.visible_to("alice").unwrap();
        let names: Vec<&str> = visible.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob"]);
    }
}
