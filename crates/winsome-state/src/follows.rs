//! # Follow graph
//!
//! Bidirectional follow relation. The two directional maps are one logical
//! entity behind a single mutex: no observer can ever see an edge with only
//! one side installed. Successful mutations are reported through the
//! [`FollowNotifier`] port after the critical section.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use winsome_core::{
    AppError, FollowChange, FollowEvent, FollowNotifier, NoopNotifier, Result, User,
};

use crate::users::UserDirectory;

#[derive(Debug, Default)]
struct Links {
    followers: HashMap<String, BTreeSet<String>>,
    following: HashMap<String, BTreeSet<String>>,
}

/// One directed edge, for the snapshot codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower: String,
    pub followee: String,
}

pub struct FollowGraph {
    users: Arc<UserDirectory>,
    links: Mutex<Links>,
    notifier: Box<dyn FollowNotifier>,
}

impl fmt::Debug for FollowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowGraph")
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl FollowGraph {
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self::with_notifier(users, Box::new(NoopNotifier))
    }

    pub fn with_notifier(users: Arc<UserDirectory>, notifier: Box<dyn FollowNotifier>) -> Self {
        Self {
            users,
            links: Mutex::new(Links::default()),
            notifier,
        }
    }

    /// Installs the `follower -> followee` edge, both directions as one
    /// atomic step.
    pub fn follow(&self, follower: &str, followee: &str) -> Result<()> {
        self.check_pair(follower, followee)?;
        {
            let mut guard = self.lock();
            let links = &mut *guard;
            let following = links.following.entry(follower.to_string()).or_default();
            if !following.insert(followee.to_string()) {
                return Err(AppError::AlreadyFollowing {
                    follower: follower.to_string(),
                    followee: followee.to_string(),
                });
            }
            links
                .followers
                .entry(followee.to_string())
                .or_default()
                .insert(follower.to_string());
        }
        self.notifier.notify(&FollowEvent {
            follower: follower.to_string(),
            followee: followee.to_string(),
            change: FollowChange::Added,
        });
        Ok(())
    }

    /// Removes the edge, both directions as one atomic step.
    pub fn unfollow(&self, follower: &str, followee: &str) -> Result<()> {
        self.check_pair(follower, followee)?;
        {
            let mut guard = self.lock();
            let links = &mut *guard;
            let removed = links
                .following
                .get_mut(follower)
                .is_some_and(|set| set.remove(followee));
            if !removed {
                return Err(AppError::NotFollowing {
                    follower: follower.to_string(),
                    followee: followee.to_string(),
                });
            }
            if let Some(set) = links.followers.get_mut(followee) {
                set.remove(follower);
            }
        }
        self.notifier.notify(&FollowEvent {
            follower: follower.to_string(),
            followee: followee.to_string(),
            change: FollowChange::Removed,
        });
        Ok(())
    }

    /// Who follows `user`. Independent sorted copy.
    pub fn followers_of(&self, user: &str) -> Result<Vec<String>> {
        self.require_user(user)?;
        Ok(self
            .lock()
            .followers
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Whom `user` follows. Independent sorted copy.
    pub fn following_of(&self, user: &str) -> Result<Vec<String>> {
        self.require_user(user)?;
        Ok(self
            .lock()
            .following
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// All registered users (excluding `user`) whose tag set intersects
    /// `user`'s. The transport layer uses this to filter what a client sees.
    pub fn visible_users(&self, user: &str) -> Result<Vec<User>> {
        self.users.visible_to(user)
    }

    /// Every edge, sorted, for the snapshot codec.
    pub fn export(&self) -> Vec<FollowEdge> {
        let links = self.lock();
        let mut out: Vec<FollowEdge> = links
            .following
            .iter()
            .flat_map(|(follower, followees)| {
                followees.iter().map(move |followee| FollowEdge {
                    follower: follower.clone(),
                    followee: followee.clone(),
                })
            })
            .collect();
        out.sort_by(|a, b| (&a.follower, &a.followee).cmp(&(&b.follower, &b.followee)));
        out
    }

    /// Reinstalls edges from a snapshot without emitting notifications.
    /// Unknown endpoints or duplicate edges mean the snapshot is corrupt.
    pub fn import(&self, edges: Vec<FollowEdge>) -> Result<()> {
        for edge in edges {
            if !self.users.contains(&edge.follower) || !self.users.contains(&edge.followee) {
                return Err(AppError::Snapshot(format!(
                    "follow edge `{}` -> `{}` references an unknown user",
                    edge.follower, edge.followee
                )));
            }
            let mut guard = self.lock();
            let links = &mut *guard;
            let fresh = links
                .following
                .entry(edge.follower.clone())
                .or_default()
                .insert(edge.followee.clone());
            if !fresh {
                return Err(AppError::Snapshot(format!(
                    "duplicate follow edge `{}` -> `{}`",
                    edge.follower, edge.followee
                )));
            }
            links
                .followers
                .entry(edge.followee)
                .or_default()
                .insert(edge.follower);
        }
        Ok(())
    }

    fn check_pair(&self, follower: &str, followee: &str) -> Result<()> {
        if follower == followee {
            return Err(AppError::SelfFollow(follower.to_string()));
        }
        self.require_user(follower)?;
        self.require_user(followee)
    }

    fn require_user(&self, username: &str) -> Result<()> {
        if self.users.contains(username) {
            Ok(())
        } else {
            Err(AppError::UnknownUser(username.to_string()))
        }
    }

    fn lock(&self) -> MutexGuard<'_, Links> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn graph() -> FollowGraph {
        let dir = Arc::new(UserDirectory::new());
        for name in ["alice", "bob", "carol"] {
            dir.register(name, "hash", &["sport".into()]).unwrap();
        }
        FollowGraph::new(dir)
    }

    #[test]
    fn test_follow_updates_both_sides() {
        let g = graph();
        g.follow("alice", "bob").unwrap();
        assert_eq!(g.following_of("alice").unwrap(), vec!["bob"]);
        assert_eq!(g.followers_of("bob").unwrap(), vec!["alice"]);

        g.unfollow("alice", "bob").unwrap();
        assert!(g.following_of("alice").unwrap().is_empty());
        assert!(g.followers_of("bob").unwrap().is_empty());
    }

    #[test]
    fn test_follow_error_taxonomy() {
        let g = graph();
        assert_eq!(
            g.follow("alice", "alice"),
            Err(AppError::SelfFollow("alice".into()))
        );
        assert_eq!(
            g.follow("alice", "ghost"),
            Err(AppError::UnknownUser("ghost".into()))
        );
        g.follow("alice", "bob").unwrap();
        assert!(matches!(
            g.follow("alice", "bob"),
            Err(AppError::AlreadyFollowing { .. })
        ));
        assert!(matches!(
            g.unfollow("bob", "alice"),
            Err(AppError::NotFollowing { .. })
        ));
    }

    #[test]
    fn test_notifier_sees_every_mutation() {
        #[derive(Clone)]
        struct Recorder(Arc<StdMutex<Vec<FollowEvent>>>);
        impl FollowNotifier for Recorder {
            fn notify(&self, event: &FollowEvent) {
                self.0.lock().unwrap().push(event.clone());
            }
        }

        let dir = Arc::new(UserDirectory::new());
        dir.register("alice", "h", &["sport".into()]).unwrap();
        dir.register("bob", "h", &["sport".into()]).unwrap();

        let recorder = Recorder(Arc::new(StdMutex::new(Vec::new())));
        let g = FollowGraph::with_notifier(dir, Box::new(recorder.clone()));
        g.follow("alice", "bob").unwrap();
        let _ = g.follow("alice", "bob"); // rejected, must not notify
        g.unfollow("alice", "bob").unwrap();

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].change, FollowChange::Added);
        assert_eq!(events[1].change, FollowChange::Removed);
    }

    #[test]
    fn test_export_import_round_trip() {
        let g = graph();
        g.follow("alice", "bob").unwrap();
        g.follow("carol", "bob").unwrap();
        g.follow("bob", "alice").unwrap();

        let edges = g.export();
        let g2 = graph();
        g2.import(edges.clone()).unwrap();
        assert_eq!(g2.export(), edges);
        assert_eq!(g2.followers_of("bob").unwrap(), vec!["alice", "carol"]);
    }
}
