//! End-to-end request-surface scenarios over the assembled state.

use integration_tests::state_with_users;
use winsome_core::{AppError, Vote};

#[test]
fn upvote_listed_and_second_vote_rejected() {
    let state = state_with_users(&["alice", "bob"]);

    let id = state.posts.create_original("alice", "Hi", "World").unwrap();
    assert_eq!(id, 1);

    state.posts.vote(id, "bob", Vote::Up).unwrap();
    assert_eq!(state.posts.list_voters(id, Vote::Up).unwrap(), vec!["bob"]);

    assert_eq!(
        state.posts.vote(id, "bob", Vote::Up),
        Err(AppError::AlreadyVoted {
            post: id,
            voter: "bob".into()
        })
    );
}

#[test]
fn rewin_shares_comments_and_dies_with_its_root() {
    let state = state_with_users(&["alice", "bob", "carol"]);

    let original = state.posts.create_original("alice", "Hi", "World").unwrap();
    state.posts.comment(original, "carol", "hello!").unwrap();

    let rewin = state.posts.create_rewin(original, "bob").unwrap();
    assert_eq!(rewin, 2);
    assert_eq!(
        state.posts.list_comments(rewin).unwrap(),
        state.posts.list_comments(original).unwrap()
    );

    // engagement through the rewin lands on the original
    state.posts.vote(rewin, "carol", Vote::Up).unwrap();
    assert_eq!(
        state.posts.list_voters(original, Vote::Up).unwrap(),
        vec!["carol"]
    );

    state.posts.delete(original, "alice").unwrap();
    assert_eq!(
        state.posts.list_comments(rewin),
        Err(AppError::UnknownPost(rewin))
    );
    assert_eq!(
        state.posts.summary(original),
        Err(AppError::UnknownPost(original))
    );
}

#[test]
fn visibility_follows_and_wallet_read() {
    let state = state_with_users(&["alice", "bob"]);
    state
        .users
        .register("outsider", "hash", &["chess".into()])
        .unwrap();

    // outsider shares no tag with alice
    let visible: Vec<String> = state
        .follows
        .visible_users("alice")
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(visible, vec!["bob"]);

    state.follows.follow("bob", "alice").unwrap();
    assert_eq!(state.follows.followers_of("alice").unwrap(), vec!["bob"]);
    assert_eq!(state.follows.following_of("bob").unwrap(), vec!["alice"]);

    // wallets start empty, reads never fail for registered users
    assert_eq!(state.wallet.wallet_of("alice").history.len(), 0);
}
