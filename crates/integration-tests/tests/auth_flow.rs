//! Sign-up/login flow as the transport layer drives it: hash at the edge,
//! store the PHC string, verify on login. The core only ever sees hashes.

use winsome_core::NoopNotifier;
use winsome_state::SocialState;

#[test]
fn signup_stores_hash_and_login_verifies_it() {
    let state = SocialState::new(Box::new(NoopNotifier));

    let hash = winsome_auth::hash_password("s3cret").unwrap();
    state
        .users
        .register("alice", &hash, &["sport".into()])
        .unwrap();

    let stored = state.users.get("alice").unwrap();
    assert_ne!(stored.password_hash, "s3cret");
    assert!(winsome_auth::verify_password("s3cret", &stored.password_hash));
    assert!(!winsome_auth::verify_password("wrong", &stored.password_hash));
}
