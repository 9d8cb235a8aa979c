//! Integration smoke tests for `mentorhub`

use mentorhub::{get_version, user_agent};

#[test]
fn version_is_not_empty() {
    let v = get_version();
    assert!(!v.trim().is_empty());
}

#[test]
fn user_agent_names_the_client() {
    assert!(user_agent().starts_with("mentorhub/"));
    assert!(user_agent().ends_with(get_version()));
}
