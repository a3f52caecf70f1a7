#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tally_core::path::{PathTemplate, DEFAULT_RECORDS_TEMPLATE};

#[test]
fn default_matches_parsed_default() {
    let parsed = PathTemplate::parse(DEFAULT_RECORDS_TEMPLATE).unwrap();
    assert_eq!(parsed, PathTemplate::default());
    assert_eq!(parsed.params(), vec!["userId", "docId"]);
}

#[test]
fn locate_first_and_last_params() {
    let t = PathTemplate::parse("orgs/{orgId}/users/{userId}/receipts/{docId}").unwrap();
    let (parent, record) = t.locate("orgs/o1/users/u7/receipts/r9").unwrap();
    assert_eq!(parent, "o1");
    assert_eq!(record, "r9");

    let caps = t.captures("orgs/o1/users/u7/receipts/r9").unwrap();
    assert_eq!(caps, vec![("orgId", "o1"), ("userId", "u7"), ("docId", "r9")]);
}

#[test]
fn non_matching_paths() {
    let t = PathTemplate::default();
    assert!(t.captures("users/u1/receipts").is_none());
    assert!(t.captures("users/u1/receipts/r1/extra").is_none());
    assert!(t.captures("people/u1/receipts/r1").is_none());
    assert!(t.captures("users//receipts/r1").is_none());

    let err = t.locate("users/u1/notes/n1").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "MALFORMED_EVENT");
}

#[test]
fn rejects_bad_templates() {
    for bad in [
        "",
        "users/{userId}",
        "users//receipts/{docId}",
        "users/{id}/receipts/{id}",
        "users/{}/receipts/{docId}",
        "users/{userId/receipts/{docId}",
        "users/x{userId}/receipts/{docId}",
    ] {
        let err = PathTemplate::parse(bad).expect_err(bad);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "template={bad}");
    }
}
