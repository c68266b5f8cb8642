// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let id = TestId::from_string("tst-abc");
    let mut map = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get("tst-abc"), Some(&42));
}

#[test]
fn define_id_new_has_prefix_and_length() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn define_id_new_is_unique() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    assert_eq!(id.suffix(), "abcdefghijklmnopqrs");
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-ab");
    assert_eq!(id.short(8), "ab");
}

#[test]
fn define_id_display_round_trips_through_from_string() {
    let id = TestId::new();
    let round_tripped = TestId::from_string(id.to_string());
    assert_eq!(id, round_tripped);
}

#[test]
fn idbuf_hash_matches_str_hash_for_borrow_lookup() {
    let mut map: HashMap<IdBuf, i32> = HashMap::new();
    map.insert(IdBuf::new("abc"), 1);
    assert_eq!(map.get("abc"), Some(&1));
}

#[test]
fn idbuf_empty_is_empty() {
    assert!(IdBuf::empty().is_empty());
    assert!(!IdBuf::new("x").is_empty());
}
