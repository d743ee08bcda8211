//! Unread overlay and list prioritization tests.

use std::cmp::Reverse;
use std::collections::HashSet;

use talentgate::notify::{Category, NotificationOverlay, prioritize, prioritize_by};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: i64,
    created_at: i64,
}

fn rows(data: &[(i64, i64)]) -> Vec<Row> {
    data.iter()
        .map(|&(id, created_at)| Row { id, created_at })
        .collect()
}

fn ids(items: &[Row]) -> Vec<i64> {
    items.iter().map(|r| r.id).collect()
}

#[test]
fn stable_partition_keeps_each_groups_order() {
    // A(unread), B(read), C(unread), D(read) -> A, C, B, D
    let items = rows(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
    let unread: HashSet<i64> = [1, 3].into();

    let out = prioritize(items, &unread, |r| r.id);
    assert_eq!(ids(&out), vec![1, 3, 2, 4]);
}

#[test]
fn prioritize_is_idempotent() {
    let items = rows(&[(8, 0), (2, 0), (5, 0), (1, 0), (9, 0)]);
    let unread: HashSet<i64> = [5, 9].into();

    let once = prioritize(items, &unread, |r| r.id);
    let twice = prioritize(once.clone(), &unread, |r| r.id);
    assert_eq!(once, twice);
}

#[test]
fn secondary_key_sorts_within_groups_only() {
    let items = rows(&[(1, 10), (2, 40), (3, 20), (4, 30)]);
    let unread: HashSet<i64> = [1, 3].into();

    // Reverse-chronological inside each group; unread still lead.
    let out = prioritize_by(items, &unread, |r| r.id, |r| Reverse(r.created_at));
    assert_eq!(ids(&out), vec![3, 1, 2, 4]);
}

#[test]
fn failed_unread_fetch_leaves_the_list_untouched() {
    let overlay =
        NotificationOverlay::from_fetch(Category::Job, Err::<Vec<i64>, _>("network error"));
    assert_eq!(overlay.unread_count(), 0);

    let items = rows(&[(3, 30), (1, 10), (2, 20)]);
    let out = prioritize(items.clone(), overlay.unread_ids(), |r| r.id);
    assert_eq!(out, items);
}

#[test]
fn overlay_answers_membership_per_category() {
    let overlay = NotificationOverlay::new(Category::Application, [7, 11]);
    assert_eq!(overlay.category(), Category::Application);
    assert!(overlay.is_unread(7));
    assert!(!overlay.is_unread(8));
}

#[test]
fn unread_lead_even_when_older() {
    // An old unread row outranks every read row regardless of the
    // secondary key.
    let items = rows(&[(1, 100), (2, 90), (3, 5)]);
    let unread: HashSet<i64> = [3].into();

    let out = prioritize_by(items, &unread, |r| r.id, |r| Reverse(r.created_at));
    assert_eq!(ids(&out), vec![3, 1, 2]);
}
