//! Unread-first ordering for list views.
//!
//! A stable partition, not a comparator sort: unread items move to the
//! front but each group keeps its incoming relative order, so a
//! background refresh of the unread set does not reshuffle rows a user
//! is mid-reading. An explicit secondary key reorders within each group
//! when a view wants one (job boards use reverse-chronological creation).

use std::collections::HashSet;

/// Stable partition: all unread items precede all read items, each group
/// preserving input order. Idempotent for a fixed unread set.
pub fn prioritize<T>(
    items: Vec<T>,
    unread: &HashSet<i64>,
    id_of: impl Fn(&T) -> i64,
) -> Vec<T> {
    let (mut front, back): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| unread.contains(&id_of(item)));
    front.extend(back);
    front
}

/// Same partition, then a stable sort by `key` within each group.
pub fn prioritize_by<T, K: Ord>(
    items: Vec<T>,
    unread: &HashSet<i64>,
    id_of: impl Fn(&T) -> i64,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let (mut front, mut back): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| unread.contains(&id_of(item)));
    front.sort_by_key(|item| key(item));
    back.sort_by_key(|item| key(item));
    front.extend(back);
    front
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;

    fn ids(items: &[(i64, i64)]) -> Vec<i64> {
        items.iter().map(|(id, _)| *id).collect()
    }

    #[test]
    fn unread_lead_and_both_groups_keep_order() {
        // A(unread), B(read), C(unread), D(read) -> A, C, B, D
        let items = vec![(1, 0), (2, 0), (3, 0), (4, 0)];
        let unread: HashSet<i64> = [1, 3].into();
        let out = prioritize(items, &unread, |i| i.0);
        assert_eq!(ids(&out), vec![1, 3, 2, 4]);
    }

    #[test]
    fn idempotent_for_a_fixed_set() {
        let items = vec![(5, 0), (1, 0), (9, 0), (2, 0), (7, 0)];
        let unread: HashSet<i64> = [9, 2].into();
        let once = prioritize(items, &unread, |i| i.0);
        let twice = prioritize(once.clone(), &unread, |i| i.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_set_leaves_order_untouched() {
        let items = vec![(3, 0), (1, 0), (2, 0)];
        let unread = HashSet::new();
        let out = prioritize(items, &unread, |i| i.0);
        assert_eq!(ids(&out), vec![3, 1, 2]);
    }

    #[test]
    fn secondary_key_orders_within_each_group() {
        // (id, created_at) — reverse-chronological within groups.
        let items = vec![(1, 10), (2, 30), (3, 20), (4, 40)];
        let unread: HashSet<i64> = [1, 3].into();
        let out = prioritize_by(items, &unread, |i| i.0, |i| Reverse(i.1));
        assert_eq!(ids(&out), vec![3, 1, 4, 2]);
    }

    #[test]
    fn secondary_key_is_stable_across_groups_boundary() {
        // Equal keys keep input order inside a group.
        let items = vec![(1, 5), (2, 5), (3, 5)];
        let unread: HashSet<i64> = [2].into();
        let out = prioritize_by(items, &unread, |i| i.0, |i| Reverse(i.1));
        assert_eq!(ids(&out), vec![2, 1, 3]);
    }
}
