//! The pure budget derivation rules.
//!
//! Both functions here are side-effect free and store-independent: the
//! [LedgerService](crate::LedgerService) decides *which* entries need new
//! budgets, this module decides *what* those budgets are.

use crate::entry::Entry;

/// Compute the budget for an entry with `balance` and `ratio`, given its
/// chronological `predecessor`.
///
/// An entry with no predecessor (the chronologically oldest entry of a user's
/// history) has a budget of `0`. Otherwise, a balance decrease since the
/// predecessor is subtracted from the budget in full, while an increase
/// contributes only its ratio-weighted share.
pub fn compute_budget(balance: f64, ratio: f64, predecessor: Option<&Entry>) -> f64 {
    let Some(previous) = predecessor else {
        return 0.0;
    };

    let delta = balance - previous.balance;

    if delta < 0.0 {
        previous.budget + delta
    } else {
        previous.budget + delta * ratio
    }
}

/// Re-derive every budget in a contiguous run of entries ordered newest-first.
///
/// The chronologically oldest element of the run (the last one) is left
/// untouched: its budget must already have been fixed by the caller from its
/// true predecessor, which lies outside the run. Every newer element is then
/// recomputed from its neighbour in chronological order.
///
/// Running this twice over an already-consistent run changes nothing.
pub fn recompute_budgets(newest_first: &mut [Entry]) {
    for index in (0..newest_first.len().saturating_sub(1)).rev() {
        let budget = compute_budget(
            newest_first[index].balance,
            newest_first[index].ratio,
            Some(&newest_first[index + 1]),
        );
        newest_first[index].budget = budget;
    }
}


#[cfg(test)]
mod recompute_budgets_tests {
    use time::{Duration, macros::datetime};

    use crate::entry::Entry;
    use crate::user::UserID;

    use super::recompute_budgets;

    /// Entries ordered newest-first; higher `id` means newer.
    fn newest_first(rows: &[(i64, f64, f64)]) -> Vec<Entry> {
        rows.iter()
            .map(|&(id, balance, budget)| Entry {
                id,
                user_id: UserID::new(1),
                balance,
                ratio: 0.5,
                budget,
                created_at: datetime!(2025-01-01 12:00 UTC) + Duration::minutes(id),
            })
            .collect()
    }

    #[test]
    fn recompute_is_idempotent_on_consistent_run() {
        let mut entries = newest_first(&[
            (4, 800.0, -200.0),
            (3, 1200.0, 200.0),
            (2, 1000.0, 100.0),
            (1, 800.0, 0.0),
        ]);
        let want = entries.clone();

        recompute_budgets(&mut entries);
        assert_eq!(want, entries, "first pass should change nothing");

        recompute_budgets(&mut entries);
        assert_eq!(want, entries, "second pass should change nothing");
    }

    #[test]
    fn recompute_propagates_in_chronological_order() {
        // Budgets of the three newer entries are stale on purpose.
        let mut entries = newest_first(&[
            (4, 800.0, 999.0),
            (3, 1200.0, 999.0),
            (2, 1000.0, 999.0),
            (1, 800.0, 0.0),
        ]);

        recompute_budgets(&mut entries);

        let got: Vec<f64> = entries.iter().map(|entry| entry.budget).collect();
        assert_eq!(vec![-200.0, 200.0, 100.0, 0.0], got);
    }

    #[test]
    fn oldest_element_is_left_untouched() {
        let mut entries = newest_first(&[(2, 1000.0, 999.0), (1, 800.0, 123.0)]);

        recompute_budgets(&mut entries);

        assert_eq!(123.0, entries[1].budget, "anchor budget must not change");
        assert_eq!(223.0, entries[0].budget, "123 + 200 * 0.5");
    }

    #[test]
    fn empty_and_single_element_runs_are_no_ops() {
        let mut empty: Vec<Entry> = Vec::new();
        recompute_budgets(&mut empty);
        assert!(empty.is_empty());

        let mut single = newest_first(&[(1, 800.0, 42.0)]);
        recompute_budgets(&mut single);
        assert_eq!(42.0, single[0].budget);
    }
}
