//! Pure comparison logic between the last-persisted state and a fresh
//! snapshot. No I/O here so every rule is testable in isolation.

use crate::snapshot::{PrAction, PrRecord, PrStatus};
use crate::state::CommitState;

/// A commit change is string inequality against the stored id. An empty
/// stored id means "never observed", so the first poll announces the
/// current head once.
pub fn commit_changed(stored: &CommitState, fresh_id: &str) -> bool {
    fresh_id != stored.latest_commit
}

/// Yields one record per pull request that needs announcing, in new-set
/// order followed by synthesized closures in old-set order.
pub fn compare_prs(old: &[PrRecord], new: &[PrRecord]) -> Vec<PrRecord> {
    let mut changes = Vec::new();

    for fresh in new {
        match old.iter().find(|prev| prev.number == fresh.number) {
            None => changes.push(fresh.clone()),
            Some(prev) => {
                if fresh.action != prev.action
                    || fresh.status != prev.status
                    || fresh.commit_id != prev.commit_id
                    || fresh.branch != prev.branch
                {
                    changes.push(fresh.clone());
                }
            }
        }
    }

    // A tracked PR that left the fetch window either closed or fell out of
    // the most-recently-updated window; the two cases are indistinguishable
    // here, so both are announced as closed.
    for prev in old {
        if prev.status != PrStatus::Closed && !new.iter().any(|p| p.number == prev.number) {
            let mut closed = prev.clone();
            closed.action = PrAction::Closed;
            closed.status = PrStatus::Closed;
            changes.push(closed);
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(number: u64, action: PrAction, status: PrStatus) -> PrRecord {
        PrRecord {
            number,
            title: format!("PR {}", number),
            action,
            status,
            branch: "feature".to_owned(),
            commit_id: "aaa111".to_owned(),
        }
    }

    #[test]
    fn identical_commit_state_is_no_change() {
        let stored = CommitState {
            latest_commit: "abc123".to_owned(),
            latest_fetch_timestamp: "2024-01-01T00:00:00Z".to_owned(),
        };

        assert!(!commit_changed(&stored, "abc123"));
    }

    #[test]
    fn different_commit_id_is_a_change() {
        let stored = CommitState {
            latest_commit: "abc123".to_owned(),
            latest_fetch_timestamp: "2024-01-01T00:00:00Z".to_owned(),
        };

        assert!(commit_changed(&stored, "def456"));
    }

    #[test]
    fn empty_stored_commit_fires_once_on_first_poll() {
        assert!(commit_changed(&CommitState::default(), "abc123"));
    }

    #[test]
    fn unchanged_pr_set_yields_nothing() {
        let set = vec![
            pr(1, PrAction::Opened, PrStatus::Open),
            pr(2, PrAction::Updated, PrStatus::Open),
        ];

        assert!(compare_prs(&set, &set).is_empty());
    }

    #[test]
    fn new_pr_is_emitted_verbatim() {
        let old = vec![pr(5, PrAction::Updated, PrStatus::Open)];
        let new = vec![
            pr(5, PrAction::Updated, PrStatus::Open),
            pr(7, PrAction::Opened, PrStatus::Open),
        ];

        let changes = compare_prs(&old, &new);

        assert_eq!(changes, vec![pr(7, PrAction::Opened, PrStatus::Open)]);
    }

    #[test]
    fn any_field_difference_emits_the_new_record() {
        let old = vec![pr(5, PrAction::Opened, PrStatus::Open)];

        let mut rebased = pr(5, PrAction::Updated, PrStatus::Open);
        rebased.commit_id = "bbb222".to_owned();

        let changes = compare_prs(&old, &[rebased.clone()]);

        assert_eq!(changes, vec![rebased]);
    }

    #[test]
    fn branch_rename_alone_triggers_emission() {
        let old = vec![pr(5, PrAction::Updated, PrStatus::Open)];

        let mut renamed = pr(5, PrAction::Updated, PrStatus::Open);
        renamed.branch = "feature-v2".to_owned();

        assert_eq!(compare_prs(&old, &[renamed.clone()]), vec![renamed]);
    }

    #[test]
    fn vanished_open_pr_synthesizes_a_closure() {
        let old = vec![pr(5, PrAction::Updated, PrStatus::Open)];

        let changes = compare_prs(&old, &[]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].number, 5);
        assert_eq!(changes[0].action, PrAction::Closed);
        assert_eq!(changes[0].status, PrStatus::Closed);
        assert_eq!(changes[0].title, "PR 5");
    }

    #[test]
    fn vanished_merged_pr_also_synthesizes_a_closure() {
        let old = vec![pr(5, PrAction::Updated, PrStatus::Merged)];

        let changes = compare_prs(&old, &[]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, PrStatus::Closed);
    }

    #[test]
    fn vanished_closed_pr_yields_nothing() {
        let old = vec![pr(5, PrAction::Closed, PrStatus::Closed)];

        assert!(compare_prs(&old, &[]).is_empty());
    }

    #[test]
    fn changes_keep_new_set_order_then_closures() {
        let old = vec![
            pr(1, PrAction::Updated, PrStatus::Open),
            pr(2, PrAction::Updated, PrStatus::Open),
        ];
        let new = vec![
            pr(9, PrAction::Opened, PrStatus::Open),
            pr(2, PrAction::Updated, PrStatus::Merged),
        ];

        let changes = compare_prs(&old, &new);

        let numbers: Vec<u64> = changes.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![9, 2, 1]);
        assert_eq!(changes[2].action, PrAction::Closed);
    }
}
