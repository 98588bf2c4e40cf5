//! Interpreter scenarios driven through the public `Dispatcher` API
//!
//! Covers undo round-trips, index bounds, sorting and query behaviour.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use taskline_cli::domain::NaturalDates;
use taskline_cli::engine::ErrorKind;
use taskline_cli::{Dispatcher, OrderedTaskStore, Rank};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        OrderedTaskStore::new(),
        Box::new(NaturalDates::with_reference(noon())),
    )
    .with_clock(noon())
}

fn run(d: &mut Dispatcher, lines: &[&str]) {
    for line in lines {
        d.handle(line)
            .unwrap_or_else(|e| panic!("'{}' failed: {}", line, e));
    }
}

fn with_tasks(names: &[&str]) -> Dispatcher {
    let mut d = dispatcher();
    for name in names {
        run(&mut d, &[&format!("add {}", name)]);
    }
    d
}

// =============================================================================
// Add / Delete
// =============================================================================

#[test]
fn test_add_then_undo_restores_store() {
    let mut d = with_tasks(&["a", "b"]);
    let before = d.store().clone();

    run(&mut d, &["add c", "undo"]);

    assert_eq!(d.store(), &before);
}

#[test]
fn test_delete_then_undo_restores_task_in_place() {
    let mut d = with_tasks(&["a", "b", "c"]);
    run(
        &mut d,
        &[
            "desc 2 middle task",
            "due 2 2025-07-01 09:00",
            "start 2 2025-06-20",
            "rank 2 high",
            "tag 2 work home",
            "mark 2 done",
        ],
    );
    let before = d.store().clone();

    run(&mut d, &["delete 2"]);
    assert_eq!(d.store().names(), vec!["a", "c"]);

    run(&mut d, &["undo"]);
    assert_eq!(d.store(), &before);
    assert_eq!(d.store().index_of("b"), Some(2));
}

#[test]
fn test_clear_then_undo_restores_everything() {
    let mut d = with_tasks(&["a", "b", "c"]);
    let before = d.store().clone();

    run(&mut d, &["clear"]);
    assert!(d.store().is_empty());

    run(&mut d, &["undo"]);
    assert_eq!(d.store(), &before);
}

#[test]
fn test_duplicate_names_are_case_insensitive() {
    let mut d = with_tasks(&["Foo"]);

    let err = d.handle("add foo").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateName);
    assert_eq!(d.store().len(), 1);
}

// =============================================================================
// Attribute Changes
// =============================================================================

#[test]
fn test_modify_unwinds_one_attribute_per_undo() {
    let mut d = with_tasks(&["a"]);

    run(&mut d, &["modify 1 -desc x -rank high"]);
    let task = d.store().get_at(1).unwrap();
    assert_eq!(task.description.as_deref(), Some("x"));
    assert_eq!(task.rank, Rank::High);

    run(&mut d, &["undo"]);
    let task = d.store().get_at(1).unwrap();
    assert_eq!(task.description.as_deref(), Some("x"));
    assert_eq!(task.rank, Rank::Low);

    run(&mut d, &["undo"]);
    let task = d.store().get_at(1).unwrap();
    assert_eq!(task.description, None);
    assert_eq!(task.rank, Rank::Low);
}

#[test]
fn test_tag_untag_mark_unwind_in_reverse() {
    let mut d = with_tasks(&["a"]);
    let tags = |d: &Dispatcher| -> Vec<String> {
        d.store().get_at(1).unwrap().tags.iter().map(String::from).collect()
    };

    run(&mut d, &["tag 1 x y", "untag 1 x", "mark 1 done"]);
    assert_eq!(tags(&d), vec!["Y"]);
    assert!(d.store().get_at(1).unwrap().done);

    run(&mut d, &["undo"]);
    assert!(!d.store().get_at(1).unwrap().done);
    assert_eq!(tags(&d), vec!["Y"]);

    run(&mut d, &["undo"]);
    assert_eq!(tags(&d), vec!["X", "Y"]);
    assert!(!d.store().get_at(1).unwrap().done);

    // back to no tags at all
    run(&mut d, &["undo"]);
    assert!(tags(&d).is_empty());
    assert_eq!(d.undo_depth(), 1);
}

#[test]
fn test_rename_then_undo() {
    let mut d = with_tasks(&["a", "b"]);

    run(&mut d, &["name 1 alpha"]);
    assert_eq!(d.store().names(), vec!["alpha", "b"]);

    run(&mut d, &["undo"]);
    assert_eq!(d.store().names(), vec!["a", "b"]);
}

#[test]
fn test_due_then_undo_round_trips_time() {
    let mut d = with_tasks(&["a"]);
    run(&mut d, &["due 1 2025-07-01 17:45:30", "due 1 tomorrow"]);

    run(&mut d, &["undo"]);

    let expected = NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .and_hms_opt(17, 45, 30);
    assert_eq!(d.store().get_at(1).unwrap().deadline, expected);
}

#[test]
fn test_undo_on_empty_history_changes_nothing() {
    let mut d = with_tasks(&["a"]);
    let before = d.store().clone();

    let reply = d.handle("undo").unwrap();

    assert!(!reply.mutated);
    assert_eq!(d.store(), &before);
}

#[test]
fn test_machine_only_commands_are_refused() {
    let mut d = with_tasks(&["a"]);

    for line in ["dismiss 1", "recover 1", "unsort"] {
        let err = d.handle(line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RestrictedCommand);
    }
    assert_eq!(d.store().len(), 1);
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_importance_rank_dominates_deadline() {
    let mut d = with_tasks(&["A", "B"]);
    run(
        &mut d,
        &[
            "rank 1 low",
            "due 1 2025-01-01",
            "rank 2 high",
            "due 2 2025-02-01",
            "sort importance asc",
        ],
    );

    assert_eq!(d.store().names(), vec!["B", "A"]);
}

#[test]
fn test_sort_is_idempotent_and_undoable() {
    let mut d = with_tasks(&["pear", "apple", "fig"]);
    let original = d.store().names();

    run(&mut d, &["sort name desc"]);
    let sorted = d.store().names();
    run(&mut d, &["sort name desc"]);
    assert_eq!(d.store().names(), sorted);

    run(&mut d, &["undo", "undo"]);
    assert_eq!(d.store().names(), original);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_filter_done_then_clrsrc() {
    let mut d = with_tasks(&["a", "b", "c", "d"]);
    run(&mut d, &["mark 3 done", "filter done"]);

    assert_eq!(d.visible_indices(), vec![3]);

    run(&mut d, &["clrsrc"]);
    assert_eq!(d.visible_indices(), vec![1, 2, 3, 4]);
    assert_eq!(d.store().names(), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_active_search_follows_live_store() {
    let mut d = with_tasks(&["buy milk", "walk dog"]);
    run(&mut d, &["search milk"]);
    assert_eq!(d.visible_indices(), vec![1]);

    run(&mut d, &["add milk the cow"]);
    assert_eq!(d.visible_indices(), vec![1, 3]);
}

// =============================================================================
// Properties
// =============================================================================

fn names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,8}", 1..12).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_add_undo_is_identity(names in names_strategy(), extra in "[a-z]{1,8}[0-9]") {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut d = with_tasks(&refs);
        let before = d.store().clone();

        d.handle(&format!("add {}", extra)).unwrap();
        d.handle("undo").unwrap();

        prop_assert_eq!(d.store(), &before);
    }

    #[test]
    fn prop_delete_undo_is_identity(names in names_strategy(), pick in 0usize..100) {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut d = with_tasks(&refs);
        let index = pick % names.len() + 1;
        d.handle(&format!("rank {} medium", index)).unwrap();
        d.handle(&format!("tag {} t{}", index, pick)).unwrap();
        let before = d.store().clone();

        d.handle(&format!("delete {}", index)).unwrap();
        d.handle("undo").unwrap();

        prop_assert_eq!(d.store(), &before);
    }

    #[test]
    fn prop_index_bounds(names in names_strategy()) {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut d = with_tasks(&refs);
        let n = names.len();

        for bad in [0, n + 1] {
            let err = d.handle(&format!("view {}", bad)).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::IndexOutOfBounds);
        }
        prop_assert!(d.handle("view 1").is_ok());
        let last_cmd = format!("view {}", n);
        prop_assert!(d.handle(&last_cmd).is_ok());
    }
}
