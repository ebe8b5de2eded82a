use super::*;

fn store() -> BoardStore {
    BoardStore::open_in_memory(SyncChannel::new()).unwrap()
}

fn logged_in() -> BoardStore {
    let s = store();
    s.login("sreesanth@hintro.com").unwrap();
    s
}

fn new_task_in(list_id: &str, board_id: &str, title: &str) -> NewTask {
    NewTask {
        title: Some(title.to_string()),
        list_id: Some(list_id.to_string()),
        board_id: Some(board_id.to_string()),
        ..Default::default()
    }
}

fn tasks_in_list(store: &BoardStore, board_id: &str, list_id: &str) -> Vec<Task> {
    store
        .tasks(board_id)
        .unwrap()
        .into_iter()
        .filter(|t| t.list_id == list_id)
        .collect()
}

/// A fresh board with empty lists, for tests that need a clean slate
fn empty_board(store: &BoardStore) -> (String, Vec<List>) {
    let board = store.create_board("Scratch").unwrap();
    let lists = store.lists(&board.id).unwrap();
    (board.id, lists)
}

// --- seeding ---

#[test]
fn seeds_demo_board_users_and_lists() {
    let s = store();
    let boards = s.boards().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].id, "b1");
    assert_eq!(boards[0].owner_id, "u1");

    let users = s.users().unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u2", "u3"]);

    let lists = s.lists("b1").unwrap();
    assert_eq!(lists.len(), 3);
    assert_eq!(
        lists.iter().map(|l| l.order).collect::<Vec<_>>(),
        [0, 1, 2]
    );

    assert_eq!(s.tasks("b1").unwrap().len(), 2);
}

// --- session ---

#[test]
fn login_matches_exact_email() {
    let s = store();
    let user = s.login("sarah@example.com").unwrap();
    assert_eq!(user.id, "u2");
    assert_eq!(s.current_user().unwrap().unwrap().id, "u2");
}

#[test]
fn login_falls_back_to_first_seeded_user() {
    let s = store();
    let user = s.login("nobody@x.com").unwrap();
    assert_eq!(user.id, "u1");
}

#[test]
fn signup_creates_user_and_session() {
    let s = store();
    let user = s.signup("Ada Lovelace", "ada@example.com").unwrap();
    assert_eq!(s.users().unwrap().len(), 4);
    assert!(user.avatar.ends_with("seed=Ada Lovelace"));
    assert_eq!(s.current_user().unwrap().unwrap().id, user.id);
}

#[test]
fn signup_does_not_enforce_email_uniqueness() {
    let s = store();
    let a = s.signup("One", "dup@example.com").unwrap();
    let b = s.signup("Two", "dup@example.com").unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(s.users().unwrap().len(), 5);
}

#[test]
fn logout_is_idempotent() {
    let s = store();
    s.login("sarah@example.com").unwrap();
    s.logout().unwrap();
    s.logout().unwrap();
    assert!(s.current_user().unwrap().is_none());
}

// --- boards ---

#[test]
fn create_board_seeds_three_starter_lists() {
    let s = logged_in();
    let board = s.create_board("Launch Plan").unwrap();
    let lists = s.lists(&board.id).unwrap();
    assert_eq!(lists.len(), 3);
    assert_eq!(
        lists.iter().map(|l| l.order).collect::<Vec<_>>(),
        [0, 1, 2]
    );
    assert_eq!(
        lists.iter().map(|l| l.title.as_str()).collect::<Vec<_>>(),
        ["To Do", "Doing", "Done"]
    );
}

#[test]
fn create_board_logs_one_activity() {
    let s = logged_in();
    assert_eq!(s.activities(1, 10).unwrap().total, 0);
    let board = s.create_board("Launch Plan").unwrap();
    let page = s.activities(1, 10).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].action, "created board \"Launch Plan\"");
    assert_eq!(page.items[0].target_id, board.id);
    assert_eq!(page.items[0].target_type, TargetType::Board);
}

#[test]
fn create_board_without_session_uses_default_owner() {
    let s = store();
    let board = s.create_board("Anonymous Board").unwrap();
    assert_eq!(board.owner_id, "u1");
    // Not user-attributable, so nothing is logged
    assert_eq!(s.activities(1, 10).unwrap().total, 0);
}

// --- task creation ---

#[test]
fn create_task_requires_list_and_board() {
    let s = store();
    let missing_list = NewTask {
        board_id: Some("b1".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        s.create_task(missing_list),
        Err(StoreError::Validation(_))
    ));

    let missing_board = NewTask {
        list_id: Some("l1".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        s.create_task(missing_board),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn create_task_applies_defaults() {
    let s = store();
    let task = s
        .create_task(NewTask {
            list_id: Some("l3".to_string()),
            board_id: Some("b1".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(task.title, "New Task");
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.description, "");
    assert!(task.assignee_id.is_none());
}

#[test]
fn sequential_creates_number_the_list_contiguously() {
    let s = logged_in();
    let (board_id, lists) = empty_board(&s);
    let list_id = lists[0].id.clone();
    for i in 0..5 {
        s.create_task(new_task_in(&list_id, &board_id, &format!("task {}", i)))
            .unwrap();
    }
    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(tasks.iter().map(|t| t.order).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
    assert_eq!(tasks[4].title, "task 4");
}

// --- task updates ---

#[test]
fn update_unknown_task_fails_and_leaves_collection_unchanged() {
    let s = store();
    let before: Vec<(String, i64)> = s
        .tasks("b1")
        .unwrap()
        .iter()
        .map(|t| (t.id.clone(), t.order))
        .collect();
    let err = s.update_task("missing", TaskPatch::default()).unwrap_err();
    assert!(matches!(err, StoreError::TaskNotFound(_)));
    let after: Vec<(String, i64)> = s
        .tasks("b1")
        .unwrap()
        .iter()
        .map(|t| (t.id.clone(), t.order))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn update_task_merges_fields_and_refreshes_updated_at() {
    let s = store();
    let before = s.tasks("b1").unwrap().into_iter().find(|t| t.id == "t1").unwrap();
    let updated = s
        .update_task(
            "t1",
            TaskPatch {
                title: Some("Architecture Deep Dive".to_string()),
                priority: Some(Priority::Low),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Architecture Deep Dive");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.description, before.description);
    assert_eq!(updated.assignee_id, before.assignee_id);
    assert!(updated.updated_at >= before.updated_at);
}

#[test]
fn assignment_wins_the_activity_message() {
    let s = logged_in();
    s.update_task(
        "t1",
        TaskPatch {
            assignee_id: Some(Some("u2".to_string())),
            // Even with a list change in the same patch, assignment wins
            list_id: Some("l2".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(
        page.items[0].action,
        "assigned \"Architecture Review\" to Sarah Chen"
    );
}

#[test]
fn unassigning_reads_as_unassigned() {
    let s = logged_in();
    s.update_task(
        "t1",
        TaskPatch {
            assignee_id: Some(None),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(
        page.items[0].action,
        "assigned \"Architecture Review\" to Unassigned"
    );
}

#[test]
fn unknown_assignee_reads_as_unassigned() {
    let s = logged_in();
    s.update_task(
        "t1",
        TaskPatch {
            assignee_id: Some(Some("u999".to_string())),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert!(page.items[0].action.ends_with("to Unassigned"));
}

#[test]
fn list_change_reads_as_moved_across_lists() {
    let s = logged_in();
    s.update_task(
        "t2",
        TaskPatch {
            list_id: Some("l3".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "moved \"Frontend UI Audit\" across lists");
}

#[test]
fn plain_update_mentions_the_previous_title() {
    let s = logged_in();
    s.update_task(
        "t1",
        TaskPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "updated \"Architecture Review\"");
}

#[test]
fn unchanged_assignee_falls_through_to_generic_update() {
    let s = logged_in();
    // t1 is already assigned to u1; re-sending the same assignee is not an
    // assignment event
    s.update_task(
        "t1",
        TaskPatch {
            assignee_id: Some(Some("u1".to_string())),
            ..Default::default()
        },
    )
    .unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "updated \"Architecture Review\"");
}

// --- task deletion ---

#[test]
fn delete_task_removes_it_and_renumbers_siblings() {
    let s = logged_in();
    let (board_id, lists) = empty_board(&s);
    let list_id = lists[0].id.clone();
    let a = s.create_task(new_task_in(&list_id, &board_id, "a")).unwrap();
    let b = s.create_task(new_task_in(&list_id, &board_id, "b")).unwrap();
    let c = s.create_task(new_task_in(&list_id, &board_id, "c")).unwrap();

    s.delete_task(&b.id).unwrap();

    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(
        tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        [a.id.as_str(), c.id.as_str()]
    );
    assert_eq!(tasks.iter().map(|t| t.order).collect::<Vec<_>>(), [0, 1]);
}

#[test]
fn delete_unknown_task_is_a_silent_noop_but_still_notifies() {
    let s = store();
    let rx = s.subscribe();
    s.delete_task("missing").unwrap();
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::TasksUpdated);
    assert!(rx.try_recv().is_err());
}

#[test]
fn delete_task_logs_activity() {
    let s = logged_in();
    s.delete_task("t2").unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "deleted \"Frontend UI Audit\"");
}

// --- task moves ---

fn seeded_list(s: &BoardStore, n: usize) -> (String, String, Vec<String>) {
    let (board_id, lists) = empty_board(s);
    let list_id = lists[0].id.clone();
    let ids = (0..n)
        .map(|i| {
            s.create_task(new_task_in(&list_id, &board_id, &format!("task {}", i)))
                .unwrap()
                .id
        })
        .collect();
    (board_id, list_id, ids)
}

#[test]
fn move_within_list_repositions_and_keeps_orders_contiguous() {
    let s = logged_in();
    let (board_id, list_id, ids) = seeded_list(&s, 4);

    s.move_task(&ids[0], &list_id, 2).unwrap();

    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(
        tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        [ids[1].as_str(), ids[2].as_str(), ids[0].as_str(), ids[3].as_str()]
    );
    assert_eq!(tasks.iter().map(|t| t.order).collect::<Vec<_>>(), [0, 1, 2, 3]);
}

#[test]
fn move_beyond_list_length_appends_at_the_end() {
    let s = logged_in();
    let (board_id, list_id, ids) = seeded_list(&s, 3);

    s.move_task(&ids[0], &list_id, 99).unwrap();

    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(tasks.last().unwrap().id, ids[0]);
    assert_eq!(tasks.last().unwrap().order, 2);
}

#[test]
fn negative_position_clamps_to_the_front() {
    let s = logged_in();
    let (board_id, list_id, ids) = seeded_list(&s, 3);

    s.move_task(&ids[2], &list_id, -5).unwrap();

    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(tasks[0].id, ids[2]);
    assert_eq!(tasks[0].order, 0);
}

#[test]
fn cross_list_move_renumbers_both_lists() {
    let s = logged_in();
    let (board_id, lists) = empty_board(&s);
    let src = lists[0].id.clone();
    let dst = lists[1].id.clone();
    let ids: Vec<String> = (0..3)
        .map(|i| {
            s.create_task(new_task_in(&src, &board_id, &format!("task {}", i)))
                .unwrap()
                .id
        })
        .collect();

    s.move_task(&ids[1], &dst, 0).unwrap();

    let src_tasks = tasks_in_list(&s, &board_id, &src);
    assert_eq!(src_tasks.iter().map(|t| t.order).collect::<Vec<_>>(), [0, 1]);
    let dst_tasks = tasks_in_list(&s, &board_id, &dst);
    assert_eq!(dst_tasks.len(), 1);
    assert_eq!(dst_tasks[0].id, ids[1]);
    assert_eq!(dst_tasks[0].order, 0);
    assert_eq!(dst_tasks[0].list_id, dst);
}

#[test]
fn move_into_another_boards_list_adopts_that_board() {
    let s = logged_in();
    let other = s.create_board("Other").unwrap();
    let target = s.lists(&other.id).unwrap()[0].id.clone();

    s.move_task("t1", &target, 0).unwrap();

    let tasks = s.tasks(&other.id).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t1");
    assert_eq!(tasks[0].board_id, other.id);
    // The source list in the original board is renumbered
    assert!(s.tasks("b1").unwrap().iter().all(|t| t.id != "t1"));
}

#[test]
fn move_unknown_task_publishes_nothing() {
    let s = store();
    let rx = s.subscribe();
    s.move_task("missing", "l1", 0).unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn move_logs_activity() {
    let s = logged_in();
    s.move_task("t1", "l2", 0).unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "moved \"Architecture Review\" across lists");

    s.move_task("t1", "l2", 1).unwrap();
    let page = s.activities(1, 1).unwrap();
    assert_eq!(page.items[0].action, "reordered \"Architecture Review\"");
}

// --- activity feed ---

#[test]
fn feed_paginates_newest_first() {
    let s = logged_in();
    let ids: Vec<String> = (0..25)
        .map(|i| {
            s.create_task(new_task_in("l1", "b1", &format!("task {}", i)))
                .unwrap()
                .id
        })
        .collect();

    let page = s.activities(2, 10).unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.items.len(), 10);
    // Newest-first indices 10..19 map back to creations #14 down to #5
    assert_eq!(page.items[0].target_id, ids[14]);
    assert_eq!(page.items[9].target_id, ids[5]);
}

#[test]
fn page_below_one_clamps_to_the_first_page() {
    let s = logged_in();
    for i in 0..5 {
        s.create_task(new_task_in("l1", "b1", &format!("task {}", i)))
            .unwrap();
    }
    let clamped = s.activities(0, 3).unwrap();
    let first = s.activities(1, 3).unwrap();
    let ids = |p: &ActivityPage| p.items.iter().map(|a| a.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&clamped), ids(&first));
}

#[test]
fn non_positive_page_size_is_rejected() {
    let s = store();
    assert!(matches!(
        s.activities(1, 0),
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        s.activities(1, -3),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn feed_is_capped_at_one_hundred_entries() {
    let s = logged_in();
    let ids: Vec<String> = (0..105)
        .map(|i| {
            s.create_task(new_task_in("l1", "b1", &format!("task {}", i)))
                .unwrap()
                .id
        })
        .collect();
    let page = s.activities(1, 10).unwrap();
    assert_eq!(page.total, 100);
    assert_eq!(&page.items[0].target_id, ids.last().unwrap());
}

#[test]
fn mutations_without_a_session_log_nothing() {
    let s = store();
    s.create_task(new_task_in("l1", "b1", "anonymous")).unwrap();
    assert_eq!(s.activities(1, 10).unwrap().total, 0);
}

// --- notifications ---

#[test]
fn create_task_publishes_activity_then_tasks() {
    let s = logged_in();
    let rx = s.subscribe();
    s.create_task(new_task_in("l1", "b1", "x")).unwrap();
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::ActivityUpdated);
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::TasksUpdated);
    assert!(rx.try_recv().is_err());
}

#[test]
fn create_board_publishes_boards_updated() {
    let s = logged_in();
    let rx = s.subscribe();
    s.create_board("X").unwrap();
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::ActivityUpdated);
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::BoardsUpdated);
}

#[test]
fn logged_out_mutations_publish_only_their_category() {
    let s = store();
    let rx = s.subscribe();
    s.create_task(new_task_in("l1", "b1", "x")).unwrap();
    assert_eq!(rx.try_recv().unwrap(), ChangeKind::TasksUpdated);
    assert!(rx.try_recv().is_err());
}

// --- serialized writes ---

#[test]
fn back_to_back_mutations_lose_neither_write() {
    let s = logged_in();
    let (board_id, lists) = empty_board(&s);
    let list_id = lists[0].id.clone();
    let a = s.create_task(new_task_in(&list_id, &board_id, "first")).unwrap();
    let b = s.create_task(new_task_in(&list_id, &board_id, "second")).unwrap();
    s.update_task(
        &a.id,
        TaskPatch {
            title: Some("first, renamed".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    s.delete_task(&b.id).unwrap();

    let tasks = tasks_in_list(&s, &board_id, &list_id);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "first, renamed");
    assert_eq!(tasks[0].order, 0);
}
