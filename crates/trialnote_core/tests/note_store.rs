use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use trialnote_core::{
    CorruptSnapshotPolicy, JsonSnapshotRepository, Note, NoteStore, NoteStoreError, Owner,
    PersistOutcome, RepoError, SessionContext, SnapshotRepository,
};

fn open_store(dir: &std::path::Path, name: &str) -> NoteStore<JsonSnapshotRepository> {
    let repo = JsonSnapshotRepository::open(dir).unwrap();
    let ctx = SessionContext::new(Owner::parse(name).unwrap());
    NoteStore::open(ctx, repo, CorruptSnapshotPolicy::Fail).unwrap()
}

fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

#[test]
fn add_edit_remove_scenario_preserves_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "alice");
    assert!(store.list().is_empty());

    store.add("a", "1").unwrap();
    store.add("b", "2").unwrap();
    assert_eq!(store.list(), vec![Note::new("a", "1"), Note::new("b", "2")]);

    store.edit("a", "9").unwrap();
    assert_eq!(store.list(), vec![Note::new("a", "9"), Note::new("b", "2")]);

    assert_eq!(store.remove("a"), 1);
    assert_eq!(store.list(), vec![Note::new("b", "2")]);
}

#[test]
fn duplicate_title_keeps_first_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "alice");

    store.add("title", "c1").unwrap();
    let err = store.add("title", "c2").unwrap_err();
    assert!(matches!(err, NoteStoreError::DuplicateTitle(ref t) if t == "title"));
    assert_eq!(store.list(), vec![Note::new("title", "c1")]);
}

#[test]
fn edit_missing_title_reports_not_found_without_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "alice");

    let err = store.edit("missing", "x").unwrap_err();
    assert!(matches!(err, NoteStoreError::NotFound(_)));
    assert!(store.is_empty());
}

#[test]
fn remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "alice");
    store.add("keep", "k").unwrap();
    store.add("drop", "d").unwrap();

    assert_eq!(store.remove("drop"), 1);
    let once = store.list();
    assert_eq!(store.remove("drop"), 0);
    assert_eq!(store.list(), once);
    assert_eq!(store.remove("never-existed"), 0);
}

#[test]
fn list_returns_detached_copy() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "alice");
    store.add("a", "1").unwrap();

    let mut copy = store.list();
    copy[0].content = "changed outside".to_string();
    copy.push(Note::new("a", "dup"));
    assert_eq!(store.list(), vec![Note::new("a", "1")]);
}

#[test]
fn mutations_do_not_touch_disk_until_persist() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), "bob");
    let snapshot = dir.path().join("notes_bob.json");

    store.add("a", "1").unwrap();
    assert!(!snapshot.exists());

    assert_eq!(
        store.persist_now().unwrap(),
        PersistOutcome::Written { notes: 1 }
    );
    assert!(snapshot.exists());
    assert_eq!(store.persist_now().unwrap(), PersistOutcome::Unchanged);

    store.remove("absent");
    assert_eq!(store.persist_now().unwrap(), PersistOutcome::Unchanged);
    store.edit("a", "2").unwrap();
    assert_eq!(
        store.persist_now().unwrap(),
        PersistOutcome::Written { notes: 1 }
    );
}

#[test]
fn reopen_loads_persisted_notes() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(dir.path(), "carol");
        store.add("first", "").unwrap();
        store.add("второй", "содержание ✓").unwrap();
        store.persist_now().unwrap();
        store.add("unsaved", "lost").unwrap();
    }

    let store = open_store(dir.path(), "carol");
    assert_eq!(
        store.list(),
        vec![Note::new("first", ""), Note::new("второй", "содержание ✓")]
    );
}

#[test]
fn corrupt_snapshot_fails_open_under_fail_policy() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes_dave.json"), "garbage").unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let ctx = SessionContext::new(Owner::parse("dave").unwrap());

    let err = NoteStore::open(ctx, repo, CorruptSnapshotPolicy::Fail)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NoteStoreError::Repo(RepoError::CorruptSnapshot { .. })
    ));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes_dave.json")).unwrap(),
        "garbage"
    );
}

#[test]
fn corrupt_snapshot_resets_to_empty_and_keeps_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes_dave.json"), "garbage").unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let ctx = SessionContext::new(Owner::parse("dave").unwrap());

    let store = NoteStore::open(ctx, repo, CorruptSnapshotPolicy::ResetToEmpty).unwrap();
    assert!(store.is_empty());

    let quarantined = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("notes_dave.json.corrupt-")
        })
        .count();
    assert_eq!(quarantined, 1);
}

#[test]
fn concurrent_adds_with_distinct_titles_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open_store(dir.path(), "erin"));
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for idx in 0..per_thread {
                    store.add(format!("w{worker}-n{idx}"), "x").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let notes = store.list();
    assert_eq!(notes.len(), threads * per_thread);
    let unique: HashSet<_> = titles(&notes).into_iter().collect();
    assert_eq!(unique.len(), notes.len());
}

#[test]
fn concurrent_mixed_operations_never_duplicate_titles() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open_store(dir.path(), "frank"));

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 0..200 {
                    let title = format!("shared-{}", round % 5);
                    match (worker + round) % 4 {
                        0 => {
                            let _ = store.add(title, "v");
                        }
                        1 => {
                            store.remove(&title);
                        }
                        2 => {
                            let _ = store.edit(&title, format!("w{worker}"));
                        }
                        _ => {
                            let _ = store.persist_now().unwrap();
                        }
                    }
                    let snapshot = store.list();
                    let unique: HashSet<_> = titles(&snapshot).into_iter().collect();
                    assert_eq!(unique.len(), snapshot.len());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    store.persist_now().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    assert_eq!(repo.load(store.owner()).unwrap(), store.list());
}

#[test]
fn snapshot_with_repeated_title_never_opens_with_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let payload = r#"[{"title":"a","content":"1"},{"title":"a","content":"2"}]"#;
    std::fs::write(dir.path().join("notes_amy.json"), payload).unwrap();

    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let ctx = SessionContext::new(Owner::parse("amy").unwrap());
    let err = NoteStore::open(ctx, repo, CorruptSnapshotPolicy::Fail)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NoteStoreError::Repo(RepoError::CorruptSnapshot { .. })
    ));

    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let ctx = SessionContext::new(Owner::parse("amy").unwrap());
    let store = NoteStore::open(ctx, repo, CorruptSnapshotPolicy::ResetToEmpty).unwrap();
    assert!(store.is_empty());
    store.add("a", "fresh").unwrap();
    store.edit("a", "9").unwrap();
    assert_eq!(store.list(), vec![Note::new("a", "9")]);
}
