use trialnote_core::{JsonSnapshotRepository, Note, Owner, RepoError, SnapshotRepository};

fn owner(name: &str) -> Owner {
    Owner::parse(name).unwrap()
}

#[test]
fn load_without_snapshot_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    assert!(repo.load(&owner("alice")).unwrap().is_empty());
}

#[test]
fn save_then_load_roundtrips_order_empty_strings_and_unicode() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let alice = owner("alice");

    let cases = vec![
        vec![],
        vec![Note::new("only", "one")],
        vec![
            Note::new("", ""),
            Note::new("Покупки", "молоко, хлеб"),
            Note::new("emoji 📝", "line one\nline \"two\"\t✓"),
            Note::new("z", "last"),
        ],
    ];

    for notes in cases {
        repo.save(&alice, &notes).unwrap();
        assert_eq!(repo.load(&alice).unwrap(), notes);
    }
}

#[test]
fn snapshots_are_isolated_per_owner() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    repo.save(&owner("alice"), &[Note::new("a", "1")]).unwrap();

    assert!(repo.load(&owner("bob")).unwrap().is_empty());
    assert!(dir.path().join("notes_alice.json").exists());
}

#[test]
fn reads_records_written_by_other_tools() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    std::fs::write(
        dir.path().join("notes_dave.json"),
        r#"[{"title": "Заметка", "content": "x"}]"#,
    )
    .unwrap();

    assert_eq!(
        repo.load(&owner("dave")).unwrap(),
        vec![Note::new("Заметка", "x")]
    );
}

#[test]
fn unparsable_snapshot_is_reported_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();

    for payload in [
        "not json",
        r#"{"title": "a", "content": "b"}"#,
        r#"[{"title": "a"}]"#,
        r#"[{"title": 1, "content": "b"}]"#,
    ] {
        std::fs::write(dir.path().join("notes_erin.json"), payload).unwrap();
        let err = repo.load(&owner("erin")).unwrap_err();
        assert!(
            matches!(err, RepoError::CorruptSnapshot { .. }),
            "payload `{payload}` should be corrupt, got {err:?}"
        );
    }
}

#[test]
fn failed_save_leaves_previous_snapshot_intact() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let frank = owner("frank");
    let original = vec![Note::new("keep", "me")];
    repo.save(&frank, &original).unwrap();

    std::fs::create_dir(dir.path().join("notes_frank.json.tmp")).unwrap();
    let err = repo
        .save(&frank, &[Note::new("new", "data")])
        .unwrap_err();
    assert!(matches!(err, RepoError::Io { .. }));
    assert_eq!(repo.load(&frank).unwrap(), original);
}

#[test]
fn quarantine_moves_corrupt_snapshot_aside() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    let grace = owner("grace");
    std::fs::write(repo.snapshot_path(&grace), "{{{").unwrap();

    let moved = repo.quarantine(&grace).unwrap().unwrap();
    assert!(!repo.snapshot_path(&grace).exists());
    assert_eq!(std::fs::read_to_string(moved).unwrap(), "{{{");
    assert!(repo.load(&grace).unwrap().is_empty());
}

#[test]
fn snapshot_with_repeated_title_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
    std::fs::write(
        dir.path().join("notes_amy.json"),
        r#"[{"title":"a","content":"1"},{"title":"b","content":"x"},{"title":"a","content":"2"}]"#,
    )
    .unwrap();

    match repo.load(&owner("amy")).unwrap_err() {
        RepoError::CorruptSnapshot { message, .. } => assert!(message.contains("duplicate title")),
        other => panic!("expected corrupt snapshot, got {other:?}"),
    }
}
