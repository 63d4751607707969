//! End-to-end pipeline tests: snapshot, diff, plan, commit across runs.

use std::fs;
use std::path::{Path, PathBuf};

use entrycache::config::Options;
use entrycache::input::BuildInput;
use entrycache::session::{BuildPlan, BuildSession};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Public root with `a.txt` and `b.txt`; entries root `pages` with one entry
/// `x` containing one file.
fn seed_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", "alpha");
    write_file(dir.path(), "b.txt", "beta");
    write_file(dir.path(), "pages/x/main.ts", "entry x");
    dir
}

fn options_for(dir: &TempDir) -> Options {
    Options::new(dir.path(), "pages")
}

fn run(options: &Options) -> (BuildSession, entrycache::DiffResult) {
    let mut session = BuildSession::new(options.clone()).unwrap();
    let diff = session.compute().unwrap();
    (session, diff)
}

#[test]
fn first_run_classifies_everything_as_added() {
    let dir = seed_project();
    let (_, diff) = run(&options_for(&dir));

    let expected_public: Vec<PathBuf> =
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")];
    let added: Vec<PathBuf> = diff.public.added.iter().cloned().collect();
    assert_eq!(added, expected_public);

    let entries_added: Vec<PathBuf> = diff.entries.added.iter().cloned().collect();
    assert_eq!(entries_added, vec![dir.path().join("pages/x")]);

    assert!(diff.public.changed);
    assert!(diff.entries.changed);
}

#[test]
fn committed_run_then_no_changes_yields_empty_diff() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    let (_, diff) = run(&options);
    assert!(!diff.public.changed);
    assert!(!diff.entries.changed);
    assert!(diff.public.is_empty());
    assert!(diff.entries.is_empty());
}

#[test]
fn pipeline_is_idempotent_with_byte_identical_cache() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();
    let first_cache = fs::read(&options.cache_path).unwrap();

    let (mut session, diff) = run(&options);
    assert!(!diff.any_changed());
    session.commit().unwrap();
    let second_cache = fs::read(&options.cache_path).unwrap();

    assert_eq!(first_cache, second_cache);
}

#[test]
fn edits_adds_and_deletes_are_classified_per_category() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    write_file(dir.path(), "a.txt", "alpha v2");
    fs::remove_file(dir.path().join("b.txt")).unwrap();
    write_file(dir.path(), "c.txt", "gamma");
    write_file(dir.path(), "pages/y/main.ts", "entry y");

    let (_, diff) = run(&options);

    assert!(diff.public.edited.contains(&dir.path().join("a.txt")));
    assert!(diff.public.deleted.contains(&dir.path().join("b.txt")));
    assert!(diff.public.added.contains(&dir.path().join("c.txt")));
    assert!(diff.entries.added.contains(&dir.path().join("pages/y")));
    assert!(diff.entries.edited.is_empty());
}

#[test]
fn entry_subtree_changes_mark_entry_edited_not_public() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    write_file(dir.path(), "pages/x/extra.ts", "more code");
    let (_, diff) = run(&options);

    assert!(!diff.public.changed, "entries root must not leak into public");
    assert_eq!(
        diff.entries.edited.iter().cloned().collect::<Vec<_>>(),
        vec![dir.path().join("pages/x")]
    );
}

#[test]
fn corrupt_cache_behaves_like_first_run() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    fs::write(&options.cache_path, "definitely { not json").unwrap();
    let (_, diff) = run(&options);

    assert!(diff.public.changed);
    assert_eq!(diff.public.added.len(), 2);
    assert_eq!(diff.entries.added.len(), 1);
}

#[test]
fn gitignore_patterns_exclude_public_files() {
    let dir = seed_project();
    write_file(dir.path(), ".gitignore", "# build output\n*.log\n");
    write_file(dir.path(), "debug.log", "noise");

    let (_, diff) = run(&options_for(&dir));

    assert!(!diff.public.added.contains(&dir.path().join("debug.log")));
    assert!(diff.public.added.contains(&dir.path().join("a.txt")));
}

#[test]
fn public_edit_forces_full_rebuild_plan() {
    let dir = seed_project();
    write_file(dir.path(), "pages/y/main.ts", "entry y");
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    // A shared asset changes while an entry changes too; public wins.
    write_file(dir.path(), "a.txt", "alpha v2");
    write_file(dir.path(), "pages/y/main.ts", "entry y v2");
    let (session, _) = run(&options);

    let input = BuildInput::Map(vec![
        ("x".to_string(), PathBuf::from("pages/x/main.ts")),
        ("y".to_string(), PathBuf::from("pages/y/main.ts")),
    ]);
    assert_eq!(session.plan(&input).unwrap(), BuildPlan::Full);
}

#[test]
fn entry_edits_scope_the_input_set() {
    let dir = seed_project();
    write_file(dir.path(), "pages/y/main.ts", "entry y");
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    write_file(dir.path(), "pages/y/main.ts", "entry y v2");
    let (session, _) = run(&options);

    let input = BuildInput::Map(vec![
        ("x".to_string(), PathBuf::from("pages/x/main.ts")),
        ("y".to_string(), PathBuf::from("pages/y/main.ts")),
    ]);
    assert_eq!(
        session.plan(&input).unwrap(),
        BuildPlan::Partial(BuildInput::Map(vec![(
            "y".to_string(),
            PathBuf::from("pages/y/main.ts")
        )]))
    );
}

#[test]
fn deleted_entry_with_no_edits_falls_back_to_first_declared_input() {
    let dir = seed_project();
    write_file(dir.path(), "pages/y/main.ts", "entry y");
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    fs::remove_dir_all(dir.path().join("pages/x")).unwrap();
    let (session, diff) = run(&options);
    assert_eq!(diff.entries.deleted.len(), 1);
    assert!(diff.entries.added.is_empty() && diff.entries.edited.is_empty());

    // Declared inputs still reference the deleted entry; the plan must pick
    // the first declared input rather than returning an empty set.
    let input = BuildInput::Map(vec![
        ("x".to_string(), PathBuf::from("pages/x/main.ts")),
        ("y".to_string(), PathBuf::from("pages/y/main.ts")),
    ]);
    assert_eq!(
        session.plan(&input).unwrap(),
        BuildPlan::Partial(BuildInput::Map(vec![(
            "x".to_string(),
            PathBuf::from("pages/x/main.ts")
        )]))
    );
}

#[test]
fn unchanged_entries_leave_restriction_empty_without_deletions() {
    let dir = seed_project();
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    // Only a new entry appears; inputs referencing other directories simply
    // filter to nothing and the build tool's own validation takes over.
    write_file(dir.path(), "pages/z/main.ts", "entry z");
    let (session, _) = run(&options);

    let input = BuildInput::Map(vec![(
        "other".to_string(),
        PathBuf::from("elsewhere/main.ts"),
    )]);
    assert_eq!(
        session.plan(&input).unwrap(),
        BuildPlan::Partial(BuildInput::Map(Vec::new()))
    );
}

#[test]
fn missing_entries_root_yields_empty_entries_category() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", "alpha");

    let (_, diff) = run(&Options::new(dir.path(), "pages"));

    assert!(diff.public.changed);
    assert!(diff.entries.is_empty());
    assert!(!diff.entries.changed);
}

#[test]
fn absolute_declared_inputs_match_affected_entries() {
    let dir = seed_project();
    write_file(dir.path(), "pages/y/main.ts", "entry y");
    let options = options_for(&dir);

    let (mut session, _) = run(&options);
    session.commit().unwrap();

    write_file(dir.path(), "pages/y/main.ts", "entry y v2");
    let (session, _) = run(&options);

    let input = BuildInput::List(vec![
        dir.path().join("pages/x/main.ts"),
        dir.path().join("pages/y/main.ts"),
    ]);
    assert_eq!(
        session.plan(&input).unwrap(),
        BuildPlan::Partial(BuildInput::List(vec![dir.path().join("pages/y/main.ts")]))
    );
}
