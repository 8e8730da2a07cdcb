//! Integration tests for the file-backed store:
//! initialization, sequential ID allocation, atomic writes,
//! delete guards, and changelog capping.

use labtrail::record::{
    ChangelogEntry, Experiment, ExperimentStatus, MetricDef, MetricResult, Project,
};
use labtrail::store::{next_id, Store, MAX_CHANGELOG_ENTRIES, STORE_DIR};
use labtrail::Error;
use tempfile::TempDir;

fn test_project() -> Project {
    Project {
        name: "titanic".to_string(),
        task_type: "binary_classification".to_string(),
        metric: MetricDef {
            name: "accuracy".to_string(),
            direction: "higher_is_better".to_string(),
            baseline: None,
        },
        ..Project::default()
    }
}

fn init_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("tempdir");
    let store = Store::new(dir.path());
    store.init(&test_project()).expect("init");
    (dir, store)
}

fn experiment(id: &str, value: f64, status: ExperimentStatus) -> Experiment {
    Experiment::new(
        id,
        MetricResult {
            name: "accuracy".to_string(),
            value,
            baseline: None,
            delta: None,
        },
        status,
    )
}

#[test]
fn test_init_creates_layout() {
    let (dir, store) = init_store();
    let root = dir.path().join(STORE_DIR);
    assert!(store.exists());
    assert!(root.join("project.yaml").is_file());
    assert!(root.join("index.yaml").is_file());
    assert!(root.join("changelog.yaml").is_file());
    assert!(root.join("experiments").is_dir());
    assert!(root.join("learnings/learnings.yaml").is_file());
    assert!(root.join("learnings/graveyard.yaml").is_file());

    let project = store.read_project().expect("read project");
    assert_eq!(project.name, "titanic");
    assert_eq!(project.metric.direction, "higher_is_better");
}

#[test]
fn test_next_id_pads_to_three_digits() {
    assert_eq!(next_id("exp_", None::<&str>), "exp_001");
    assert_eq!(next_id("exp_", ["exp_001", "exp_002"]), "exp_003");
    assert_eq!(next_id("exp_", ["exp_005"]), "exp_006");
    assert_eq!(next_id("learn_", ["learn_041"]), "learn_042");
}

#[test]
fn test_next_id_widens_past_three_digits() {
    assert_eq!(next_id("exp_", ["exp_999"]), "exp_1000");
    assert_eq!(next_id("exp_", ["exp_1000"]), "exp_1001");
}

#[test]
fn test_next_id_ignores_malformed_suffixes() {
    assert_eq!(next_id("exp_", ["exp_abc", "readme.txt"]), "exp_001");
    assert_eq!(next_id("exp_", ["exp_002", "exp_xyz"]), "exp_003");
}

#[test]
fn test_experiment_roundtrip_and_sorted_listing() {
    let (_dir, store) = init_store();

    // write out of order, listing must come back sorted by ID
    for id in ["exp_003", "exp_001", "exp_002"] {
        store
            .write_experiment(&experiment(id, 0.8, ExperimentStatus::Improved))
            .expect("write");
    }

    let exps = store.list_experiments().expect("list");
    let ids: Vec<&str> = exps.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["exp_001", "exp_002", "exp_003"]);

    let exp = store.read_experiment("exp_002").expect("read");
    assert_eq!(exp.metric.name, "accuracy");
    assert_eq!(exp.status, ExperimentStatus::Improved);
}

#[test]
fn test_read_missing_experiment_is_not_found() {
    let (_dir, store) = init_store();
    let err = store.read_experiment("exp_404").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_next_experiment_id_follows_existing_files() {
    let (_dir, store) = init_store();
    assert_eq!(store.next_experiment_id().expect("id"), "exp_001");

    store
        .write_experiment(&experiment("exp_001", 0.8, ExperimentStatus::Improved))
        .expect("write");
    store
        .write_experiment(&experiment("exp_007", 0.9, ExperimentStatus::Improved))
        .expect("write");
    assert_eq!(store.next_experiment_id().expect("id"), "exp_008");
}

#[test]
fn test_delete_experiment_blocked_by_child_reference() {
    let (_dir, store) = init_store();
    store
        .write_experiment(&experiment("exp_001", 0.8, ExperimentStatus::Improved))
        .expect("write");
    let mut child = experiment("exp_002", 0.85, ExperimentStatus::Improved);
    child.parents = vec!["exp_001".to_string()];
    store.write_experiment(&child).expect("write");

    let err = store.delete_experiment("exp_001").unwrap_err();
    assert!(matches!(err, Error::ReferencedAsParent { .. }));
    assert!(err.to_string().contains("exp_002"));

    // the record must survive a refused delete
    assert!(store.read_experiment("exp_001").is_ok());

    // deleting the leaf first unblocks the parent
    store.delete_experiment("exp_002").expect("delete leaf");
    store.delete_experiment("exp_001").expect("delete root");
    assert!(store.list_experiments().expect("list").is_empty());
}

#[test]
fn test_changelog_caps_at_limit_dropping_oldest() {
    let (_dir, store) = init_store();

    for i in 0..MAX_CHANGELOG_ENTRIES + 5 {
        store
            .append_changelog(ChangelogEntry::new("exp_logged").with_id(format!("exp_{i}")))
            .expect("append");
    }

    let cf = store.read_changelog().expect("read");
    assert_eq!(cf.entries.len(), MAX_CHANGELOG_ENTRIES);
    // entries 0..5 rotated out, 5 is now the oldest
    assert_eq!(cf.entries[0].id, "exp_5");
    assert_eq!(
        cf.entries.last().expect("non-empty").id,
        format!("exp_{}", MAX_CHANGELOG_ENTRIES + 4)
    );
}

#[test]
fn test_append_changelog_defaults_timestamp() {
    let (_dir, store) = init_store();
    store
        .append_changelog(ChangelogEntry::new("add_learning").with_id("learn_001"))
        .expect("append");

    let cf = store.read_changelog().expect("read");
    assert!(cf.entries[0].timestamp.is_some());
}

#[test]
fn test_write_is_atomic_no_temp_files_left() {
    let (dir, store) = init_store();
    for i in 1..=5 {
        store
            .write_experiment(&experiment(
                &format!("exp_00{i}"),
                0.8,
                ExperimentStatus::Neutral,
            ))
            .expect("write");
    }

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join(STORE_DIR).join("experiments"))
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".labtrail-tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_learning_ids_span_both_lists() {
    use labtrail::record::{Learning, LearningType};

    let (_dir, store) = init_store();
    let id1 = store
        .add_learning(Learning::new(LearningType::Proven, "scaling helps"))
        .expect("add");
    let id2 = store
        .add_learning(Learning::new(LearningType::Assumption, "dropout hurts"))
        .expect("add");
    assert_eq!(id1, "learn_001");
    assert_eq!(id2, "learn_002");

    store.delete_learning("learn_001").expect("delete");
    let err = store.delete_learning("learn_001").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_context_docs_roundtrip() {
    let (_dir, store) = init_store();
    let doc: serde_yaml::Value =
        serde_yaml::from_str("columns:\n  - age\n  - fare\n").expect("parse");
    store.write_context("eda_summary", &doc).expect("write");

    assert_eq!(
        store.list_context_names().expect("list"),
        vec!["eda_summary".to_string()]
    );
    let back = store.read_context("eda_summary").expect("read");
    assert_eq!(back, doc);

    // path traversal in names is refused
    assert!(store.read_context("../project").is_err());
    assert!(store.write_context("a/b", &doc).is_err());
}
