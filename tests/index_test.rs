//! Integration tests for index maintenance: full rebuild, incremental
//! update, pinned preservation, and corrupt-document handling.

use labtrail::index;
use labtrail::record::{
    Experiment, ExperimentStatus, GraveyardEntry, Learning, LearningType, MetricDef,
    MetricResult, Project,
};
use labtrail::store::{Store, STORE_DIR};
use tempfile::TempDir;

fn init_store(direction: &str) -> (TempDir, Store) {
    let dir = TempDir::new().expect("tempdir");
    let store = Store::new(dir.path());
    store
        .init(&Project {
            name: "spaceship".to_string(),
            task_type: "binary_classification".to_string(),
            metric: MetricDef {
                name: "accuracy".to_string(),
                direction: direction.to_string(),
                baseline: None,
            },
            ..Project::default()
        })
        .expect("init");
    (dir, store)
}

fn experiment(id: &str, value: f64, status: ExperimentStatus, parents: &[&str]) -> Experiment {
    let mut exp = Experiment::new(
        id,
        MetricResult {
            name: "accuracy".to_string(),
            value,
            baseline: None,
            delta: None,
        },
        status,
    );
    exp.parents = parents.iter().map(|&p| p.to_string()).collect();
    exp
}

/// Three experiments, one degraded branch; best must be exp_003 and the
/// chain must follow the parent link back to exp_001.
fn seed_lineage(store: &Store) {
    for exp in [
        experiment("exp_001", 0.80, ExperimentStatus::Improved, &[]),
        experiment("exp_002", 0.75, ExperimentStatus::Degraded, &["exp_001"]),
        experiment("exp_003", 0.90, ExperimentStatus::Improved, &["exp_001"]),
    ] {
        store.write_experiment(&exp).expect("write");
    }
}

#[test]
fn test_rebuild_selects_best_and_chain() {
    let (_dir, store) = init_store("higher_is_better");
    seed_lineage(&store);

    let idx = index::rebuild(&store).expect("rebuild");
    let c = &idx.computed;
    assert_eq!(c.total_experiments, 3);
    assert_eq!(c.best_experiment, "exp_003");
    assert_eq!(c.best_metric.as_ref().expect("metric").value, 0.90);
    assert_eq!(c.experiment_chain, vec!["exp_001", "exp_003"]);
    assert_eq!(c.status_counts[&ExperimentStatus::Improved], 2);
    assert_eq!(c.status_counts[&ExperimentStatus::Degraded], 1);
}

#[test]
fn test_rebuild_lower_is_better() {
    let (_dir, store) = init_store("lower_is_better");
    store
        .write_experiment(&experiment("exp_001", 0.45, ExperimentStatus::Neutral, &[]))
        .expect("write");
    store
        .write_experiment(&experiment("exp_002", 0.31, ExperimentStatus::Improved, &["exp_001"]))
        .expect("write");

    let idx = index::rebuild(&store).expect("rebuild");
    assert_eq!(idx.computed.best_experiment, "exp_002");
}

#[test]
fn test_rebuild_skips_failed_experiments() {
    let (_dir, store) = init_store("higher_is_better");
    store
        .write_experiment(&experiment("exp_001", 0.70, ExperimentStatus::Improved, &[]))
        .expect("write");
    store
        .write_experiment(&experiment("exp_002", 0.99, ExperimentStatus::Failed, &["exp_001"]))
        .expect("write");

    let idx = index::rebuild(&store).expect("rebuild");
    assert_eq!(idx.computed.best_experiment, "exp_001");
}

#[test]
fn test_rebuild_idempotent_except_timestamp() {
    let (_dir, store) = init_store("higher_is_better");
    seed_lineage(&store);

    let mut first = index::rebuild(&store).expect("rebuild").computed;
    let mut second = index::rebuild(&store).expect("rebuild").computed;
    first.last_updated = None;
    second.last_updated = None;
    assert_eq!(first, second);
}

#[test]
fn test_rebuild_preserves_pinned() {
    let (_dir, store) = init_store("higher_is_better");
    seed_lineage(&store);

    let mut idx = store.read_index().expect("read");
    idx.pinned.do_not_try.push("target leakage via fare column".to_string());
    idx.pinned.notes = "fold seeds fixed at 42".to_string();
    store.write_index(&idx).expect("write");

    let rebuilt = index::rebuild(&store).expect("rebuild");
    assert_eq!(rebuilt.pinned.do_not_try, idx.pinned.do_not_try);
    assert_eq!(rebuilt.pinned.notes, "fold seeds fixed at 42");

    // and the persisted document agrees
    let persisted = store.read_index().expect("read");
    assert_eq!(persisted.pinned, idx.pinned);
}

#[test]
fn test_rebuild_refuses_corrupt_index_document() {
    let (dir, store) = init_store("higher_is_better");
    seed_lineage(&store);

    let index_path = dir.path().join(STORE_DIR).join("index.yaml");
    std::fs::write(&index_path, "computed: [not, a, mapping\n").expect("corrupt");

    let err = index::rebuild(&store).unwrap_err();
    assert!(err.to_string().contains("pinned data at risk"));

    // the corrupt document must not have been overwritten
    let raw = std::fs::read_to_string(&index_path).expect("read raw");
    assert!(raw.contains("not, a, mapping"));
}

#[test]
fn test_incremental_matches_rebuild() {
    let (_dir, store) = init_store("higher_is_better");

    let drafts = [
        experiment("exp_001", 0.80, ExperimentStatus::Improved, &[]),
        experiment("exp_002", 0.75, ExperimentStatus::Degraded, &["exp_001"]),
        experiment("exp_003", 0.90, ExperimentStatus::Improved, &["exp_001"]),
        experiment("exp_004", 0.85, ExperimentStatus::Neutral, &["exp_003"]),
    ];
    let mut incremental = store.read_index().expect("read");
    for exp in &drafts {
        store.write_experiment(exp).expect("write");
        incremental = index::update_incremental(&store, exp).expect("update");
    }

    let rebuilt = index::rebuild(&store).expect("rebuild");
    let (a, b) = (&incremental.computed, &rebuilt.computed);
    assert_eq!(a.best_experiment, b.best_experiment);
    assert_eq!(a.best_metric, b.best_metric);
    assert_eq!(a.experiment_chain, b.experiment_chain);
    assert_eq!(a.total_experiments, b.total_experiments);
    assert_eq!(a.status_counts, b.status_counts);
}

#[test]
fn test_incremental_ignores_worse_and_failed() {
    let (_dir, store) = init_store("higher_is_better");

    let best = experiment("exp_001", 0.90, ExperimentStatus::Improved, &[]);
    store.write_experiment(&best).expect("write");
    index::update_incremental(&store, &best).expect("update");

    let worse = experiment("exp_002", 0.85, ExperimentStatus::Degraded, &["exp_001"]);
    store.write_experiment(&worse).expect("write");
    let idx = index::update_incremental(&store, &worse).expect("update");
    assert_eq!(idx.computed.best_experiment, "exp_001");
    assert_eq!(idx.computed.total_experiments, 2);

    // a failed run with a huge metric value never takes the title
    let failed = experiment("exp_003", 99.0, ExperimentStatus::Failed, &["exp_001"]);
    store.write_experiment(&failed).expect("write");
    let idx = index::update_incremental(&store, &failed).expect("update");
    assert_eq!(idx.computed.best_experiment, "exp_001");
}

#[test]
fn test_incremental_rebuilds_when_index_missing() {
    let (dir, store) = init_store("higher_is_better");
    seed_lineage(&store);

    std::fs::remove_file(dir.path().join(STORE_DIR).join("index.yaml")).expect("remove");

    let exp = experiment("exp_004", 0.95, ExperimentStatus::Improved, &["exp_003"]);
    store.write_experiment(&exp).expect("write");
    let idx = index::update_incremental(&store, &exp).expect("fallback rebuild");
    assert_eq!(idx.computed.total_experiments, 4);
    assert_eq!(idx.computed.best_experiment, "exp_004");
    assert_eq!(
        idx.computed.experiment_chain,
        vec!["exp_001", "exp_003", "exp_004"]
    );
}

#[test]
fn test_rebuild_rejects_invalid_direction() {
    let (_dir, store) = init_store("sideways_is_better");
    let err = index::rebuild(&store).unwrap_err();
    assert!(err.to_string().contains("invalid metric direction"));
}

#[test]
fn test_learning_counts_refresh() {
    let (_dir, store) = init_store("higher_is_better");
    store
        .add_learning(Learning::new(LearningType::Proven, "scaling the fare column helps"))
        .expect("add");
    store
        .add_graveyard_entry(GraveyardEntry::new("deep stacking", "overfit the public split"))
        .expect("add");

    index::update_learning_counts(&store).expect("counts");
    let idx = store.read_index().expect("read");
    assert_eq!(idx.computed.proven_count, 1);
    assert_eq!(idx.computed.assumption_count, 0);
    assert_eq!(idx.computed.graveyard_count, 1);
}
