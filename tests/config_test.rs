//! Opening a tracking context from configuration

use trueno_mlops::backend::{AnyMetadataStore, AnyModelRepository};
use trueno_mlops::config::{ArtifactBackend, MetadataBackend, CONFIG_ENV_VAR};
use trueno_mlops::{Context, TrackingConfig};

#[tokio::test]
async fn test_open_in_memory_context() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = Context::open(&TrackingConfig::in_memory(dir.path().join("downloads"))).unwrap();

    let source = dir.path().join("model.bin");
    tokio::fs::write(&source, b"in-memory model").await.unwrap();

    let run_id = ctx.lifecycle().create_run_for_experiment("config").await.unwrap();
    let reference = ctx.model().upload(run_id, &source).await.unwrap();
    let path = ctx.model().download(&reference).await.unwrap();

    assert!(path.starts_with(dir.path().join("downloads")));
    assert_eq!(tokio::fs::read(path).await.unwrap(), b"in-memory model");
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_context_persists_across_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrackingConfig {
        metadata: MetadataBackend::Sqlite {
            path: dir.path().join("metadata.db"),
        },
        artifacts: ArtifactBackend::Local {
            root: dir.path().join("models"),
        },
    };

    let run_id = {
        let ctx = Context::open(&config).unwrap();
        let run_id = ctx.lifecycle().create_run_for_experiment("Persisted").await.unwrap();
        ctx.evaluation().log_metric(run_id, "Accuracy", 0.93).await.unwrap();
        run_id
    };

    let reopened = Context::open(&config).unwrap();
    let run = reopened.lifecycle().get_run(run_id).await.unwrap().unwrap();
    let experiment = reopened
        .lifecycle()
        .get_experiment("Persisted")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run.experiment_id(), experiment.id());
    assert_eq!(reopened.evaluation().get_metrics(run_id).await.unwrap().len(), 1);
}

#[test]
fn test_backends_follow_config() {
    let dir = tempfile::tempdir().unwrap();

    let store = AnyMetadataStore::open(&MetadataBackend::Memory).unwrap();
    assert!(matches!(store, AnyMetadataStore::Memory(_)));

    let repository = AnyModelRepository::open(&ArtifactBackend::Local {
        root: dir.path().to_path_buf(),
    });
    assert!(matches!(repository, AnyModelRepository::Local(_)));
}

#[test]
fn test_from_env_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracking.json");
    std::fs::write(
        &path,
        r#"{ "metadata": { "kind": "memory" }, "artifacts": { "kind": "memory", "download_dir": "dl" } }"#,
    )
    .unwrap();

    // Only test in this binary touching the variable.
    std::env::set_var(CONFIG_ENV_VAR, &path);
    let config = TrackingConfig::from_env();
    std::env::remove_var(CONFIG_ENV_VAR);

    let config = config.unwrap();
    assert_eq!(config.metadata, MetadataBackend::Memory);
    assert_eq!(
        config.artifacts,
        ArtifactBackend::Memory {
            download_dir: "dl".into()
        }
    );
}
