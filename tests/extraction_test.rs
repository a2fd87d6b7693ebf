//! Metric and hyperparameter extraction from caller-shaped structs
//!
//! Selection rules pinned here:
//! - metrics: float fields only (finite values)
//! - hyperparameters: float and integer fields, rendered as text
//! - text, boolean and nested fields are skipped without error

use serde::Serialize;
use trueno_mlops::blob::MemoryBlobStore;
use trueno_mlops::experiment::RunId;
use trueno_mlops::fields::{FieldValue, Fields};
use trueno_mlops::repository::ObjectStoreModelRepository;
use trueno_mlops::store::MemoryMetadataStore;
use trueno_mlops::{Context, ErrorKind};

type TestContext = Context<MemoryMetadataStore, ObjectStoreModelRepository<MemoryBlobStore>>;

async fn setup() -> (TestContext, RunId) {
    let ctx = Context::new(
        MemoryMetadataStore::new(),
        ObjectStoreModelRepository::new(MemoryBlobStore::new(), std::env::temp_dir()),
    );
    let run_id = ctx
        .lifecycle()
        .create_run_for_experiment("Extraction")
        .await
        .unwrap();
    (ctx, run_id)
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TrainerOptions {
    learning_rate: f64,
    iteration_count: i32,
    label: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CalibratedBinaryClassificationMetrics {
    accuracy: f64,
    area_under_roc_curve: f64,
    f1_score: f64,
    log_loss: f64,
    positive_precision: f64,
    positive_recall: f64,
    confusion_matrix: Vec<Vec<f64>>,
}

#[tokio::test]
async fn test_hyperparameters_from_trainer_options() {
    let (ctx, run_id) = setup().await;

    let options = TrainerOptions {
        learning_rate: 0.1,
        iteration_count: 50,
        label: "positive",
    };
    let logged = ctx
        .training()
        .log_hyperparameters_from(run_id, &options)
        .await
        .unwrap();
    assert_eq!(logged, 2);

    let mut parameters: Vec<(String, String)> = ctx
        .training()
        .get_hyperparameters(run_id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.name().to_string(), p.value().to_string()))
        .collect();
    parameters.sort();

    assert_eq!(
        parameters,
        vec![
            ("IterationCount".to_string(), "50".to_string()),
            ("LearningRate".to_string(), "0.1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_metrics_from_evaluation_result() {
    let (ctx, run_id) = setup().await;

    let result = CalibratedBinaryClassificationMetrics {
        accuracy: 0.81,
        area_under_roc_curve: 0.87,
        f1_score: 0.74,
        log_loss: 0.45,
        positive_precision: 0.77,
        positive_recall: 0.69,
        confusion_matrix: vec![vec![480.0, 69.0], vec![106.0, 236.0]],
    };
    let logged = ctx.evaluation().log_metrics_from(run_id, &result).await.unwrap();
    assert_eq!(logged, 6);

    let metrics = ctx.evaluation().get_metrics(run_id).await.unwrap();
    assert_eq!(metrics.len(), 6);
    assert!(metrics.iter().all(|m| m.name() != "ConfusionMatrix"));
    let auc = metrics
        .iter()
        .find(|m| m.name() == "AreaUnderRocCurve")
        .unwrap();
    assert!((auc.value() - 0.87).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_explicit_fields_without_serde() {
    let (ctx, run_id) = setup().await;

    let fields: Fields = [
        ("Rmse", FieldValue::from(1.25)),
        ("Epochs", FieldValue::from(10)),
        ("Shuffle", FieldValue::from(true)),
    ]
    .into_iter()
    .collect();

    assert_eq!(ctx.evaluation().log_metrics(run_id, &fields).await.unwrap(), 1);
    assert_eq!(ctx.training().log_hyperparameters(run_id, &fields).await.unwrap(), 2);
}

#[tokio::test]
async fn test_non_struct_source_is_validation_error() {
    let (ctx, run_id) = setup().await;

    let err = ctx
        .evaluation()
        .log_metrics_from(run_id, &vec![0.1, 0.2])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_empty_source_logs_nothing() {
    let (ctx, run_id) = setup().await;

    let logged = ctx
        .training()
        .log_hyperparameters(run_id, &Fields::new())
        .await
        .unwrap();
    assert_eq!(logged, 0);
    assert!(ctx.training().get_hyperparameters(run_id).await.unwrap().is_empty());
}
