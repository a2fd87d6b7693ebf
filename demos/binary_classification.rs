//! Binary Classification Example
//!
//! Trains a small logistic regression on synthetic passenger data and
//! tracks the run: hyperparameters, training time, data schema, metrics,
//! confusion matrix and the saved model.
//!
//! Backends come from the file named by `TRUENO_MLOPS_CONFIG`, or default
//! to SQLite plus a local model directory under `.trueno-mlops/`.
//!
//! Run with: cargo run --example binary_classification

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use arrow::array::{BooleanArray, Float32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use trueno_mlops::experiment::ConfusionMatrix;
use trueno_mlops::Context;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SgdLogisticRegressionOptions {
    learning_rate: f64,
    l2_regularization: f64,
    number_of_iterations: u32,
    label_column_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BinaryClassificationMetrics {
    accuracy: f64,
    positive_precision: f64,
    positive_recall: f64,
    negative_precision: f64,
    negative_recall: f64,
    f1_score: f64,
    log_loss: f64,
}

struct Passenger {
    fare: f32,
    age: f32,
    survived: bool,
}

/// Deterministic passengers: cheaper fares and older ages survive less often.
#[allow(clippy::cast_precision_loss)]
fn passengers(count: u32) -> Vec<Passenger> {
    let mut state: u64 = 0x5DEE_CE66;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as f32 / (1u64 << 31) as f32
    };

    (0..count)
        .map(|_| {
            let fare = next();
            let age = next();
            let noise = next() - 0.5;
            Passenger {
                fare,
                age,
                survived: 1.5 * fare - age + 0.4 * noise > 0.0,
            }
        })
        .collect()
}

fn to_batch(rows: &[Passenger]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Survived", DataType::Boolean, false),
        Field::new("Fare", DataType::Float32, false),
        Field::new("Age", DataType::Float32, false),
    ]));
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(BooleanArray::from(rows.iter().map(|p| p.survived).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(rows.iter().map(|p| p.fare).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(rows.iter().map(|p| p.age).collect::<Vec<_>>())),
        ],
    )?)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn predict(weights: &[f64; 3], p: &Passenger) -> f64 {
    sigmoid(weights[0] + weights[1] * f64::from(p.fare) + weights[2] * f64::from(p.age))
}

#[allow(clippy::cast_precision_loss)]
fn train(options: &SgdLogisticRegressionOptions, rows: &[Passenger]) -> [f64; 3] {
    let mut weights = [0.0; 3];
    let n = rows.len() as f64;

    for _ in 0..options.number_of_iterations {
        let mut gradient = [0.0; 3];
        for p in rows {
            let error = predict(&weights, p) - if p.survived { 1.0 } else { 0.0 };
            gradient[0] += error;
            gradient[1] += error * f64::from(p.fare);
            gradient[2] += error * f64::from(p.age);
        }
        for (w, g) in weights.iter_mut().zip(gradient) {
            *w -= options.learning_rate * (g / n + options.l2_regularization * *w);
        }
    }
    weights
}

#[allow(clippy::cast_precision_loss)]
fn evaluate(weights: &[f64; 3], rows: &[Passenger]) -> Result<(BinaryClassificationMetrics, ConfusionMatrix)> {
    // counts[actual][predicted], class 0 = positive
    let mut counts = [[0.0f64; 2]; 2];
    let mut log_loss = 0.0;

    for p in rows {
        let probability = predict(weights, p).clamp(1e-12, 1.0 - 1e-12);
        let actual = usize::from(!p.survived);
        let predicted = usize::from(probability < 0.5);
        counts[actual][predicted] += 1.0;
        log_loss -= if p.survived { probability.ln() } else { (1.0 - probability).ln() };
    }

    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    let positive_precision = ratio(counts[0][0], counts[0][0] + counts[1][0]);
    let positive_recall = ratio(counts[0][0], counts[0][0] + counts[0][1]);
    let negative_precision = ratio(counts[1][1], counts[1][1] + counts[0][1]);
    let negative_recall = ratio(counts[1][1], counts[1][1] + counts[1][0]);

    let metrics = BinaryClassificationMetrics {
        accuracy: ratio(counts[0][0] + counts[1][1], rows.len() as f64),
        positive_precision,
        positive_recall,
        negative_precision,
        negative_recall,
        f1_score: ratio(
            2.0 * positive_precision * positive_recall,
            positive_precision + positive_recall,
        ),
        log_loss: log_loss / rows.len() as f64,
    };

    let matrix = ConfusionMatrix::new(
        vec![positive_precision, negative_precision],
        vec![positive_recall, negative_recall],
        counts.iter().map(|row| row.to_vec()).collect(),
    )?;

    Ok((metrics, matrix))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = trueno_mlops::logging::init();

    let ctx = Context::from_env()?;

    println!("Creating a run");
    let run_id = ctx
        .lifecycle()
        .create_run_for_experiment("Titanic Survival Predictor")
        .await?;
    println!("Run created with Id {run_id}");

    println!("Loading the data");
    let data = passengers(1000);
    let (train_set, test_set) = data.split_at(800);
    ctx.data().log_data(run_id, &to_batch(train_set)?).await?;

    println!("Training the model, please stand-by...");
    let options = SgdLogisticRegressionOptions {
        learning_rate: 0.5,
        l2_regularization: 0.001,
        number_of_iterations: 300,
        label_column_name: "Survived",
    };
    let started = Instant::now();
    let weights = train(&options, train_set);
    ctx.training().log_hyperparameters_from(run_id, &options).await?;
    ctx.lifecycle().set_training_time(run_id, started.elapsed()).await?;

    if let Some(run) = ctx.lifecycle().get_run(run_id).await? {
        println!("Training time: {:?}", run.training_time());
    }

    println!("Evaluating the model");
    let (metrics, matrix) = evaluate(&weights, test_set)?;
    println!("Logging metrics");
    ctx.evaluation().log_metrics_from(run_id, &metrics).await?;
    ctx.evaluation().log_confusion_matrix(run_id, &matrix).await?;

    let model_path = std::env::temp_dir().join("BinaryClassificationModel.json");
    std::fs::write(&model_path, serde_json::to_vec_pretty(&weights)?)?;

    println!("Uploading artifact");
    let reference = ctx.model().upload(run_id, &model_path).await?;
    println!("Stored model as {}", reference.key());

    for metric in ctx.evaluation().get_metrics(run_id).await? {
        println!("  {:<20} {:.4}", metric.name(), metric.value());
    }

    Ok(())
}
