//! Experiment Tracking Example
//!
//! Walks through every catalog against fully in-memory backends:
//! experiments and runs, per-epoch metrics, hyperparameters, data schema,
//! confusion matrix and versioned model artifacts.
//!
//! Run with: cargo run --example experiment_tracking

use std::time::Duration;

use anyhow::Result;
use trueno_mlops::experiment::{ConfusionMatrix, DataColumn};
use trueno_mlops::fields::Fields;
use trueno_mlops::{Context, TrackingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = trueno_mlops::logging::init();

    println!("=== Trueno-MLOps Experiment Tracking ===\n");

    let workdir = tempfile::tempdir()?;
    let ctx = Context::open(&TrackingConfig::in_memory(workdir.path().join("downloads")))?;

    // -------------------------------------------------------------------------
    // 1. Create an experiment and two runs
    // -------------------------------------------------------------------------
    println!("1. Creating experiment and runs...");

    let experiment_id = ctx.lifecycle().create_experiment("ResNet50 ImageNet").await?;
    let baseline = ctx.lifecycle().create_run(experiment_id).await?;
    let tuned = ctx
        .lifecycle()
        .create_run_for_experiment("ResNet50 ImageNet")
        .await?;

    println!("   Experiment ID: {experiment_id}");
    println!("   Baseline run:  {baseline}");
    println!("   Tuned run:     {tuned}");

    // -------------------------------------------------------------------------
    // 2. Hyperparameters
    // -------------------------------------------------------------------------
    println!("\n2. Logging hyperparameters...");

    for (run_id, learning_rate) in [(baseline, 0.01), (tuned, 0.001)] {
        let parameters = Fields::new()
            .with("LearningRate", learning_rate)
            .with("BatchSize", 32)
            .with("Optimizer", "adam");
        let logged = ctx.training().log_hyperparameters(run_id, &parameters).await?;
        println!("   {run_id}: {logged} hyperparameters (Optimizer skipped)");
    }

    // -------------------------------------------------------------------------
    // 3. Training data schema
    // -------------------------------------------------------------------------
    println!("\n3. Logging data schema...");

    let columns = vec![
        DataColumn::new("Image", "Binary"),
        DataColumn::new("Label", "String"),
    ];
    for run_id in [baseline, tuned] {
        ctx.data().log_data(run_id, &columns).await?;
    }
    println!("   {} columns per run", columns.len());

    // -------------------------------------------------------------------------
    // 4. Simulated training loop with per-epoch metrics
    // -------------------------------------------------------------------------
    println!("\n4. Simulating training (5 epochs per run)...");

    for (run_id, speedup) in [(baseline, 1.0), (tuned, 1.4)] {
        for epoch in 0..5u32 {
            let loss = 2.5 / (f64::from(epoch) * speedup + 1.0) + 0.1;
            ctx.evaluation().log_metric(run_id, "Loss", loss).await?;
        }
        ctx.lifecycle()
            .set_training_time(run_id, Duration::from_secs(90))
            .await?;
    }

    // -------------------------------------------------------------------------
    // 5. Evaluation
    // -------------------------------------------------------------------------
    println!("\n5. Evaluating...");

    let matrix = ConfusionMatrix::new(
        vec![0.91, 0.87],
        vec![0.89, 0.90],
        vec![vec![445.0, 55.0], vec![50.0, 450.0]],
    )?;
    ctx.evaluation().log_confusion_matrix(tuned, &matrix).await?;

    for run_id in [baseline, tuned] {
        let losses: Vec<String> = ctx
            .evaluation()
            .get_metrics(run_id)
            .await?
            .iter()
            .map(|m| format!("{:.3}", m.value()))
            .collect();
        let has_matrix = ctx.evaluation().get_confusion_matrix(run_id).await?.is_some();
        println!("   {run_id}: loss [{}], confusion matrix: {has_matrix}", losses.join(", "));
    }

    // -------------------------------------------------------------------------
    // 6. Model artifacts
    // -------------------------------------------------------------------------
    println!("\n6. Uploading model checkpoints...");

    let checkpoint = workdir.path().join("resnet50.ckpt");
    for epoch in [3u8, 5] {
        std::fs::write(&checkpoint, vec![epoch; 1024])?;
        let reference = ctx.model().upload(tuned, &checkpoint).await?;
        println!("   {} ({} bytes)", reference.key(), reference.size_bytes());
    }

    let artifacts = ctx.model().get_artifacts(tuned).await?;
    if let Some(latest) = artifacts.last() {
        let path = ctx.model().download(latest).await?;
        println!("   Latest checkpoint downloaded to {}", path.display());
    }

    // -------------------------------------------------------------------------
    // 7. Summary
    // -------------------------------------------------------------------------
    println!("\n7. Summary");
    for experiment in ctx.lifecycle().list_experiments().await? {
        let runs = ctx.lifecycle().get_runs(experiment.id()).await?;
        println!("   {}: {} runs", experiment.name(), runs.len());
        for run in runs {
            println!("     {} trained for {:?}", run.id(), run.training_time());
        }
    }

    println!("\n=== Done ===");
    Ok(())
}
