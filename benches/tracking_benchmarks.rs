//! Tracking benchmarks
//!
//! Benchmarks for the metadata hot paths:
//! - Metric logging (per call and via extracted fields)
//! - Experiment get-or-create
//! - Data schema derivation from Arrow

use std::sync::Arc;

use arrow::array::{BooleanArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_mlops::experiment::DataSchema;
use trueno_mlops::fields::Fields;
use trueno_mlops::store::{MemoryMetadataStore, MetadataStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Benchmark appending metrics to a single run
fn bench_log_metric(c: &mut Criterion) {
    let rt = runtime();
    let store = MemoryMetadataStore::new();
    let run_id = rt.block_on(async {
        let experiment_id = store.create_experiment("bench").await.unwrap();
        store.create_run(experiment_id).await.unwrap()
    });

    c.bench_function("log_metric_memory", |b| {
        b.to_async(&rt)
            .iter(|| async { store.log_metric(run_id, "Loss", black_box(0.42)).await.unwrap() });
    });
}

/// Benchmark logging extracted fields, by field count
#[allow(clippy::cast_precision_loss)]
fn bench_log_fields(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("log_fields");

    for count in &[4usize, 16, 64] {
        let fields: Fields = (0..*count)
            .map(|i| (format!("Metric{i}"), i as f64 * 0.01))
            .collect();
        let context = trueno_mlops::Context::new(
            MemoryMetadataStore::new(),
            trueno_mlops::repository::LocalModelRepository::new(std::env::temp_dir()),
        );
        let run_id = rt.block_on(context.lifecycle().create_run_for_experiment("bench")).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &fields, |b, fields| {
            b.to_async(&rt)
                .iter(|| async { context.evaluation().log_metrics(run_id, fields).await.unwrap() });
        });
    }

    group.finish();
}

/// Benchmark get-or-create on an existing experiment
fn bench_create_experiment_existing(c: &mut Criterion) {
    let rt = runtime();
    let store = MemoryMetadataStore::new();
    rt.block_on(store.create_experiment("existing")).unwrap();

    c.bench_function("create_experiment_existing", |b| {
        b.to_async(&rt)
            .iter(|| async { store.create_experiment(black_box("existing")).await.unwrap() });
    });
}

/// Benchmark schema derivation from a record batch
fn bench_schema_from_batch(c: &mut Criterion) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Sentiment", DataType::Boolean, false),
        Field::new("Review", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(BooleanArray::from(vec![true; 1024])),
            Arc::new(StringArray::from_iter_values((0..1024).map(|i| format!("review {i}")))),
        ],
    )
    .unwrap();

    c.bench_function("schema_from_record_batch", |b| {
        b.iter(|| DataSchema::from_tabular(black_box(&batch)));
    });
}

criterion_group!(
    benches,
    bench_log_metric,
    bench_log_fields,
    bench_create_experiment_existing,
    bench_schema_from_batch
);
criterion_main!(benches);
