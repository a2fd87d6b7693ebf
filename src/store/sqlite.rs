//! SQLite metadata store.
//!
//! Embedded relational backend. Experiment-name uniqueness is enforced by
//! a `UNIQUE` constraint, so several processes sharing one database file
//! still converge on a single experiment per name.
//!
//! # Schema
//!
//! ```sql
//! experiments        (id PK, name UNIQUE, created_at)
//! runs               (id PK, experiment_id FK, created_at, training_time_nanos NULL)
//! metrics            (seq PK AUTOINCREMENT, run_id FK, name, value, logged_at)
//! hyperparameters    (seq PK AUTOINCREMENT, run_id FK, name, value)
//! confusion_matrices (run_id PK FK, matrix JSON of f64 bit patterns)
//! data_schemas       (run_id PK FK, column_count)
//! data_columns       (run_id FK, position, name, data_type, PK(run_id, position))
//! artifacts          (seq PK AUTOINCREMENT, run_id FK, key, reference JSON)
//! ```
//!
//! Blocking SQLite calls run on the tokio blocking pool.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MetadataStore;
use crate::experiment::{
    ArtifactReference, ConfusionMatrix, DataColumn, DataSchema, Experiment, ExperimentId,
    HyperParameter, Metric, Run, RunId,
};
use crate::{Error, Result};

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS experiments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS runs (
        id TEXT PRIMARY KEY,
        experiment_id TEXT NOT NULL REFERENCES experiments(id),
        created_at TEXT NOT NULL,
        training_time_nanos INTEGER
    );
    CREATE TABLE IF NOT EXISTS metrics (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        run_id TEXT NOT NULL REFERENCES runs(id),
        name TEXT NOT NULL,
        value REAL NOT NULL,
        logged_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS hyperparameters (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        run_id TEXT NOT NULL REFERENCES runs(id),
        name TEXT NOT NULL,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS confusion_matrices (
        run_id TEXT PRIMARY KEY REFERENCES runs(id),
        matrix TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS data_schemas (
        run_id TEXT PRIMARY KEY REFERENCES runs(id),
        column_count INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS data_columns (
        run_id TEXT NOT NULL REFERENCES data_schemas(run_id),
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        data_type TEXT NOT NULL,
        PRIMARY KEY (run_id, position)
    );
    CREATE TABLE IF NOT EXISTS artifacts (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        run_id TEXT NOT NULL REFERENCES runs(id),
        key TEXT NOT NULL,
        reference TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_runs_experiment ON runs(experiment_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_metrics_run ON metrics(run_id, seq);
    CREATE INDEX IF NOT EXISTS idx_hyperparameters_run ON hyperparameters(run_id, seq);
    CREATE INDEX IF NOT EXISTS idx_artifacts_run ON artifacts(run_id, seq);
";

type RunRow = (String, String, DateTime<Utc>, Option<i64>);

/// Confusion matrix as persisted: every float as its IEEE-754 bit pattern.
///
/// Per-class precision is NaN whenever a class is never predicted, and
/// JSON has no NaN literal.
#[derive(Serialize, Deserialize)]
struct StoredMatrix {
    precision: Vec<u64>,
    recall: Vec<u64>,
    counts: Vec<Vec<u64>>,
}

impl StoredMatrix {
    fn encode(matrix: &ConfusionMatrix) -> Self {
        let bits = |values: &[f64]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        Self {
            precision: bits(matrix.per_class_precision()),
            recall: bits(matrix.per_class_recall()),
            counts: matrix.counts().iter().map(|row| bits(row)).collect(),
        }
    }

    fn decode(self) -> Result<ConfusionMatrix> {
        let floats = |values: Vec<u64>| values.into_iter().map(f64::from_bits).collect::<Vec<_>>();
        ConfusionMatrix::new(
            floats(self.precision),
            floats(self.recall),
            self.counts.into_iter().map(floats).collect(),
        )
    }
}

/// SQLite-backed metadata store.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMetadataStore").finish_non_exhaustive()
    }
}

impl SqliteMetadataStore {
    /// Open (or create) a database file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created, or
    /// the schema cannot be applied.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Self::initialize(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // A panic while holding the lock leaves the connection usable.
            let mut guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::StorageError(format!("SQLite task failed: {e}")))?
    }
}

fn parse_stored<T: FromStr<Err = Error>>(raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|e| Error::StorageError(format!("corrupt identifier in store: {e}")))
}

fn nanos_to_sql(duration: Duration) -> Result<i64> {
    i64::try_from(duration.as_nanos())
        .map_err(|_| Error::Validation(format!("training time {duration:?} is out of range")))
}

fn nanos_from_sql(nanos: i64) -> Result<Duration> {
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| Error::StorageError(format!("negative training time in store: {nanos}")))
}

fn ensure_run(conn: &Connection, run_id: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM runs WHERE id = ?1)",
        [run_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(Error::not_found("run", run_id))
    }
}

fn experiment_from_row(id: &str, name: String, created_at: DateTime<Utc>) -> Result<Experiment> {
    Ok(Experiment::builder(parse_stored(id)?, name)
        .created_at(created_at)
        .build())
}

fn run_from_row((id, experiment_id, created_at, nanos): RunRow) -> Result<Run> {
    let training_time = nanos.map(nanos_from_sql).transpose()?;
    Ok(Run::builder(parse_stored(&id)?, parse_stored(&experiment_id)?)
        .created_at(created_at)
        .training_time(training_time)
        .build())
}

impl MetadataStore for SqliteMetadataStore {
    async fn create_experiment(&self, name: &str) -> Result<ExperimentId> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let candidate = Experiment::new(name.as_str());
            let inserted = conn.execute(
                "INSERT INTO experiments (id, name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO NOTHING",
                params![candidate.id().to_string(), name, candidate.created_at()],
            )?;
            let id: String = conn.query_row(
                "SELECT id FROM experiments WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )?;
            if inserted == 1 {
                debug!(experiment = %name, %id, "created experiment");
            }
            parse_stored(&id)
        })
        .await
    }

    async fn get_experiment(&self, name: &str) -> Result<Option<Experiment>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let row: Option<(String, DateTime<Utc>)> = conn
                .query_row(
                    "SELECT id, created_at FROM experiments WHERE name = ?1",
                    [&name],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            row.map(|(id, created_at)| experiment_from_row(&id, name, created_at))
                .transpose()
        })
        .await
    }

    async fn get_experiment_by_id(&self, experiment_id: ExperimentId) -> Result<Option<Experiment>> {
        let id = experiment_id.to_string();
        self.with_conn(move |conn| {
            let row: Option<(String, DateTime<Utc>)> = conn
                .query_row(
                    "SELECT name, created_at FROM experiments WHERE id = ?1",
                    [&id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            row.map(|(name, created_at)| experiment_from_row(&id, name, created_at))
                .transpose()
        })
        .await
    }

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, created_at FROM experiments ORDER BY created_at")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, DateTime<Utc>>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter()
                .map(|(id, name, created_at)| experiment_from_row(&id, name, created_at))
                .collect()
        })
        .await
    }

    async fn create_run(&self, experiment_id: ExperimentId) -> Result<RunId> {
        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM experiments WHERE id = ?1)",
                [experiment_id.to_string()],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(Error::not_found("experiment", experiment_id));
            }

            let run = Run::new(experiment_id);
            conn.execute(
                "INSERT INTO runs (id, experiment_id, created_at) VALUES (?1, ?2, ?3)",
                params![
                    run.id().to_string(),
                    experiment_id.to_string(),
                    run.created_at()
                ],
            )?;
            debug!(%experiment_id, run_id = %run.id(), "created run");
            Ok(run.id())
        })
        .await
    }

    async fn get_run(&self, run_id: RunId) -> Result<Option<Run>> {
        self.with_conn(move |conn| {
            let row: Option<RunRow> = conn
                .query_row(
                    "SELECT id, experiment_id, created_at, training_time_nanos
                     FROM runs WHERE id = ?1",
                    [run_id.to_string()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;
            row.map(run_from_row).transpose()
        })
        .await
    }

    async fn get_runs(&self, experiment_id: ExperimentId) -> Result<Vec<Run>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, experiment_id, created_at, training_time_nanos
                 FROM runs WHERE experiment_id = ?1 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([experiment_id.to_string()], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<rusqlite::Result<Vec<RunRow>>>()?;
            rows.into_iter().map(run_from_row).collect()
        })
        .await
    }

    async fn set_training_time(&self, run_id: RunId, training_time: Duration) -> Result<()> {
        let nanos = nanos_to_sql(training_time)?;
        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE runs SET training_time_nanos = ?1 WHERE id = ?2",
                params![nanos, run_id.to_string()],
            )?;
            if updated == 0 {
                return Err(Error::not_found("run", run_id));
            }
            Ok(())
        })
        .await
    }

    async fn log_metric(&self, run_id: RunId, name: &str, value: f64) -> Result<()> {
        let metric = Metric::new(run_id, name, value);
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            ensure_run(conn, &run_id)?;
            conn.execute(
                "INSERT INTO metrics (run_id, name, value, logged_at) VALUES (?1, ?2, ?3, ?4)",
                params![run_id, metric.name(), metric.value(), metric.logged_at()],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_metrics(&self, run_id: RunId) -> Result<Vec<Metric>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, value, logged_at FROM metrics WHERE run_id = ?1 ORDER BY seq",
            )?;
            let metrics = stmt
                .query_map([run_id.to_string()], |row| {
                    Ok(Metric::builder(run_id, row.get::<_, String>(0)?, row.get(1)?)
                        .logged_at(row.get(2)?)
                        .build())
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(metrics)
        })
        .await
    }

    async fn log_hyperparameters(&self, run_id: RunId, parameters: &[(String, String)]) -> Result<()> {
        let parameters = parameters.to_vec();
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            let tx = conn.transaction()?;
            ensure_run(&tx, &run_id)?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO hyperparameters (run_id, name, value) VALUES (?1, ?2, ?3)",
                )?;
                for (name, value) in &parameters {
                    stmt.execute(params![run_id, name, value])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_hyperparameters(&self, run_id: RunId) -> Result<Vec<HyperParameter>> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("SELECT name, value FROM hyperparameters WHERE run_id = ?1 ORDER BY seq")?;
            let parameters = stmt
                .query_map([run_id.to_string()], |row| {
                    Ok(HyperParameter::new(
                        run_id,
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(parameters)
        })
        .await
    }

    async fn log_confusion_matrix(&self, run_id: RunId, matrix: &ConfusionMatrix) -> Result<()> {
        let json = serde_json::to_string(&StoredMatrix::encode(matrix))?;
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            ensure_run(conn, &run_id)?;
            conn.execute(
                "INSERT INTO confusion_matrices (run_id, matrix) VALUES (?1, ?2)
                 ON CONFLICT(run_id) DO UPDATE SET matrix = excluded.matrix",
                params![run_id, json],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_confusion_matrix(&self, run_id: RunId) -> Result<Option<ConfusionMatrix>> {
        self.with_conn(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT matrix FROM confusion_matrices WHERE run_id = ?1",
                    [run_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            json.map(|j| serde_json::from_str::<StoredMatrix>(&j)?.decode())
                .transpose()
        })
        .await
    }

    async fn log_data_schema(&self, run_id: RunId, schema: &DataSchema) -> Result<()> {
        let schema = schema.clone();
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            let tx = conn.transaction()?;
            ensure_run(&tx, &run_id)?;
            tx.execute(
                "INSERT INTO data_schemas (run_id, column_count) VALUES (?1, ?2)
                 ON CONFLICT(run_id) DO UPDATE SET column_count = excluded.column_count",
                params![run_id, schema.column_count()],
            )?;
            tx.execute("DELETE FROM data_columns WHERE run_id = ?1", [&run_id])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO data_columns (run_id, position, name, data_type)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (position, column) in schema.columns().iter().enumerate() {
                    stmt.execute(params![run_id, position, column.name(), column.data_type()])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_data_schema(&self, run_id: RunId) -> Result<Option<DataSchema>> {
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            let logged: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM data_schemas WHERE run_id = ?1)",
                [&run_id],
                |row| row.get(0),
            )?;
            if !logged {
                return Ok(None);
            }

            let mut stmt = conn.prepare(
                "SELECT name, data_type FROM data_columns WHERE run_id = ?1 ORDER BY position",
            )?;
            let columns = stmt
                .query_map([&run_id], |row| {
                    Ok(DataColumn::new(
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Some(DataSchema::new(columns)))
        })
        .await
    }

    async fn log_artifact(&self, run_id: RunId, artifact: &ArtifactReference) -> Result<()> {
        let key = artifact.key().to_string();
        let json = serde_json::to_string(artifact)?;
        self.with_conn(move |conn| {
            let run_id = run_id.to_string();
            ensure_run(conn, &run_id)?;
            conn.execute(
                "INSERT INTO artifacts (run_id, key, reference) VALUES (?1, ?2, ?3)",
                params![run_id, key, json],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_artifacts(&self, run_id: RunId) -> Result<Vec<ArtifactReference>> {
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT reference FROM artifacts WHERE run_id = ?1 ORDER BY seq")?;
            let rows = stmt
                .query_map([run_id.to_string()], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.iter()
                .map(|json| serde_json::from_str(json).map_err(Error::from))
                .collect()
        })
        .await
    }
}
