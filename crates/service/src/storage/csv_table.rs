use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// One stored row, keyed by header column name (DictReader-style).
pub type Row = HashMap<String, String>;

/// CSV file-backed table with a fixed header row.
///
/// Every read parses the whole file; every write rewrites it from scratch.
/// The lock wraps the full read-modify-rewrite sequence so concurrent
/// writers within one process are serialized. Nothing protects against a
/// second process writing the same file; the workload assumes a single
/// logical writer.
pub struct CsvTable {
    path: PathBuf,
    header: &'static [&'static str],
    lock: RwLock<()>,
}

impl CsvTable {
    /// Open the table, creating the file with a header-only row if missing.
    pub async fn new<P: Into<PathBuf>>(
        path: P,
        header: &'static [&'static str],
    ) -> Result<Arc<Self>, ServiceError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.ok();
        }
        let table = Self {
            path,
            header,
            lock: RwLock::new(()),
        };
        table.ensure().await?;
        Ok(Arc::new(table))
    }

    /// Idempotent: writes a header-only file when the table does not exist
    /// yet. Safe to call on every process start.
    pub async fn ensure(&self) -> Result<(), ServiceError> {
        if fs::metadata(&self.path).await.is_err() {
            let data = encode(self.header, &[])?;
            fs::write(&self.path, data).await?;
        }
        Ok(())
    }

    /// Read all rows under a shared lock. A missing file reads as empty;
    /// an unparseable record is skipped rather than failing the read.
    pub async fn read(&self) -> Result<Vec<Row>, ServiceError> {
        let _guard = self.lock.read().await;
        self.read_unlocked().await
    }

    /// Run a read-modify-rewrite cycle under the exclusive lock. The
    /// closure receives the current rows and returns the full replacement
    /// contents; on error nothing is written.
    pub async fn update<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(Vec<Row>) -> Result<Vec<Vec<String>>, ServiceError>,
    {
        let _guard = self.lock.write().await;
        let rows = self.read_unlocked().await?;
        let replacement = f(rows)?;
        let data = encode(self.header, &replacement)?;
        fs::write(&self.path, data).await?;
        Ok(())
    }

    async fn read_unlocked(&self) -> Result<Vec<Row>, ServiceError> {
        let bytes = match fs::read(&self.path).await {
            Ok(b) => b,
            Err(_) => return Ok(Vec::new()),
        };
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = match reader.headers() {
            Ok(h) => h.clone(),
            Err(_) => return Ok(Vec::new()),
        };
        let mut rows = Vec::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };
            let mut row = Row::new();
            for (i, name) in headers.iter().enumerate() {
                row.insert(name.to_string(), record.get(i).unwrap_or("").to_string());
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

fn encode(header: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::Io(e.to_string()))
}

/// Render a float the way the storage format expects: whole values keep a
/// trailing `.0` (`12.0`, not `12`) so both services parse them alike.
pub fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
