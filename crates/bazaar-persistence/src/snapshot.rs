//! JSON Lines snapshot store for per-item price quotes.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object for one item
//! - A corrupt line only loses that item, never the whole snapshot
//! - Saves write to a temp file and rename over the old snapshot, so a
//!   crash mid-save leaves the previous snapshot intact

use crate::error::PersistenceResult;
use bazaar_core::PriceSnapshotRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SNAPSHOT_FILE: &str = "prices.jsonl";
const SNAPSHOT_TMP: &str = "prices.jsonl.tmp";

/// Durable store for price snapshots.
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        if let Err(e) = fs::create_dir_all(&base_dir) {
            warn!(?e, dir = %base_dir.display(), "Failed to create snapshot directory");
        }
        Self { base_dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.base_dir.join(SNAPSHOT_FILE)
    }

    /// Write a full snapshot, replacing any previous one atomically.
    pub fn save(&self, records: &[PriceSnapshotRecord]) -> PersistenceResult<()> {
        let tmp_path = self.base_dir.join(SNAPSHOT_TMP);

        {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            let mut writer = BufWriter::new(file);

            for record in records {
                let json = serde_json::to_string(record)?;
                writeln!(writer, "{}", json)?;
            }

            writer.flush()?;
        }

        fs::rename(&tmp_path, self.snapshot_path())?;

        debug!(
            records = records.len(),
            path = %self.snapshot_path().display(),
            "Saved price snapshot"
        );

        Ok(())
    }

    /// Load the latest snapshot.
    ///
    /// A missing file yields an empty list; a corrupt line is logged and
    /// skipped. Neither case is an error, since items without a usable
    /// record fall back to their base-price pair at restore time.
    pub fn load(&self) -> PersistenceResult<Vec<PriceSnapshotRecord>> {
        let path = self.snapshot_path();
        if !path.exists() {
            info!(path = %path.display(), "No price snapshot found, starting from base prices");
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PriceSnapshotRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(line = line_no + 1, ?e, "Skipping corrupt snapshot line");
                }
            }
        }

        info!(
            records = records.len(),
            skipped,
            path = %path.display(),
            "Loaded price snapshot"
        );

        Ok(records)
    }
}
