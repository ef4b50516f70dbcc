// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch in the model directory.
//
// Metrics recorded per epoch:
//   - epoch:          the epoch number (1, 2, 3, ...)
//   - train_loss:     backend-specific training loss
//                     (perceptron: fraction of tokens tagged wrong,
//                      neural: mean cross-entropy)
//   - val_precision / val_recall / val_f1:
//                     exact-match entity scores on the held-out set
//                     (all zero when no validation set was kept)
//
// Output file: <model_dir>/metrics.csv, rewritten on every run.
//
// Example CSV output:
//   epoch,train_loss,val_precision,val_recall,val_f1
//   1,0.214286,0.500000,0.333333,0.400000
//   2,0.071429,1.000000,0.666667,0.800000

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:         usize,
    pub train_loss:    f64,
    pub val_precision: f64,
    pub val_recall:    f64,
    pub val_f1:        f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:         usize,
        train_loss:    f64,
        val_precision: f64,
        val_recall:    f64,
        val_f1:        f64,
    ) -> Self {
        Self { epoch, train_loss, val_precision, val_recall, val_f1 }
    }

    /// True if this epoch's training loss beats `best_loss`
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.train_loss < best_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger, replacing any previous run's CSV.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,train_loss,val_precision,val_recall,val_f1")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_precision,
            m.val_recall,
            m.val_f1,
        )?;

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.25, 0.0, 0.0, 0.0);
        assert!(m.is_improvement(0.5));
        assert!(!m.is_improvement(0.1));
    }

    #[test]
    fn test_log_writes_header_and_rows() {
        let dir    = TempDir::new().unwrap();
        let logger = MetricsLogger::new(dir.path().to_string_lossy()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 1.0, 0.5, 2.0 / 3.0)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_precision,val_recall,val_f1");
        assert_eq!(lines[1], "1,0.500000,1.000000,0.500000,0.666667");
    }
}
