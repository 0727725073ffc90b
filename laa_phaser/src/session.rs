//! A scoped laa run for one barcode.

use crate::config::LaaConfig;
use crate::errors::LaaError;
use crate::merge::{SequenceMerger, CONSENSUS_FASTQ, NOISE_FASTQ};
use crate::options::LaaOptions;
use crate::runner::{locate, run_laa};
use crate::subreads::{subreads_file, WeightMatrix};
use crate::summary::{SummaryTable, SUMMARY_FILE};
use crate::LaaRecord;
use log::{debug, warn};
use std::ops::Deref;
use std::path::{Path, PathBuf};

const NOT_ACQUIRED: &str =
    "LaaPhaser is a scoped session! Acquire it with LaaPhaser::acquire to generate records";
const ALREADY_ACQUIRED: &str = "LaaPhaser sessions can only be acquired once";

#[derive(Debug)]
enum SessionState {
    Unacquired,
    Acquired(Vec<LaaRecord>),
    Released,
}

/// Runs laa against one barcode of a dataset and exposes the resulting
/// records while the session is acquired.
///
/// ```no_run
/// # use laa_phaser::LaaPhaser;
/// let mut phaser = LaaPhaser::new("0--0", "/data/subreads.xml", "--minLength 3000")?;
/// let scope = phaser.acquire()?;
/// for record in &scope {
///     println!("{} cluster {} phase {}", record.id, record.cluster, record.phase);
/// }
/// # Ok::<(), laa_phaser::LaaError>(())
/// ```
#[derive(Debug)]
pub struct LaaPhaser {
    barcode: String,
    dataset: PathBuf,
    options: LaaOptions,
    config: LaaConfig,
    state: SessionState,
}

impl LaaPhaser {
    /// Create a session that searches for laa on `PATH`. Fails if `options`
    /// contains an option the session controls itself.
    pub fn new(
        barcode: impl Into<String>,
        dataset: impl Into<PathBuf>,
        options: &str,
    ) -> Result<Self, LaaError> {
        Self::with_config(barcode, dataset, options, LaaConfig::from_env())
    }

    pub fn with_config(
        barcode: impl Into<String>,
        dataset: impl Into<PathBuf>,
        options: &str,
        config: LaaConfig,
    ) -> Result<Self, LaaError> {
        Ok(LaaPhaser {
            barcode: barcode.into(),
            dataset: dataset.into(),
            options: LaaOptions::parse(options)?,
            config,
            state: SessionState::Unacquired,
        })
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn dataset(&self) -> &Path {
        &self.dataset
    }

    pub fn options(&self) -> &LaaOptions {
        &self.options
    }

    pub fn is_acquired(&self) -> bool {
        matches!(self.state, SessionState::Acquired(_))
    }

    /// Run laa and load its outputs. The records are available until the
    /// returned scope is dropped. On failure the session is released and
    /// can not be used again.
    pub fn acquire(&mut self) -> Result<PhaserScope<'_>, LaaError> {
        if !matches!(self.state, SessionState::Unacquired) {
            return Err(LaaError::Usage {
                message: ALREADY_ACQUIRED,
            });
        }
        match self.generate_records() {
            Ok(records) => {
                self.state = SessionState::Acquired(records);
                Ok(PhaserScope { phaser: self })
            }
            Err(e) => {
                self.state = SessionState::Released;
                Err(e)
            }
        }
    }

    /// The records of an acquired session.
    pub fn records(&self) -> Result<&[LaaRecord], LaaError> {
        match &self.state {
            SessionState::Acquired(records) => Ok(records),
            SessionState::Unacquired | SessionState::Released => Err(LaaError::Usage {
                message: NOT_ACQUIRED,
            }),
        }
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, LaaRecord>, LaaError> {
        Ok(self.records()?.iter())
    }

    /// Discard the records. Releasing more than once has no further effect.
    pub fn release(&mut self) {
        if !matches!(self.state, SessionState::Released) {
            debug!("releasing laa session for barcode {}", self.barcode);
        }
        self.state = SessionState::Released;
    }

    /// Run laa in a fresh temporary directory and load its outputs. The
    /// directory is removed whether or not this succeeds.
    fn generate_records(&self) -> Result<Vec<LaaRecord>, LaaError> {
        let exe = locate(&self.config)?;
        let tmpdir = tempfile::Builder::new()
            .prefix("laa_phaser.")
            .tempdir()
            .map_err(|source| LaaError::Workspace { source })?;
        let result = run_laa(
            &exe,
            &self.barcode,
            &self.options,
            &self.dataset,
            tmpdir.path(),
        )
        .and_then(|()| self.load_outputs(tmpdir.path()));

        let tmpdir_path = tmpdir.path().to_path_buf();
        if let Err(e) = tmpdir.close() {
            warn!(
                "unable to remove laa working directory {}: {e}",
                tmpdir_path.display()
            );
        }
        result
    }

    fn load_outputs(&self, workdir: &Path) -> Result<Vec<LaaRecord>, LaaError> {
        let summary = SummaryTable::from_path(&workdir.join(SUMMARY_FILE))?;
        let weights = WeightMatrix::from_path(&workdir.join(subreads_file(&self.barcode)))?;
        let merger = SequenceMerger {
            barcode: &self.barcode,
            summary: &summary,
            weights: &weights,
        };
        let records = merger.merge(&workdir.join(CONSENSUS_FASTQ), &workdir.join(NOISE_FASTQ))?;
        debug!(
            "loaded {} laa records for barcode {}",
            records.len(),
            self.barcode
        );
        Ok(records)
    }
}

/// An acquired [`LaaPhaser`]. Dropping the scope releases the session.
#[derive(Debug)]
pub struct PhaserScope<'a> {
    phaser: &'a mut LaaPhaser,
}

impl PhaserScope<'_> {
    /// Consensus records in file order, followed by noise records in file order.
    pub fn records(&self) -> &[LaaRecord] {
        match &self.phaser.state {
            SessionState::Acquired(records) => records,
            // A scope only exists while its session is acquired.
            SessionState::Unacquired | SessionState::Released => &[],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LaaRecord> {
        self.records().iter()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl Deref for PhaserScope<'_> {
    type Target = LaaPhaser;

    fn deref(&self) -> &LaaPhaser {
        &*self.phaser
    }
}

impl<'s> IntoIterator for &'s PhaserScope<'_> {
    type Item = &'s LaaRecord;
    type IntoIter = std::slice::Iter<'s, LaaRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Drop for PhaserScope<'_> {
    fn drop(&mut self) {
        self.phaser.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn phaser(search_path: &Path) -> LaaPhaser {
        LaaPhaser::with_config(
            "0--0",
            "/data/subreads.xml",
            "--minLength 3000",
            LaaConfig::with_search_path([search_path]),
        )
        .unwrap()
    }

    #[test]
    fn test_reserved_option_rejected_at_construction() {
        let err = LaaPhaser::new("0--0", "/data/subreads.xml", "--doBc 1--1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_records_before_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let p = phaser(dir.path());
        assert_eq!(p.records().unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(p.iter().unwrap_err().kind(), ErrorKind::Usage);
        assert!(p.iter().unwrap_err().to_string().contains("scoped session"));
    }

    #[test]
    fn test_failed_acquire_releases() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = phaser(dir.path());
        let err = p.acquire().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolNotFound);
        assert!(!p.is_acquired());
        assert_eq!(p.iter().unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(p.acquire().unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = phaser(dir.path());
        p.release();
        p.release();
        assert_eq!(p.iter().unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(p.acquire().unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_acquired_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = phaser(dir.path());
        p.state = SessionState::Acquired(Vec::new());
        assert!(p.is_acquired());
        assert_eq!(p.iter().unwrap().count(), 0);
        p.release();
        assert!(!p.is_acquired());
    }
}
