//! Reader for the per-barcode subread weight matrix,
//! `amplicon_analysis_subreads.<barcode>.csv`.

use crate::errors::LaaError;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Name of the weight matrix laa writes for `barcode`.
pub fn subreads_file(barcode: &str) -> String {
    format!("amplicon_analysis_subreads.{barcode}.csv")
}

/// Subread weights of one record. Only strictly positive weights are kept.
pub type SubreadWeights = BTreeMap<String, f64>;

/// Subread weights keyed by record identifier.
#[derive(Debug)]
pub struct WeightMatrix {
    path: PathBuf,
    weights: HashMap<String, SubreadWeights>,
}

impl WeightMatrix {
    pub fn from_path(path: &Path) -> Result<Self, LaaError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| LaaError::parse(path, e))?;
        let subread_ids: Vec<String> = rdr
            .headers()
            .map_err(|e| LaaError::parse(path, e))?
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();

        let mut weights = HashMap::new();
        let (mut n_kept, mut n_dropped) = (0usize, 0usize);
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| LaaError::parse(path, e))?;
            let mut fields = record.iter();
            let Some(id) = fields.next() else {
                continue;
            };
            let id = id.trim();
            let mut row = SubreadWeights::new();
            for (subread, v) in subread_ids.iter().zip(fields) {
                let v = v.trim();
                let weight: f64 = v.parse().map_err(|_| {
                    LaaError::parse(
                        path,
                        format!(
                            "on line {} in '{subread}' column: expected a weight but received '{v}'",
                            line + 2
                        ),
                    )
                })?;
                if weight > 0.0 {
                    row.insert(subread.clone(), weight);
                    n_kept += 1;
                } else {
                    n_dropped += 1;
                }
            }
            weights.insert(id.to_string(), row);
        }
        debug!(
            "read weights for {} records from {}: kept {n_kept}, dropped {n_dropped}",
            weights.len(),
            path.display()
        );
        Ok(WeightMatrix {
            path: path.to_path_buf(),
            weights,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SubreadWeights> {
        self.weights.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;

    fn write_matrix(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(subreads_file("0--0"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_subreads_file() {
        assert_eq!(subreads_file("0--0"), "amplicon_analysis_subreads.0--0.csv");
    }

    #[test]
    fn test_only_positive_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_matrix(
            dir.path(),
            "id,s1,s2,s3\nr1,0.6,0.0,-0.1\nr2,0,0,0\nr3,1e-3,0.25,1\n",
        );
        let m = WeightMatrix::from_path(&path).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(
            m.get("r1").unwrap(),
            &SubreadWeights::from([("s1".to_string(), 0.6)])
        );
        // A record with no contributing subreads is present and empty.
        assert!(m.get("r2").unwrap().is_empty());
        assert_eq!(m.get("r3").unwrap().len(), 3);
        assert!(m.get("r4").is_none());
        for w in ["r1", "r2", "r3"].iter().flat_map(|id| m.get(id).unwrap().values()) {
            assert!(*w > 0.0);
        }
    }

    #[test]
    fn test_non_numeric_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_matrix(dir.path(), "id,s1,s2\nr1,0.6,abc\n");
        let err = WeightMatrix::from_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("'s2'"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_ragged_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_matrix(dir.path(), "id,s1,s2\nr1,0.6\n");
        assert_eq!(
            WeightMatrix::from_path(&path).unwrap_err().kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = WeightMatrix::from_path(&dir.path().join(subreads_file("bc"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
