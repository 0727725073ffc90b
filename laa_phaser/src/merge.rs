//! Join laa's FASTQ outputs with the summary table and weight matrix.

use crate::errors::LaaError;
use crate::subreads::WeightMatrix;
use crate::summary::SummaryTable;
use crate::LaaRecord;
use bio::io::fastq;
use std::path::Path;

/// Consensus sequences.
pub const CONSENSUS_FASTQ: &str = "amplicon_analysis.fastq";
/// Sequences laa judged to be noise or chimeras.
pub const NOISE_FASTQ: &str = "amplicon_analysis_chimeras_noise.fastq";

const PHRED_OFFSET: u8 = b'!';

fn phred_scores(path: &Path, id: &str, qual: &[u8]) -> Result<Vec<u8>, LaaError> {
    qual.iter()
        .map(|&q| {
            q.checked_sub(PHRED_OFFSET).ok_or_else(|| {
                LaaError::parse(
                    path,
                    format!("record '{id}' has an invalid quality character {:?}", q as char),
                )
            })
        })
        .collect()
}

/// Builds records for one barcode from the parsed summary and weight tables.
pub struct SequenceMerger<'a> {
    pub barcode: &'a str,
    pub summary: &'a SummaryTable,
    pub weights: &'a WeightMatrix,
}

impl SequenceMerger<'_> {
    /// Convert every entry of `fastq_path`, in file order, appending to `records`.
    /// An entry missing from either table is an error.
    pub fn merge_file(
        &self,
        fastq_path: &Path,
        noise: bool,
        records: &mut Vec<LaaRecord>,
    ) -> Result<(), LaaError> {
        let reader = fastq::Reader::from_file(fastq_path)
            .map_err(|e| LaaError::parse(fastq_path, format!("{e:#}")))?;
        for rec in reader.records() {
            let rec = rec.map_err(|e| LaaError::parse(fastq_path, e))?;
            rec.check()
                .map_err(|e| LaaError::parse(fastq_path, format!("record '{}': {e}", rec.id())))?;
            let id = rec.id();

            let Some(summary) = self.summary.get(id)? else {
                return Err(LaaError::UnknownRecord {
                    id: id.to_string(),
                    path: fastq_path.to_path_buf(),
                    missing: "summary table",
                });
            };
            let Some(subreads) = self.weights.get(id) else {
                return Err(LaaError::UnknownRecord {
                    id: id.to_string(),
                    path: fastq_path.to_path_buf(),
                    missing: "subread weight matrix",
                });
            };

            records.push(LaaRecord {
                id: id.to_string(),
                sequence: String::from_utf8_lossy(rec.seq()).into_owned(),
                qualities: phred_scores(fastq_path, id, rec.qual())?,
                quality: summary.accuracy,
                barcode: self.barcode.to_string(),
                cluster: summary.cluster,
                phase: summary.phase,
                coverage: summary.coverage,
                noise,
                chimera: summary.chimera,
                converged: summary.converged,
                subreads: subreads.clone(),
            });
        }
        Ok(())
    }

    /// Consensus records in file order, then noise records in file order.
    pub fn merge(&self, consensus: &Path, noise: &Path) -> Result<Vec<LaaRecord>, LaaError> {
        let mut records = Vec::new();
        for (path, is_noise) in [(consensus, false), (noise, true)] {
            self.merge_file(path, is_noise, &mut records)?;
        }
        Ok(records)
    }
}
