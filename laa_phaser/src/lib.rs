//! Run laa, the long amplicon analysis tool, for one barcode of a
//! sequencing dataset and load its consensus sequences as typed records.

use serde::Serialize;

pub mod config;
pub mod errors;
pub mod merge;
pub mod options;
pub mod runner;
pub mod session;
pub mod subreads;
pub mod summary;

pub use config::LaaConfig;
pub use errors::{ErrorKind, LaaError};
pub use options::LaaOptions;
pub use session::{LaaPhaser, PhaserScope};
pub use subreads::SubreadWeights;

/// One consensus or noise sequence reported by laa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaaRecord {
    /// Sequence identifier, unique within one run.
    pub id: String,
    /// Consensus bases.
    pub sequence: String,
    /// Per-base Phred quality scores.
    pub qualities: Vec<u8>,
    /// Predicted accuracy of the consensus.
    pub quality: f64,
    /// Barcode the run was restricted to.
    pub barcode: String,
    /// Coarse cluster number.
    pub cluster: u32,
    /// Phase within the cluster.
    pub phase: u32,
    /// Total coverage.
    pub coverage: u64,
    /// True if the sequence was reported in the noise/chimera output.
    pub noise: bool,
    /// True if laa flagged the sequence as chimeric.
    pub chimera: bool,
    /// True if consensus calling converged.
    pub converged: bool,
    /// Contributing subreads and their membership weights, all positive.
    pub subreads: SubreadWeights,
}
