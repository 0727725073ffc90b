//! Reader for `amplicon_analysis_summary.csv`.

use crate::errors::LaaError;
use csv::StringRecord;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const SUMMARY_FILE: &str = "amplicon_analysis_summary.csv";

/// Number of leading columns that precede the data fields of each row.
/// The record identifier is the second of them.
const PREFIX_COLUMNS: usize = 2;

const CLUSTER: &str = "CoarseCluster";
const PHASE: &str = "Phase";
const COVERAGE: &str = "TotalCoverage";
const ACCURACY: &str = "PredictedAccuracy";
const CONVERGED: &str = "ConsensusConverged";
const CHIMERA: &str = "IsChimera";

/// Positions of the required columns, relative to the end of the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    cluster: usize,
    phase: usize,
    coverage: usize,
    accuracy: usize,
    converged: usize,
    chimera: usize,
}

impl Columns {
    fn from_header(path: &Path, header: &StringRecord) -> Result<Self, LaaError> {
        let find = |name: &str| {
            header
                .iter()
                .skip(PREFIX_COLUMNS)
                .position(|h| h.trim() == name)
                .ok_or_else(|| LaaError::parse(path, format!("missing required column '{name}'")))
        };
        Ok(Columns {
            cluster: find(CLUSTER)?,
            phase: find(PHASE)?,
            coverage: find(COVERAGE)?,
            accuracy: find(ACCURACY)?,
            converged: find(CONVERGED)?,
            chimera: find(CHIMERA)?,
        })
    }
}

/// The summary fields of one consensus sequence, after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRow {
    pub cluster: u32,
    pub phase: u32,
    pub coverage: u64,
    pub accuracy: f64,
    pub converged: bool,
    pub chimera: bool,
}

/// Summary rows keyed by record identifier. The data fields are kept
/// as text and only coerced when a record is looked up.
#[derive(Debug)]
pub struct SummaryTable {
    path: PathBuf,
    columns: Columns,
    rows: HashMap<String, Vec<String>>,
}

impl SummaryTable {
    pub fn from_path(path: &Path) -> Result<Self, LaaError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| LaaError::parse(path, e))?;
        let header = rdr.headers().map_err(|e| LaaError::parse(path, e))?.clone();
        let columns = Columns::from_header(path, &header)?;

        let mut rows = HashMap::new();
        for record in rdr.records() {
            let record = record.map_err(|e| LaaError::parse(path, e))?;
            let Some(id) = record.get(PREFIX_COLUMNS - 1) else {
                return Err(LaaError::parse(path, "row without a record identifier"));
            };
            let fields = record
                .iter()
                .skip(PREFIX_COLUMNS)
                .map(|f| f.trim().to_string())
                .collect();
            rows.insert(id.trim().to_string(), fields);
        }
        debug!("read {} summary rows from {}", rows.len(), path.display());
        Ok(SummaryTable {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Look up and coerce the row for `id`. Returns `Ok(None)` for an unknown
    /// identifier and an error if a field cannot be coerced.
    pub fn get(&self, id: &str) -> Result<Option<SummaryRow>, LaaError> {
        let Some(fields) = self.rows.get(id) else {
            return Ok(None);
        };
        let c = &self.columns;
        let field = |name: &'static str, i: usize| Field {
            path: &self.path,
            id,
            name,
            value: fields.get(i).map(String::as_str),
        };
        Ok(Some(SummaryRow {
            cluster: field(CLUSTER, c.cluster).number()?,
            phase: field(PHASE, c.phase).number()?,
            coverage: field(COVERAGE, c.coverage).number()?,
            accuracy: field(ACCURACY, c.accuracy).number()?,
            converged: field(CONVERGED, c.converged).flag()?,
            chimera: field(CHIMERA, c.chimera).flag()?,
        }))
    }
}

/// One field of a summary row, with enough context for an error message.
struct Field<'a> {
    path: &'a Path,
    id: &'a str,
    name: &'static str,
    value: Option<&'a str>,
}

impl Field<'_> {
    fn error(&self, message: String) -> LaaError {
        LaaError::parse(
            self.path,
            format!("record '{}' in '{}' column: {message}", self.id, self.name),
        )
    }

    fn value(&self) -> Result<&str, LaaError> {
        self.value
            .ok_or_else(|| self.error("field is missing".to_string()))
    }

    fn number<T: FromStr>(&self) -> Result<T, LaaError> {
        let v = self.value()?;
        v.parse::<T>()
            .map_err(|_| self.error(format!("expected a number but received '{v}'")))
    }

    /// Integer flags are true when non-zero; `true`/`false` are accepted as well.
    fn flag(&self) -> Result<bool, LaaError> {
        let v = self.value()?;
        if let Ok(n) = v.parse::<i64>() {
            return Ok(n != 0);
        }
        match v.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error(format!("expected a flag but received '{v}'"))),
        }
    }
}
