use crate::errors::LaaError;
use itertools::Itertools;

/// Barcode selection flag, always supplied by the session.
pub const BARCODE_FLAG: &str = "--doBc";

/// Options which select the barcode or redirect laa's outputs. The session
/// relies on both, so they may not be passed through by the caller.
pub const RESERVED_OPTIONS: [&str; 4] = [
    BARCODE_FLAG,
    "--resultFile",
    "--reportsFile",
    "--subreadsReportPrefix",
];

/// Validated pass-through options for laa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaaOptions {
    tokens: Vec<String>,
}

impl LaaOptions {
    /// Split a whitespace-delimited option string and reject any reserved option.
    pub fn parse(options: &str) -> Result<Self, LaaError> {
        let tokens: Vec<String> = options.split_whitespace().map(String::from).collect();
        let reserved: Vec<String> = tokens
            .iter()
            .filter(|t| RESERVED_OPTIONS.contains(&t.as_str()))
            .unique()
            .cloned()
            .collect();
        if !reserved.is_empty() {
            return Err(LaaError::ReservedOptions { options: reserved });
        }
        Ok(LaaOptions { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
