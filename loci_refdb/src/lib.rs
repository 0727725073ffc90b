//! Index of per-locus reference FASTA files and their suffix arrays.

use anyhow::{ensure, Context, Result};
use log::warn;
use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

/// Recognised FASTA suffixes, in order of preference.
pub const FASTA_SUFFIXES: [&str; 3] = ["fa", "fna", "fasta"];

/// Suffix appended to a FASTA path to locate its suffix array.
pub const SUFFIX_ARRAY_EXT: &str = ".sa";

/// A reference sequence file and its optional precomputed suffix array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub fasta: PathBuf,
    pub suffix_array: Option<PathBuf>,
}

impl Reference {
    fn from_fasta(fasta: PathBuf) -> Self {
        let mut sa = fasta.clone().into_os_string();
        sa.push(SUFFIX_ARRAY_EXT);
        let sa = PathBuf::from(sa);
        let suffix_array = if sa.exists() {
            Some(sa)
        } else {
            warn!("missing suffix array for : '{}'", fasta.display());
            None
        };
        Reference {
            fasta,
            suffix_array,
        }
    }
}

/// References found in a directory, keyed by locus name.
#[derive(Debug, Clone, Default)]
pub struct RefDb {
    refs: BTreeMap<String, Reference>,
}

impl RefDb {
    /// Scan `dir` for FASTA files. The locus of each file is its file stem.
    pub fn open(dir: &Path) -> Result<RefDb> {
        ensure!(dir.is_dir(), "{} is not a directory", dir.display());
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());

        let mut refs = BTreeMap::new();
        for suffix in FASTA_SUFFIXES {
            let pattern = format!("{escaped}/*.{suffix}");
            let mut fastas: Vec<PathBuf> = glob::glob(&pattern)
                .with_context(|| pattern.clone())?
                .collect::<Result<_, _>>()
                .with_context(|| dir.display().to_string())?;
            fastas.sort();
            for fasta in fastas {
                let Some(locus) = fasta.file_stem().map(|s| s.to_string_lossy().into_owned())
                else {
                    continue;
                };
                match refs.entry(locus) {
                    btree_map::Entry::Vacant(e) => {
                        e.insert(Reference::from_fasta(fasta));
                    }
                    btree_map::Entry::Occupied(e) => warn!(
                        "ignoring '{}', locus {} is already provided by '{}'",
                        fasta.display(),
                        e.key(),
                        e.get().fasta.display()
                    ),
                }
            }
        }
        Ok(RefDb { refs })
    }

    /// Locus names in sorted order.
    pub fn loci(&self) -> impl Iterator<Item = &str> {
        self.refs.keys().map(String::as_str)
    }

    pub fn get(&self, locus: &str) -> Option<&Reference> {
        self.refs.get(locus)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Reference> {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<'a> IntoIterator for &'a RefDb {
    type Item = (&'a String, &'a Reference);
    type IntoIter = btree_map::Iter<'a, String, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, ">seq\nACGT\n").unwrap();
        path
    }

    #[test]
    fn test_open() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let p = dir.path();
        let hla_a = touch(p, "HLA-A.fasta");
        touch(p, "HLA-A.fasta.sa");
        let hla_b = touch(p, "HLA-B.fa");
        let drb1 = touch(p, "DRB1.fna");
        touch(p, "notes.txt");
        std::fs::create_dir(p.join("nested"))?;
        touch(&p.join("nested"), "HLA-C.fa");

        let db = RefDb::open(p)?;
        assert_eq!(db.loci().collect::<Vec<_>>(), ["DRB1", "HLA-A", "HLA-B"]);
        assert_eq!(
            db.get("HLA-A"),
            Some(&Reference {
                fasta: hla_a.clone(),
                suffix_array: Some(p.join("HLA-A.fasta.sa")),
            })
        );
        assert_eq!(db.get("HLA-B").unwrap().fasta, hla_b);
        assert_eq!(db.get("HLA-B").unwrap().suffix_array, None);
        assert_eq!(db.get("DRB1").unwrap().fasta, drb1);
        assert!(db.get("HLA-C").is_none());
        assert_eq!(db.iter().count(), 3);
        Ok(())
    }

    #[test]
    fn test_duplicate_locus_prefers_fa() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fa = touch(dir.path(), "KIR.fa");
        touch(dir.path(), "KIR.fasta");
        let db = RefDb::open(dir.path())?;
        assert_eq!(db.len(), 1);
        assert_eq!(db.get("KIR").unwrap().fasta, fa);
        Ok(())
    }

    #[test]
    fn test_empty_and_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(RefDb::open(dir.path())?.is_empty());
        assert!(RefDb::open(&dir.path().join("absent")).is_err());
        Ok(())
    }
}
