use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXECUTABLE: &str = "laa";

/// Where and under which name to look for the laa executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaaConfig {
    /// Executable name, or a path to the executable.
    pub executable: String,
    /// Directories searched in order for `executable`.
    pub search_path: Vec<PathBuf>,
}

impl Default for LaaConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl LaaConfig {
    /// Search for `laa` on the directories of `PATH`.
    pub fn from_env() -> Self {
        LaaConfig {
            executable: DEFAULT_EXECUTABLE.to_string(),
            search_path: search_path_from_env(),
        }
    }

    /// Search only the given directories.
    pub fn with_search_path(search_path: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        LaaConfig {
            executable: DEFAULT_EXECUTABLE.to_string(),
            search_path: search_path.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a TOML configuration file. Missing keys take their default values.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
        toml::from_str(&s).with_context(|| path.display().to_string())
    }

    /// Read `path` if given and present, otherwise fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_toml_file(path),
            Some(path) => {
                warn!(
                    "could not find laa configuration at {}, falling back to defaults",
                    path.display()
                );
                Ok(Self::from_env())
            }
            None => Ok(Self::from_env()),
        }
    }
}

fn search_path_from_env() -> Vec<PathBuf> {
    let Some(path) = std::env::var_os("PATH") else {
        return Vec::new();
    };
    std::env::split_paths(&path)
        .map(|dir| match dir.to_str() {
            Some(s) => PathBuf::from(s.trim_matches('"')),
            None => dir,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_from_toml_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("laa.toml");
        let mut f = std::fs::File::create(&path)?;
        writeln!(f, "executable = \"laa-3.1\"")?;
        writeln!(f, "search_path = [\"/opt/smrtlink/bin\", \"/usr/local/bin\"]")?;
        drop(f);

        let cfg = LaaConfig::from_toml_file(&path)?;
        assert_eq!(
            cfg,
            LaaConfig {
                executable: "laa-3.1".to_string(),
                search_path: vec!["/opt/smrtlink/bin".into(), "/usr/local/bin".into()],
            }
        );
        Ok(())
    }

    #[test]
    fn test_partial_toml_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("laa.toml");
        std::fs::write(&path, "search_path = [\"/opt/bin\"]\n")?;
        let cfg = LaaConfig::from_toml_file(&path)?;
        assert_eq!(cfg.executable, DEFAULT_EXECUTABLE);
        assert_eq!(cfg.search_path, vec![PathBuf::from("/opt/bin")]);
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("laa.toml");
        std::fs::write(&path, "exe = \"laa\"\n")?;
        assert!(LaaConfig::from_toml_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_load_missing_file_falls_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = LaaConfig::load(Some(&dir.path().join("absent.toml")))?;
        assert_eq!(cfg.executable, DEFAULT_EXECUTABLE);
        Ok(())
    }
}
