//! Locating and running the laa executable.

use crate::config::LaaConfig;
use crate::errors::LaaError;
use crate::options::{LaaOptions, BARCODE_FLAG};
use itertools::Itertools;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Find `exe` in `search_path`. An `exe` with a directory component is
/// returned as is if it points at an executable file.
pub fn which(exe: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    let exe_path = Path::new(exe);
    if exe_path.parent().is_some_and(|p| !p.as_os_str().is_empty()) && is_executable(exe_path) {
        return Some(exe_path.to_path_buf());
    }
    search_path
        .iter()
        .map(|dir| dir.join(exe))
        .find(|candidate| is_executable(candidate))
}

/// Resolve the configured executable or fail with `ToolNotFound`.
pub fn locate(config: &LaaConfig) -> Result<PathBuf, LaaError> {
    which(&config.executable, &config.search_path).ok_or_else(|| LaaError::ToolNotFound {
        exe: config.executable.clone(),
        search_path: config.search_path.clone(),
    })
}

/// The argument list for one laa invocation:
/// `--doBc <barcode> [options...] <dataset>`.
pub fn laa_args(barcode: &str, options: &LaaOptions, dataset: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![BARCODE_FLAG.into(), barcode.into()];
    args.extend(options.tokens().iter().map(OsString::from));
    args.push(dataset.as_os_str().to_os_string());
    args
}

/// Run laa for one barcode with `workdir` as its working directory, blocking
/// until it exits. There is no timeout: a hung laa hangs the caller.
pub fn run_laa(
    exe: &Path,
    barcode: &str,
    options: &LaaOptions,
    dataset: &Path,
    workdir: &Path,
) -> Result<(), LaaError> {
    let args = laa_args(barcode, options, dataset);
    let command = std::iter::once(exe.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| a.to_string_lossy())
        .join(" ");
    info!("running `{command}` in '{}'", workdir.display());

    let output = Command::new(exe)
        .args(&args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| LaaError::Launch {
            command: command.clone(),
            source,
        })?;

    if !output.stdout.is_empty() {
        debug!("laa stdout:\n{}", String::from_utf8_lossy(&output.stdout));
    }
    if !output.status.success() {
        return Err(LaaError::ExternalProcess {
            command,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
