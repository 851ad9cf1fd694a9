//! Resolution of the server home directory, where relative paths such as the
//! SQLite file and log files are anchored.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory")]
    PlatformHomeUnknown,
    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error("failed to create home directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn platform_home() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::PlatformHomeUnknown)
}

/// Expand a leading `~` and anchor relative paths at the current directory.
fn absolutize(raw: &str) -> Result<PathBuf, HomeDirError> {
    let expanded = if raw == "~" {
        platform_home()?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        platform_home()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        let cwd = env::current_dir().map_err(HomeDirError::CurrentDir)?;
        Ok(cwd.join(expanded))
    }
}

/// Resolve the home directory.
///
/// `configured` wins when present; otherwise `<platform home>/<default_subdir>`
/// is used. With `create` set the directory is created if it is missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        Some(raw) => absolutize(raw.trim())?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_path_buf(),
        source,
    })
}
