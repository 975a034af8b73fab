//! Output layout and atomic publishing of the built site.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Path of a language's page inside `output_dir`.
///
/// The default language lives at the root, every other one in its own
/// directory.
pub fn page_path(output_dir: &Path, lang: &str, default_lang: &str) -> PathBuf {
    if lang == default_lang {
        output_dir.join("index.html")
    } else {
        output_dir.join(lang).join("index.html")
    }
}

/// Absolute, symlink-free form of `path`.
///
/// Components that do not exist yet are appended unchanged to the
/// canonicalized part that does.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = path.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Errors that can occur while writing output.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Refusing to overwrite {0}: two languages map to the same page")]
    Collision(String),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to publish {path}: {message}")]
    Publish { path: String, message: String },
}

/// Write a rendered page, creating its directory.
///
/// Returns the written path. Fails instead of replacing a page written
/// earlier in the same build.
pub fn write_page(
    output_dir: &Path,
    lang: &str,
    default_lang: &str,
    html: &str,
) -> Result<PathBuf, OutputError> {
    let path = page_path(output_dir, lang, default_lang);

    if path.exists() {
        return Err(OutputError::Collision(path.display().to_string()));
    }

    let write_error = |e: io::Error| OutputError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(&path, html).map_err(write_error)?;

    Ok(path)
}

/// A hidden directory next to the output directory that the build writes
/// into. Dropping it without [`StagingDir::publish`] discards the build.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    target: PathBuf,
}

impl StagingDir {
    /// Create a staging directory for `target`.
    pub fn create(target: &Path) -> Result<Self, OutputError> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let publish_error = |e: io::Error| OutputError::Publish {
            path: target.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&parent).map_err(publish_error)?;
        let dir = tempfile::Builder::new()
            .prefix(".stopcite-")
            .tempdir_in(&parent)
            .map_err(publish_error)?;

        tracing::debug!("Staging build in {}", dir.path().display());

        Ok(Self {
            dir,
            target: target.to_path_buf(),
        })
    }

    /// Directory to write the site into.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the target with the staged build.
    pub fn publish(self) -> Result<PathBuf, OutputError> {
        let publish_error = |e: io::Error| OutputError::Publish {
            path: self.target.display().to_string(),
            message: e.to_string(),
        };

        match fs::symlink_metadata(&self.target) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&self.target).map_err(publish_error)?,
            Ok(_) => fs::remove_file(&self.target).map_err(publish_error)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(publish_error(e)),
        }

        fs::rename(self.dir.path(), &self.target).map_err(publish_error)?;
        make_readable(&self.target).map_err(publish_error)?;

        // The TempDir no longer exists at its path; dropping it is a no-op.
        Ok(self.target.clone())
    }
}

#[cfg(unix)]
fn make_readable(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_readable(_dir: &Path) -> io::Result<()> {
    Ok(())
}
