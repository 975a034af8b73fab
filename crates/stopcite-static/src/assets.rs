//! Inlined stylesheet/script and copied static files.

use std::fs;
use std::path::Path;

/// Static files copied to the output root when present.
pub const STATIC_ASSETS: [&str; 3] = ["favicon.svg", "social.png", "robots.txt"];

/// Text assets inlined into every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAssets {
    /// Stylesheet text
    pub stylesheet: String,
    /// Script text
    pub script: String,
}

/// Errors that can occur while handling assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read asset {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to copy {name} to {dest}: {message}")]
    Copy {
        name: String,
        dest: String,
        message: String,
    },
}

impl InlineAssets {
    /// Read the stylesheet and script. Both are required.
    pub fn load(stylesheet: &Path, script: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            stylesheet: read_text(stylesheet)?,
            script: read_text(script)?,
        })
    }
}

fn read_text(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|e| AssetError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Copy each named file from `root` into `output_dir`, skipping absent ones.
///
/// Returns the names that were copied.
pub fn copy_static_assets<S: AsRef<str>>(
    root: &Path,
    output_dir: &Path,
    names: &[S],
) -> Result<Vec<String>, AssetError> {
    let mut copied = Vec::new();

    for name in names {
        let name = name.as_ref();
        let source = root.join(name);

        if !source.is_file() {
            tracing::debug!("Skipping missing asset {}", name);
            continue;
        }

        let dest = output_dir.join(name);
        fs::copy(&source, &dest).map_err(|e| AssetError::Copy {
            name: name.to_string(),
            dest: dest.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Copied {}", name);
        copied.push(name.to_string());
    }

    Ok(copied)
}
