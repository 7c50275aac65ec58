//! Path management for songbook
//!
//! Public files are served from a single root; uploaded images live in its
//! `images` subdirectory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Filesystem locations used by the server
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root of the statically served tree
    public_dir: PathBuf,
    /// Upload target, `<public_dir>/images`
    images_dir: PathBuf,
}

impl Paths {
    /// Resolve paths under `public_dir` and create missing directories
    pub fn init(public_dir: impl Into<PathBuf>) -> Result<Self> {
        let public_dir = public_dir.into();
        let images_dir = public_dir.join("images");

        let paths = Self {
            public_dir,
            images_dir,
        };
        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.images_dir).with_context(|| {
            format!(
                "Failed to create image directory {}",
                self.images_dir.display()
            )
        })
    }

    /// Get the public directory
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Get the uploaded images directory
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::init(temp_dir.path().join("public")).unwrap();

        assert!(paths.images_dir().exists());
        assert_eq!(paths.public_dir(), temp_dir.path().join("public"));
        assert_eq!(paths.images_dir(), temp_dir.path().join("public").join("images"));
    }
}
