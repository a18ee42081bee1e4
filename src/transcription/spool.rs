use std::{
    io,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use super::AudioClip;

/// Writes uploaded audio under a fixed directory before it is transcribed.
#[derive(Debug, Clone)]
pub struct UploadSpool {
    dir: PathBuf,
}

impl UploadSpool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores the clip as `<dir>/<uuid>-<basename>` and returns the path.
    pub async fn persist(&self, clip: &AudioClip) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self
            .dir
            .join(format!("{}-{}", Uuid::new_v4(), safe_basename(&clip.file_name)));
        tokio::fs::write(&path, &clip.bytes).await?;
        Ok(path)
    }

    /// Removes a spooled file once it is no longer needed.
    pub async fn discard(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

// Only the final component of a client-supplied name is kept.
fn safe_basename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}
