use std::{
  io,
  path::{Component, Path, PathBuf},
};

use tracing::{info, warn};

use crate::util::unique_id;

pub const DOWNLOAD_ROUTE_PREFIX: &str = "/converted_videos";

// converted files waiting to be fetched once
#[derive(Debug, Clone)]
pub struct OutputStore {
  dir: PathBuf,
}

impl OutputStore {
  pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
    std::fs::create_dir_all(&dir)?;
    let dir = dir.as_ref().canonicalize()?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn allocate(&self) -> (String, PathBuf) {
    let file_name = format!("{}.mp4", unique_id());
    let path = self.dir.join(&file_name);
    (file_name, path)
  }

  // None if the name is not a plain file name, does not exist, or escapes
  // the store through a link.
  pub async fn resolve(&self, file_name: &str) -> Option<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
      (Some(Component::Normal(name)), None)
        if name == file_name && !file_name.starts_with('.') => {}
      _ => return None,
    }

    let path = tokio::fs::canonicalize(self.dir.join(file_name)).await.ok()?;
    if !path.starts_with(&self.dir) {
      return None;
    }

    let metadata = tokio::fs::metadata(&path).await.ok()?;
    metadata.is_file().then_some(path)
  }

  // Take exclusive hold of a file by moving it to a hidden per-request name.
  // Of several concurrent claims on the same file only one succeeds.
  pub async fn claim(&self, file_name: &str) -> Option<Claim> {
    let original = self.resolve(file_name).await?;
    let claimed = self
      .dir
      .join(format!(".{file_name}.{}.serving", unique_id()));

    match tokio::fs::rename(&original, &claimed).await {
      Ok(()) => Some(Claim {
        original,
        claimed,
        served: false,
      }),
      Err(e) => {
        if e.kind() != io::ErrorKind::NotFound {
          warn!("failed to claim {}: {}", original.display(), e);
        }
        None
      }
    }
  }

  pub fn download_url(file_name: &str) -> String {
    format!("{DOWNLOAD_ROUTE_PREFIX}/{file_name}")
  }
}

// A claimed file is deleted on drop once served, otherwise it is put back
// under its original name.
pub struct Claim {
  original: PathBuf,
  claimed: PathBuf,
  served: bool,
}

impl Claim {
  pub fn path(&self) -> &Path {
    &self.claimed
  }

  pub fn mark_served(&mut self) {
    self.served = true;
  }
}

impl Drop for Claim {
  fn drop(&mut self) {
    if !self.served {
      warn!("transfer of {} aborted, keeping file", self.original.display());
      if let Err(e) = std::fs::rename(&self.claimed, &self.original) {
        warn!("failed to restore {}: {}", self.original.display(), e);
      }
      return;
    }

    if let Err(e) = std::fs::remove_file(&self.claimed) {
      let name = self.original.display();
      warn!("failed to delete served file {}: {}", name, e);
    } else {
      info!("deleted served file: {}", self.original.display());
    }
  }
}
