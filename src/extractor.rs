mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

pub use ytdlp::Ytdlp;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MediaInfo {
  pub title: Option<String>,
  pub extractor: Option<String>,
  pub thumbnail: Option<String>,
  #[serde(default)]
  pub formats: Vec<RawFormat>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawFormat {
  pub format_id: String,
  pub resolution: Option<String>,
  pub ext: Option<String>,
  pub url: Option<String>,
  pub vcodec: Option<String>,
  pub filesize: Option<f64>,
}

impl RawFormat {
  pub fn is_audio_only(&self) -> bool {
    self.vcodec.as_deref() == Some("none")
  }
}

#[async_trait]
pub trait Extractor: Send + Sync {
  async fn probe(&self, url: &str) -> Result<MediaInfo>;

  // returns the path of the file actually written into `staging_dir`
  async fn download(
    &self,
    url: &str,
    format_id: &str,
    staging_dir: &Path,
  ) -> Result<PathBuf>;
}
