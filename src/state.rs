use std::{path::PathBuf, sync::Arc};

use crate::{
  config::Config,
  extractor::{Extractor, Ytdlp},
  store::OutputStore,
  transcoder::{Ffmpeg, Transcoder},
  Result,
};

#[derive(Clone)]
pub struct AppState {
  pub store: OutputStore,
  pub staging_dir: PathBuf,
  pub extractor: Arc<dyn Extractor>,
  pub transcoder: Arc<dyn Transcoder>,
}

impl AppState {
  pub fn from_config(config: &Config) -> Result<Self> {
    let store = OutputStore::open(&config.output_dir)?;
    std::fs::create_dir_all(&config.staging_dir)?;

    Ok(Self {
      store,
      staging_dir: config.staging_dir.clone(),
      extractor: Arc::new(Ytdlp::new(config.clone())),
      transcoder: Arc::new(Ffmpeg::new(&config.ffmpeg_path)),
    })
  }
}
