use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::{state::AppState, store::OutputStore, Error, Result};

#[derive(Deserialize)]
pub struct ConvertReq {
  url: Option<String>,
  format_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResp {
  pub success: bool,
  pub message: &'static str,
  pub download_url: String,
}

pub async fn convert(
  State(state): State<AppState>,
  req: Option<Json<ConvertReq>>,
) -> Result<Json<ConvertResp>> {
  let (url, format_id) = req
    .and_then(|Json(req)| {
      let url = req.url.filter(|s| !s.is_empty())?;
      let format_id = req.format_id.filter(|s| !s.is_empty())?;
      Some((url, format_id))
    })
    .ok_or(Error::MissingParameter("URL and format_id are required"))?;

  let job = ConversionJob::new(&state, url, format_id)?;
  let file_name = job.run(&state).await?;

  Ok(Json(ConvertResp {
    success: true,
    message: "Conversion successful",
    download_url: OutputStore::download_url(&file_name),
  }))
}

// The downloaded input lives in a staging directory of its own, removed
// whenever the job is dropped. The output is removed too unless the job
// finished, including when the request is cancelled mid-transcode.
struct ConversionJob {
  source_url: String,
  format_id: String,
  staging: TempDir,
  file_name: String,
  output: PendingOutput,
}

impl ConversionJob {
  fn new(
    state: &AppState,
    source_url: String,
    format_id: String,
  ) -> Result<Self> {
    let staging = tempfile::Builder::new()
      .prefix("job-")
      .tempdir_in(&state.staging_dir)?;
    let (file_name, output_path) = state.store.allocate();

    Ok(Self {
      source_url,
      format_id,
      staging,
      file_name,
      output: PendingOutput {
        path: output_path,
        done: false,
      },
    })
  }

  async fn run(mut self, state: &AppState) -> Result<String> {
    info!(
      "converting {} (format {}) into {}",
      self.source_url, self.format_id, self.file_name
    );

    let input = state
      .extractor
      .download(&self.source_url, &self.format_id, self.staging.path())
      .await?;

    state.transcoder.remux(&input, &self.output.path).await?;
    self.output.done = true;

    let staging_path = self.staging.path().to_owned();
    if let Err(e) = self.staging.close() {
      warn!("failed to clean up {}: {}", staging_path.display(), e);
    }

    info!("converted {}", self.file_name);
    Ok(self.file_name)
  }
}

struct PendingOutput {
  path: PathBuf,
  done: bool,
}

impl Drop for PendingOutput {
  fn drop(&mut self) {
    if self.done {
      return;
    }

    // never leave a half-written file behind for a failed request
    if let Err(e) = std::fs::remove_file(&self.path) {
      if e.kind() != std::io::ErrorKind::NotFound {
        warn!("failed to remove {}: {}", self.path.display(), e);
      }
    }
  }
}
