use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
  extractor::{MediaInfo, RawFormat},
  state::AppState,
  util::{capitalize, human_size},
  Error, Result,
};

const HLS_MARKER: &str = ".m3u8";

#[derive(Deserialize)]
pub struct GetFormatsReq {
  url: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FormatDescriptor {
  pub format_id: String,
  pub resolution: String,
  pub ext: String,
  pub url: String,
  pub filesize: String,
}

#[derive(Debug, Serialize)]
pub struct FormatList {
  pub formats: Vec<FormatDescriptor>,
  pub title: String,
  pub platform: String,
  pub thumbnail: String,
}

pub async fn get_formats(
  State(state): State<AppState>,
  req: Option<Json<GetFormatsReq>>,
) -> Result<Json<FormatList>> {
  let url = req
    .and_then(|Json(req)| req.url)
    .filter(|url| !url.is_empty())
    .ok_or(Error::MissingParameter("URL is required"))?;

  let info = state.extractor.probe(&url).await?;
  Ok(Json(info.into()))
}

impl From<MediaInfo> for FormatList {
  fn from(info: MediaInfo) -> Self {
    Self {
      formats: info.formats.into_iter().map(Into::into).collect(),
      title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
      platform: info
        .extractor
        .as_deref()
        .map(capitalize)
        .unwrap_or_else(|| "Unknown Platform".to_string()),
      thumbnail: info.thumbnail.unwrap_or_default(),
    }
  }
}

impl From<RawFormat> for FormatDescriptor {
  fn from(f: RawFormat) -> Self {
    let ext = infer_ext(&f);

    Self {
      resolution: f.resolution.unwrap_or_else(|| "unknown".to_string()),
      filesize: f
        .filesize
        .map(|bytes| human_size(bytes as u64))
        .unwrap_or_default(),
      url: f.url.unwrap_or_default(),
      format_id: f.format_id,
      ext,
    }
  }
}

fn infer_ext(f: &RawFormat) -> String {
  if f.url.as_deref().is_some_and(|url| url.contains(HLS_MARKER)) {
    return "m3u8".to_string();
  }

  let fallback = if f.is_audio_only() { "audio" } else { "unknown" };
  f.ext.clone().unwrap_or_else(|| fallback.to_string())
}
