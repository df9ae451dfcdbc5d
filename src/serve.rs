use axum::{
  body::StreamBody,
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use tokio::fs::File;

use crate::{state::AppState, util::OneShotFile, Error, Result};

pub async fn converted_video(
  State(state): State<AppState>,
  Path(file_name): Path<String>,
) -> Result<Response> {
  // whoever claims the file first serves it, everyone else sees a 404
  let claim = state
    .store
    .claim(&file_name)
    .await
    .ok_or(Error::NotFound)?;

  let file = File::open(claim.path()).await?;
  let len = file.metadata().await?.len();

  let headers = [
    (header::CONTENT_TYPE, "video/mp4".to_string()),
    (header::CONTENT_LENGTH, len.to_string()),
    (
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"{file_name}\""),
    ),
  ];
  let body = StreamBody::new(OneShotFile::new(file, claim));

  Ok((headers, body).into_response())
}
