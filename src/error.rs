use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  MissingParameter(&'static str),
  #[error("File not found")]
  NotFound,
  #[error("{0}")]
  Extraction(String),
  #[error("{0}")]
  Transcode(String),
  #[error("invalid configuration: {0}")]
  Config(String),
  #[error(transparent)]
  IO(#[from] std::io::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::MissingParameter(_) => StatusCode::BAD_REQUEST,
      Error::NotFound => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("request failed: {}", self);
    }

    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
