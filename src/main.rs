use std::net::SocketAddr;

use axum::{
  response::IntoResponse,
  routing::{get, post},
  Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod convert;
mod error;
mod extractor;
mod formats;
mod serve;
mod state;
mod store;
mod transcoder;
mod util;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

use config::Config;
use state::AppState;
use store::DOWNLOAD_ROUTE_PREFIX;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env()?;
  let state = AppState::from_config(&config)?;

  info!("serving converted files from {}", state.store.dir().display());
  info!("staging downloads under {}", config.staging_dir.display());
  if let Some(proxy) = config.redacted_proxy() {
    info!("using proxy: {}", proxy);
  }

  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  info!("listening on {}", addr);

  axum::Server::bind(&addr)
    .serve(router(state).into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

  Ok(())
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/get-formats", post(formats::get_formats))
    .route("/convert", post(convert::convert))
    .route(
      &format!("{DOWNLOAD_ROUTE_PREFIX}/:file_name"),
      get(serve::converted_video),
    )
    .with_state(state)
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("shutting down"),
    // without a signal handler, run until killed
    Err(_) => std::future::pending().await,
  }
}

#[cfg(test)]
mod test {
  use axum::http::StatusCode;

  use crate::test_support::{get, send, TestApp};

  #[tokio::test]
  async fn test_health() {
    let app = TestApp::new(Default::default(), Default::default());
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
  }

  #[tokio::test]
  async fn test_unknown_route() {
    let app = TestApp::new(Default::default(), Default::default());
    let (status, _) = send(&app.router, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
