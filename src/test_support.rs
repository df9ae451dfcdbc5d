use std::{
  path::{Path, PathBuf},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
};

use async_trait::async_trait;
use axum::{
  body::{Body, Bytes},
  http::{header, Request, StatusCode},
  response::Response,
  Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
  extractor::{Extractor, MediaInfo},
  state::AppState,
  store::OutputStore,
  transcoder::Transcoder,
  Error, Result,
};

#[derive(Default)]
pub struct StubExtractor {
  pub info: MediaInfo,
  pub error: Option<String>,
  pub payload: Vec<u8>,
  pub calls: AtomicUsize,
  pub downloads: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl Extractor for StubExtractor {
  async fn probe(&self, _url: &str) -> Result<MediaInfo> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    match &self.error {
      Some(e) => Err(Error::Extraction(e.clone())),
      None => Ok(self.info.clone()),
    }
  }

  async fn download(
    &self,
    _url: &str,
    _format_id: &str,
    staging_dir: &Path,
  ) -> Result<PathBuf> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = &self.error {
      return Err(Error::Extraction(e.clone()));
    }

    let path = staging_dir.join("source.webm");
    tokio::fs::write(&path, &self.payload).await?;
    self.downloads.lock().unwrap().push(path.clone());
    Ok(path)
  }
}

// copies the input to the output; on `error` or `hang` it writes a partial
// output first, then fails or never finishes
#[derive(Default)]
pub struct StubTranscoder {
  pub error: Option<String>,
  pub hang: bool,
  pub calls: AtomicUsize,
}

#[async_trait]
impl Transcoder for StubTranscoder {
  async fn remux(&self, input: &Path, output: &Path) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.hang {
      tokio::fs::write(output, b"partial").await?;
      std::future::pending::<()>().await;
    }

    match &self.error {
      Some(e) => {
        tokio::fs::write(output, b"partial").await?;
        Err(Error::Transcode(e.clone()))
      }
      None => {
        tokio::fs::copy(input, output).await?;
        Ok(())
      }
    }
  }
}

pub struct TestApp {
  pub router: Router,
  pub state: AppState,
  pub extractor: Arc<StubExtractor>,
  pub transcoder: Arc<StubTranscoder>,
  _root: TempDir,
}

impl TestApp {
  pub fn new(extractor: StubExtractor, transcoder: StubTranscoder) -> Self {
    let root = tempfile::tempdir().unwrap();
    let staging_dir = root.path().join("staging");
    std::fs::create_dir_all(&staging_dir).unwrap();

    let extractor = Arc::new(extractor);
    let transcoder = Arc::new(transcoder);
    let state = AppState {
      store: OutputStore::open(root.path().join("converted_videos")).unwrap(),
      staging_dir,
      extractor: extractor.clone(),
      transcoder: transcoder.clone(),
    };

    Self {
      router: crate::router(state.clone()),
      state,
      extractor,
      transcoder,
      _root: root,
    }
  }

  pub fn staging_dir(&self) -> &Path {
    &self.state.staging_dir
  }
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
  Request::post(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
  Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn request(router: &Router, req: Request<Body>) -> Response {
  router.clone().oneshot(req).await.unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
  let res = request(router, req).await;
  let status = res.status();
  let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
  (status, bytes)
}
