use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::command::{failure_message, run};
use crate::config::Config;
use crate::{Error, Result};

use super::{Extractor, MediaInfo};

// run yt-dlp command line to probe and fetch media.
// requires yt-dlp executable to be in PATH (or YTDLP_PATH).
pub struct Ytdlp {
  config: Config,
}

impl Ytdlp {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  fn command(&self, url: &str) -> Command {
    let mut cmd = Command::new(&self.config.ytdlp_path);
    cmd.arg("--no-playlist");

    if let Some(proxy) = &self.config.ytdlp_proxy {
      cmd.arg("--proxy").arg(proxy);
    }

    if let Some(cookies) = self.config.cookies_for(url) {
      info!("using cookie file {} for {}", cookies.display(), url);
      cmd.arg("--cookies").arg(cookies);
    }

    cmd
  }

  async fn run_checked(&self, cmd: &mut Command) -> Result<Vec<u8>> {
    let output = run(cmd).await?;
    if !output.status.success() {
      let message = failure_message(&self.config.ytdlp_path, &output);
      return Err(Error::Extraction(message));
    }

    Ok(output.stdout)
  }
}

#[async_trait]
impl Extractor for Ytdlp {
  async fn probe(&self, url: &str) -> Result<MediaInfo> {
    let mut cmd = self.command(url);
    cmd
      // emit the output as a single json object instead of jsonl
      .arg("--dump-single-json")
      .arg("--no-warnings")
      .arg("--")
      .arg(url);

    let stdout = self.run_checked(&mut cmd).await?;
    Ok(serde_json::from_slice(&stdout)?)
  }

  async fn download(
    &self,
    url: &str,
    format_id: &str,
    staging_dir: &Path,
  ) -> Result<PathBuf> {
    let template = staging_dir.join("source.%(ext)s");

    let mut cmd = self.command(url);
    cmd
      .arg("-f")
      .arg(format_id)
      .arg("-o")
      .arg(&template)
      .arg("--no-progress")
      .arg("--no-mtime")
      // --print implies --simulate
      .arg("--no-simulate")
      .arg("--print")
      .arg("after_move:filepath")
      .arg("--")
      .arg(url);

    let stdout = self.run_checked(&mut cmd).await?;
    let path = downloaded_path(&stdout).ok_or_else(|| {
      Error::Extraction(format!("yt-dlp did not report a file for {url}"))
    })?;

    let is_file = tokio::fs::metadata(&path)
      .await
      .is_ok_and(|m| m.is_file());
    if !is_file {
      return Err(Error::Extraction(format!(
        "downloaded file is missing: {}",
        path.display()
      )));
    }

    Ok(path)
  }
}

fn downloaded_path(stdout: &[u8]) -> Option<PathBuf> {
  String::from_utf8_lossy(stdout)
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .last()
    .map(PathBuf::from)
}

#[cfg(test)]
mod test {
  use super::*;

  const PROBE_JSON: &str = r#"{
    "title": "Big Buck Bunny",
    "extractor": "youtube",
    "thumbnail": "https://i.ytimg.com/vi/aqz-KE-bpKQ/maxresdefault.jpg",
    "formats": [
      {
        "format_id": "140",
        "ext": "m4a",
        "vcodec": "none",
        "resolution": "audio only",
        "filesize": 5242880,
        "url": "https://rr1.googlevideo.com/videoplayback?itag=140"
      },
      {
        "format_id": "hls-1080p",
        "ext": "mp4",
        "vcodec": "avc1.640028",
        "resolution": "1920x1080",
        "filesize": null,
        "url": "https://manifest.googlevideo.com/api/manifest/hls_playlist/index.m3u8"
      }
    ]
  }"#;

  #[test]
  fn test_parse_probe_output() {
    let info: MediaInfo = serde_json::from_str(PROBE_JSON).unwrap();

    assert_eq!(info.title.as_deref(), Some("Big Buck Bunny"));
    assert_eq!(info.extractor.as_deref(), Some("youtube"));
    assert_eq!(info.formats.len(), 2);
    assert!(info.formats[0].is_audio_only());
    assert_eq!(info.formats[0].filesize, Some(5242880.0));
    assert!(!info.formats[1].is_audio_only());
    assert_eq!(info.formats[1].filesize, None);
  }

  #[test]
  fn test_parse_probe_output_without_formats() {
    let info: MediaInfo = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
    assert!(info.title.is_none());
    assert!(info.formats.is_empty());
  }

  #[test]
  fn test_downloaded_path() {
    assert_eq!(
      downloaded_path(b"/tmp/job-1/source.webm\n"),
      Some(PathBuf::from("/tmp/job-1/source.webm"))
    );
    assert_eq!(downloaded_path(b"\n  \n"), None);
  }

  #[test]
  fn test_command_options() {
    let config = Config {
      ytdlp_proxy: Some("http://proxy:3128".into()),
      cookies: vec![crate::config::CookieRule {
        host: "instagram.com".into(),
        cookie_file: "/ig.txt".into(),
      }],
      ..Default::default()
    };
    let ytdlp = Ytdlp::new(config);

    let args = |url: &str| -> Vec<String> {
      ytdlp
        .command(url)
        .as_std()
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
    };

    assert_eq!(
      args("https://www.instagram.com/reel/abc/"),
      [
        "--no-playlist",
        "--proxy",
        "http://proxy:3128",
        "--cookies",
        "/ig.txt"
      ]
    );
    assert_eq!(
      args("https://youtube.com/watch?v=x"),
      ["--no-playlist", "--proxy", "http://proxy:3128"]
    );
  }

  #[tokio::test]
  #[ignore = "requires yt-dlp and network access"]
  async fn test_probe_real_video() {
    let ytdlp = Ytdlp::new(Config::default());
    let info = ytdlp
      .probe("https://www.youtube.com/watch?v=aqz-KE-bpKQ")
      .await
      .unwrap();

    assert_eq!(info.extractor.as_deref(), Some("youtube"));
    assert!(!info.formats.is_empty());
  }
}
