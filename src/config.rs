use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
};

use regex::Regex;

use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OUTPUT_DIR: &str = "converted_videos";

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub output_dir: PathBuf,
  pub staging_dir: PathBuf,
  pub ytdlp_path: String,
  pub ffmpeg_path: String,
  pub ytdlp_proxy: Option<String>,
  pub cookies: Vec<CookieRule>,
}

// applies to `host` and its subdomains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRule {
  pub host: String,
  pub cookie_file: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
      staging_dir: std::env::temp_dir(),
      ytdlp_path: "yt-dlp".to_string(),
      ffmpeg_path: "ffmpeg".to_string(),
      ytdlp_proxy: None,
      cookies: vec![],
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let mut config = Config::default();

    if let Some(port) = lookup("PORT") {
      config.port = port
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("PORT is not a port: {port}")))?;
    }

    if let Some(dir) = lookup("OUTPUT_DIR") {
      config.output_dir = dir.into();
    }
    if let Some(dir) = lookup("STAGING_DIR") {
      config.staging_dir = dir.into();
    }
    if let Some(path) = lookup("YTDLP_PATH") {
      config.ytdlp_path = path;
    }
    if let Some(path) = lookup("FFMPEG_PATH") {
      config.ffmpeg_path = path;
    }

    config.ytdlp_proxy = lookup("YTDLP_PROXY").filter(|s| !s.is_empty());

    if let Some(rules) = lookup("YTDLP_COOKIES") {
      config.cookies = parse_cookie_rules(&rules)?;
    }

    Ok(config)
  }

  pub fn cookies_for(&self, url: &str) -> Option<&Path> {
    let uri: http::Uri = url.parse().ok()?;
    let host = uri.host()?.to_ascii_lowercase();

    self
      .cookies
      .iter()
      .find(|rule| {
        host == rule.host
          || host
            .strip_suffix(rule.host.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
      })
      .map(|rule| rule.cookie_file.as_path())
  }

  pub fn redacted_proxy(&self) -> Option<String> {
    // used to remove cred info from proxy url before printing
    static AUTH_REGEX: LazyLock<Regex> =
      LazyLock::new(|| Regex::new(r"//[^:]+(:[^@]+)@").unwrap());

    self
      .ytdlp_proxy
      .as_deref()
      .map(|proxy| AUTH_REGEX.replace(proxy, "//<REDACTED>@").into_owned())
  }
}

fn parse_cookie_rules(s: &str) -> Result<Vec<CookieRule>> {
  s.split(',')
    .map(str::trim)
    .filter(|rule| !rule.is_empty())
    .map(|rule| {
      let (host, file) = rule.split_once('=').ok_or_else(|| {
        Error::Config(format!("cookie rule must be host=file: {rule}"))
      })?;
      let host = host.trim().trim_start_matches('.').to_ascii_lowercase();
      let file = file.trim();
      if host.is_empty() || file.is_empty() {
        return Err(Error::Config(format!("incomplete cookie rule: {rule}")));
      }

      Ok(CookieRule {
        host,
        cookie_file: file.into(),
      })
    })
    .collect()
}
