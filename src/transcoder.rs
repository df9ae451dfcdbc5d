use std::{ffi::OsStr, path::Path};

use async_trait::async_trait;
use tokio::process::Command;

use crate::command::{failure_message, run};
use crate::{Error, Result};

const FFMPEG_DEFAULT_ARGS: [&str; 3] = ["-hide_banner", "-loglevel", "error"];

#[async_trait]
pub trait Transcoder: Send + Sync {
  // copy the audio and video streams as they are into an mp4 container
  async fn remux(&self, input: &Path, output: &Path) -> Result<()>;
}

pub struct Ffmpeg {
  program: String,
}

impl Ffmpeg {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  fn remux_command(&self, input: &Path, output: &Path) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd
      .args(FFMPEG_DEFAULT_ARGS)
      .arg("-y")
      .args([OsStr::new("-i"), input.as_os_str()])
      .args(["-c:v", "copy", "-c:a", "copy"])
      .args(["-f", "mp4"])
      .arg(output);
    cmd
  }
}

#[async_trait]
impl Transcoder for Ffmpeg {
  async fn remux(&self, input: &Path, output: &Path) -> Result<()> {
    let res = run(&mut self.remux_command(input, output)).await?;
    if res.status.success() {
      Ok(())
    } else {
      Err(Error::Transcode(failure_message(&self.program, &res)))
    }
  }
}
