use std::{
  pin::Pin,
  task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::store::Claim;

// Body stream over a claimed file. Reaching EOF marks the claim served, so
// the file is deleted when the body is dropped; a transfer cut short gives
// the file back to the store.
pub struct OneShotFile {
  stream: ReaderStream<File>,
  claim: Claim,
}

impl OneShotFile {
  pub fn new(file: File, claim: Claim) -> Self {
    OneShotFile {
      stream: ReaderStream::new(file),
      claim,
    }
  }
}

impl Stream for OneShotFile {
  type Item = std::io::Result<Bytes>;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = &mut *self;
    let poll = Pin::new(&mut this.stream).poll_next(cx);
    if let Poll::Ready(None) = poll {
      this.claim.mark_served();
    }
    poll
  }
}
