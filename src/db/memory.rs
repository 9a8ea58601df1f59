use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::*;
use crate::models::*;

use super::TagStore;

/// Fixed tag list, returned in the order it was given.
#[derive(Debug, Clone, Default)]
pub struct MemoryTagStore {
  tags: Vec<Tag>,
}

impl MemoryTagStore {
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      tags: names.into_iter().map(Tag::new).collect(),
    }
  }
}

impl TagStore for MemoryTagStore {
  fn list_all(&self) -> LocalBoxFuture<'_, Result<Vec<Tag>>> {
    future::ok(self.tags.clone()).boxed_local()
  }
}
