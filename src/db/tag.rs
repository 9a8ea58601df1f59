use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::*;
use crate::models::*;

use crate::db::*;

/// Read access to the set of known tags.
pub trait TagStore {
  /// Warm up whatever the store needs before serving.
  fn prepare(&self) -> LocalBoxFuture<'_, Result<()>> {
    future::ok(()).boxed_local()
  }

  /// Every tag known to the store, in the store's own order.
  fn list_all(&self) -> LocalBoxFuture<'_, Result<Vec<Tag>>>;
}

/// Tags used by at least one article, sorted by name.
pub struct PgTagStore {
  get_tags: VersionedStatement,
}

impl PgTagStore {
  pub fn new(cl: SharedClient) -> PgTagStore {
    let get_tags = VersionedStatement::new(cl,
        r#"SELECT tag_name FROM article_tags GROUP BY tag_name ORDER BY tag_name"#);

    PgTagStore {
      get_tags,
    }
  }
}

impl TagStore for PgTagStore {
  fn prepare(&self) -> LocalBoxFuture<'_, Result<()>> {
    self.get_tags.prepare().boxed_local()
  }

  fn list_all(&self) -> LocalBoxFuture<'_, Result<Vec<Tag>>> {
    async move {
      let rows = self.get_tags.query(&[]).await?;
      let mut tags = Vec::with_capacity(rows.len());
      for row in rows.iter() {
        let name: String = row.try_get(0)?;
        tags.push(Tag::new(name));
      }
      Ok(tags)
    }.boxed_local()
  }
}
