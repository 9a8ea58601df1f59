use std::rc::Rc;
use std::sync::Once;

use anyhow::anyhow;
use futures::future::{self, FutureExt, LocalBoxFuture};

use actix_web::web;

use realworld_tags::{
  db::{DbService, TagStore},
  error::{Error, Result},
  forms::TagAssembler,
  models::Tag,
  services::{Service, TagService},
};

/// Set `TEST_LOG=1` to see the service's log output.
pub fn init_logging() {
  static INIT_LOGGING: Once = Once::new();
  INIT_LOGGING.call_once(|| {
    if std::env::var("TEST_LOG").is_ok() {
      let _ = env_logger::try_init();
    }
  });
}

/// Stand-in for the tag query collaborator.
pub enum StubStore {
  Tags(Vec<&'static str>),
  Failing,
  Disconnected,
}

impl TagStore for StubStore {
  fn list_all(&self) -> LocalBoxFuture<'_, Result<Vec<Tag>>> {
    let res = match self {
      StubStore::Tags(names) => Ok(names.iter().map(|name| Tag::new(*name)).collect()),
      StubStore::Failing => Err(Error::from(anyhow!("tag store unavailable"))),
      StubStore::Disconnected => {
        Err(Error::DisconnectedError("Failed to connect to database".to_string()))
      },
    };
    future::ready(res).boxed_local()
  }
}

pub fn db_with(store: StubStore) -> DbService {
  DbService::with_tag_store(Rc::new(store))
}

/// Tag routes as mounted under `/api`.
pub fn tag_api(envelope: bool) -> impl FnOnce(&mut web::ServiceConfig) {
  move |web| {
    let service = TagService {
      assembler: TagAssembler::new(envelope),
    };
    service.api_config(web);
  }
}

/// App-level `DbService` backed by `store`, plus the tag routes under `/api`.
pub fn tag_app(store: StubStore, envelope: bool) -> impl FnOnce(&mut web::ServiceConfig) {
  move |web| {
    web
      .data(db_with(store))
      .service(web::scope("/api").configure(tag_api(envelope)));
  }
}
