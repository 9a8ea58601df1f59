use log::*;

use actix_web::{
  get, web, HttpResponse,
  Error
};

use crate::error::*;
use crate::app::*;
use crate::forms::tag::*;
use crate::db::DbService;
use crate::middleware::Access;

/// Get list of tags
#[get("/tags", wrap = "Access::public_read()")]
async fn list(
  assembler: web::Data<TagAssembler>,
  db: web::Data<DbService>,
) -> Result<HttpResponse, Error> {
  debug!("Tag - list");
  let tags = db.tag.list_all().await?;
  debug!("Tag - list: {} tags", tags.len());

  Ok(HttpResponse::Ok().json(assembler.to_collection_response(tags)))
}

#[derive(Debug, Clone, Default)]
pub struct TagService {
  pub assembler: TagAssembler,
}

impl super::Service for TagService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    let envelope = config.get_bool("Tag.envelope")?.unwrap_or(false);
    self.assembler = TagAssembler::new(envelope);
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .data(self.assembler)
      .service(list);
  }
}

pub fn new_factory() -> TagService {
  Default::default()
}
