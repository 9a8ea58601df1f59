use log::*;

use std::collections::HashSet;

use anyhow::anyhow;

use actix_web::{web};

use crate::error::*;
use crate::app::*;
use crate::db::{DbConfig, DbService};

pub mod tag;
pub use tag::TagService;

type BoxService = Box<dyn Service>;

/// A group of endpoints that can be switched on per server from config.
pub trait Service: ServiceClone + Send {
  /// Load Service config from AppConfig.
  fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()>;

  /// Endpoints mounted at the server root.
  fn web_config(&self, _web: &mut web::ServiceConfig) {
  }

  /// Endpoints mounted under `/api`.
  fn api_config(&self, _web: &mut web::ServiceConfig) {
  }
}

pub trait ServiceClone {
  fn clone_box(&self) -> BoxService;
}

impl<T> ServiceClone for T
where
    T: 'static + Service + Clone,
{
  fn clone_box(&self) -> BoxService {
    Box::new(self.clone())
  }
}

impl Clone for BoxService {
  fn clone(&self) -> BoxService {
    self.clone_box()
  }
}

#[derive(Clone, Default)]
pub struct Services {
  db: DbConfig,
  services: Vec<BoxService>,
}

impl Services {
  pub fn new() -> Services {
    Default::default()
  }

  fn load_service(&mut self, name: &str, config: &AppConfig, prefix: &str) -> Result<BoxService> {
    let mut service: BoxService = match name {
      "Tag" => Box::new(tag::new_factory()),
      _ => {
        return Err(anyhow!("unknown service: {}", name).into());
      },
    };

    service.load_app_config(config, prefix)?;
    Ok(service)
  }

  /// Load Service config from AppConfig.
  pub fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()> {
    self.db = DbConfig::from_app_config(config)?;

    let mut loaded = HashSet::new();
    let list = config.get_str_array(&format!("{}.services", prefix))?
      .ok_or_else(|| anyhow!("missing list of services: {}.services", prefix))?;
    for name in list.into_iter() {
      info!("Loading {}Service config", name);
      if !loaded.insert(name.clone()) {
        return Err(anyhow!("service listed more than once: {}", name).into());
      }
      let service = self.load_service(&name, config, prefix)?;
      self.services.push(service);
    }
    Ok(())
  }

  pub fn db_config(&self) -> &DbConfig {
    &self.db
  }

  pub fn len(&self) -> usize {
    self.services.len()
  }

  pub fn is_empty(&self) -> bool {
    self.services.is_empty()
  }

  /// Setup Service endpoints.
  ///
  /// Runs once per worker, so each worker gets its own `DbService`.
  pub fn web_config(&self, web: &mut web::ServiceConfig) {
    web.data(DbService::new(&self.db));

    for service in self.services.iter() {
      service.web_config(web);
    }
    web.service(
      web::scope("/api")
        .configure(|web| {
          for service in self.services.iter() {
            service.api_config(web);
          }
        })
    );
  }
}

pub fn config_services(config: &AppConfig, prefix: &str) -> Result<Services> {
  let mut services = Services::new();
  services.load_app_config(config, prefix)?;
  Ok(services)
}
