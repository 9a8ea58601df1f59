use serde::de::Deserialize;

use clap::ArgMatches;
use config::{Config, ConfigError, Value, File, FileFormat, Environment};

use crate::error::*;

/// Layered application config: `conf/default`, then either the file given
/// on the command line or `conf/$RUN_MODE` plus `APP_*` env overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub conf: Config
}

impl AppConfig {
  pub fn new_clap(cli: &ArgMatches) -> Result<Self> {
    let mut conf = Config::default();
    // Load defaults
    conf.merge(File::with_name("conf/default"))?;

    if let Some(config_file) = cli.value_of("config") {
      conf.merge(File::with_name(config_file))?;
    } else {
      let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
      conf.merge(File::with_name(&format!("conf/{}", env)).required(false))?;

      conf.merge(Environment::with_prefix("app").separator("_"))?;
    }

    Ok(AppConfig {
      conf,
    })
  }

  /// Config from an inline TOML document, without any files or env.
  pub fn from_toml_str(toml: &str) -> Result<Self> {
    let mut conf = Config::default();
    conf.merge(File::from_str(toml, FileFormat::Toml))?;
    Ok(AppConfig {
      conf,
    })
  }

  pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
    Ok(self.conf.get(key).or_else(|e| {
      match e {
        ConfigError::NotFound(_) => Ok(None),
        err => Err(err),
      }
    })?)
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_str(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_int(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_bool(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_array(&self, key: &str) -> Result<Option<Vec<Value>>> {
    let val = if let Some(val) = self.get(key)? {
      Some(Value::into_array(val)?)
    } else {
      None
    };
    Ok(val)
  }

  pub fn get_str_array(&self, key: &str) -> Result<Option<Vec<String>>> {
    let val = if let Some(vals) = self.get_array(key)? {
      let vals = vals.into_iter()
        .map(Value::into_str)
        .collect::<Result<Vec<String>, ConfigError>>()?;
      Some(vals)
    } else {
      None
    };
    Ok(val)
  }
}
