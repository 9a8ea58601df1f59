use log::*;

use std::rc::{Rc, Weak};
use std::cell::RefCell;
use std::time::Duration;

use tokio::time::delay_for;

use tokio_postgres::{
  connect, Client, Statement, Row, NoTls,
  types::ToSql,
  Error as PgError,
};

use crate::error::*;
use crate::app::AppConfig;

use super::{TagStore, PgTagStore, MemoryTagStore};

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_millis(100);
const RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// A connected client tagged with the connection version it belongs to.
pub type RefClient = Rc<(u64, Client)>;

#[derive(Clone)]
pub enum ClientState {
  Disconnected(u64),
  Connecting(u64),
  Connected(RefClient),
}

type StateRef = Rc<RefCell<ClientState>>;

fn disconnected() -> Error {
  Error::DisconnectedError("Failed to connect to database".to_string())
}

// tokio-postgres 0.5 only reports a dropped connection through the error text.
fn is_closed_message(msg: &str) -> bool {
  msg == "connection closed"
}

fn is_connection_closed(err: &PgError) -> bool {
  err.code().is_none() && is_closed_message(&err.to_string())
}

/// Store a new state, unless every `SharedClient` is already gone.
fn update_state(state: &Weak<RefCell<ClientState>>, new_state: ClientState) -> bool {
  match state.upgrade() {
    Some(state) => {
      state.replace(new_state);
      true
    },
    None => false,
  }
}

/// Postgres client shared by every store of one worker.
///
/// A background task owns the connection and reconnects after it drops,
/// bumping the version so prepared statements know to re-prepare. The task
/// only holds a weak reference and exits once the last handle is dropped.
#[derive(Clone)]
pub struct SharedClient {
  state: StateRef,
}

impl SharedClient {
  /// Must be called from inside an actix system.
  pub fn connect(url: &str) -> Self {
    let cl = Self {
      state: Rc::new(RefCell::new(ClientState::Disconnected(0))),
    };
    let state = Rc::downgrade(&cl.state);
    let url = url.to_string();
    actix_rt::spawn(async move {
      run_client(state, url).await;
      debug!("db client: background task stopped.");
    });
    cl
  }

  pub async fn get_client(&self) -> Result<RefClient> {
    for _ in 0..MAX_RETRIES {
      match self.state() {
        ClientState::Connected(cl) => return Ok(cl),
        ClientState::Connecting(version) | ClientState::Disconnected(version) => {
          debug!("get_client: ver={}: waiting for connection", version);
          delay_for(RETRY_DELAY).await;
        },
      }
    }
    Err(disconnected())
  }

  /// True when `version` is the live connection.
  pub fn is_current(&self, version: u64) -> bool {
    match *self.state.borrow() {
      ClientState::Connected(ref cl) => cl.0 == version,
      _ => false,
    }
  }

  fn state(&self) -> ClientState {
    self.state.borrow().clone()
  }
}

async fn run_client(state: Weak<RefCell<ClientState>>, url: String) {
  let mut version = 0;
  loop {
    version += 1;
    debug!("db client: ver={}: Connecting", version);
    if !update_state(&state, ClientState::Connecting(version)) {
      return;
    }
    let (cl, conn) = loop {
      match connect(&url, NoTls).await {
        Ok(pair) => break pair,
        Err(err) => {
          debug!("db client: ver={}: connect error: {}", version, err);
          if state.upgrade().is_none() {
            return;
          }
          delay_for(RECONNECT_DELAY).await;
        },
      }
    };
    info!("db client: ver={}: Connected", version);
    if !update_state(&state, ClientState::Connected(Rc::new((version, cl)))) {
      return;
    }

    // Finishes with Ok once the last handle drops the client.
    let res = conn.await;
    if !update_state(&state, ClientState::Disconnected(version)) {
      debug!("db client: ver={}: all handles dropped.", version);
      return;
    }
    match res {
      Ok(()) => {
        debug!("db client: ver={}: connection closed.", version);
        return;
      },
      Err(err) => {
        warn!("db client: ver={}: connection error: {}", version, err);
      },
    }
    delay_for(RECONNECT_DELAY).await;
  }
}

struct PreparedStatement {
  cl: RefClient,
  statement: Statement,
}

/// A query that is prepared lazily, and prepared again whenever the
/// shared client has reconnected since the last time.
pub struct VersionedStatement {
  shared_cl: SharedClient,
  prepared: RefCell<Option<Rc<PreparedStatement>>>,
  query: String,
}

impl VersionedStatement {
  pub fn new(shared_cl: SharedClient, query: &str) -> Self {
    Self {
      shared_cl,
      prepared: RefCell::new(None),
      query: query.to_string(),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.statement().await?;
    Ok(())
  }

  async fn statement(&self) -> Result<Rc<PreparedStatement>> {
    let cached = self.prepared.borrow().clone();
    if let Some(prepared) = cached {
      if self.shared_cl.is_current(prepared.cl.0) {
        return Ok(prepared);
      }
      debug!("statement: ver={}: stale, prepare again", prepared.cl.0);
    }

    let mut retries = 0;
    loop {
      let cl = self.shared_cl.get_client().await?;
      match cl.1.prepare(&self.query).await {
        Ok(statement) => {
          debug!("statement: ver={}: prepared", cl.0);
          let prepared = Rc::new(PreparedStatement { cl, statement });
          self.prepared.replace(Some(prepared.clone()));
          return Ok(prepared);
        },
        Err(err) if is_connection_closed(&err) => {
          retries += 1;
          if retries >= MAX_RETRIES {
            return Err(disconnected());
          }
          delay_for(RETRY_DELAY).await;
        },
        Err(err) => {
          error!("Postgres error: {}, query=[[{}]]", err, self.query);
          return Err(err.into());
        },
      }
    }
  }

  pub async fn query(&self, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
    let mut retries = 0;
    loop {
      let prepared = self.statement().await?;
      match prepared.cl.1.query(&prepared.statement, params).await {
        Ok(rows) => return Ok(rows),
        Err(err) if is_connection_closed(&err) => {
          retries += 1;
          if retries >= MAX_RETRIES {
            return Err(disconnected());
          }
          info!("DB connection closed, retry query.");
          delay_for(RETRY_DELAY).await;
        },
        Err(err) => {
          error!("Postgres DB error: {:?}, query=[[{}]]", err, self.query);
          return Err(err.into());
        },
      }
    }
  }
}

/// Where tags come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbConfig {
  /// Postgres url. Takes precedence over `tags`.
  pub url: Option<String>,
  /// Static tag list served from memory, read from `Tag.seed`.
  pub tags: Vec<String>,
}

impl DbConfig {
  pub fn from_app_config(config: &AppConfig) -> Result<Self> {
    Ok(DbConfig {
      url: config.get_str("db.url")?,
      tags: config.get_str_array("Tag.seed")?.unwrap_or_default(),
    })
  }
}

#[derive(Clone)]
pub struct DbService {
  pub tag: Rc<dyn TagStore>,
}

impl DbService {
  pub fn new(config: &DbConfig) -> DbService {
    let tag: Rc<dyn TagStore> = match config.url {
      Some(ref url) => {
        info!("DbService: postgres tag store.");
        Rc::new(PgTagStore::new(SharedClient::connect(url)))
      },
      None => {
        info!("DbService: in-memory tag store, {} tags.", config.tags.len());
        Rc::new(MemoryTagStore::new(config.tags.iter().cloned()))
      },
    };
    Self::with_tag_store(tag)
  }

  pub fn with_tag_store(tag: Rc<dyn TagStore>) -> DbService {
    DbService {
      tag,
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    info!("DbService: Prepare TagStore.");
    self.tag.prepare().await?;

    info!("DbService: finished.");
    Ok(())
  }
}
