use log::*;

use std::convert::TryFrom;
use std::thread;
use futures::executor;

use anyhow::anyhow;

use crossbeam_channel::{unbounded, Sender};

use actix_rt::System;
use actix_web::{get, web, middleware, HttpResponse, App, HttpServer};
use actix_web::dev::Server;

use crate::{
  error::*,
  app::*,
  db::{DbConfig, DbService},
  services::config_services,
};

enum StopEvent {
  Started(String, Server),
  Shutdown,
  Stopped(String),
}

/// Lets a server thread (or the `/stop` endpoint) talk to the main thread.
#[derive(Clone)]
struct StopHandle {
  name: String,
  main_tx: Sender<StopEvent>,
}

impl StopHandle {
  fn started(&self, server: Server) {
    self.send(StopEvent::Started(self.name.clone(), server));
  }

  fn request_shutdown(&self) {
    info!("Signal main thread to shutdown.");
    self.send(StopEvent::Shutdown);
  }

  fn stopped(&self) {
    debug!("Server({}) stopped, let main thread know.", self.name);
    self.send(StopEvent::Stopped(self.name.clone()));
  }

  fn send(&self, ev: StopEvent) {
    if self.main_tx.send(ev).is_err() {
      warn!("Server({}): main thread is gone.", self.name);
    }
  }
}

#[get("/stop")]
async fn stop_server(handle: web::Data<StopHandle>) -> HttpResponse {
  info!("Got shutdown request.");
  handle.request_shutdown();

  HttpResponse::Ok().body("Shutting down.")
}

fn stop(name: &str, server: &Server) {
  debug!("Stop server: {}", name);
  executor::block_on(server.stop(true));
}

pub fn execute(config: AppConfig) -> Result<()> {
  let servers = config.get_str_array("servers")?
    .ok_or_else(|| anyhow!("missing list of servers"))?;

  let (main_tx, main_rx) = unbounded();
  let mut running = 0usize;
  for name in servers.into_iter() {
    let cfg = config.clone();
    let handle = StopHandle {
      name: name.clone(),
      main_tx: main_tx.clone(),
    };
    debug!("Spawn server: {}", name);
    thread::spawn(move || {
      if let Err(err) = run_server(&cfg, &name, &handle) {
        error!("Error from server({}): {:?}", name, err);
      }
      handle.stopped();
    });
    running += 1;
  }
  drop(main_tx);

  let mut started: Vec<(String, Server)> = Vec::new();
  let mut shutting_down = false;
  while running > 0 {
    match main_rx.recv()? {
      StopEvent::Started(name, server) => {
        if shutting_down {
          stop(&name, &server);
        } else {
          started.push((name, server));
        }
      },
      StopEvent::Shutdown => {
        if !shutting_down {
          info!("Got shutdown signal.  Stop servers.");
          shutting_down = true;
          for (name, server) in started.drain(..) {
            stop(&name, &server);
          }
        }
      },
      StopEvent::Stopped(name) => {
        running -= 1;
        debug!("Server({}) stopped.  Remaining {}", name, running);
      },
    }
  }

  info!("main thread: stopped.");
  Ok(())
}

async fn test_db(db: DbConfig) -> Result<()> {
  DbService::new(&db).prepare().await
}

/// `<prefix>.workers`, defaulting to one per CPU.
fn server_workers(config: &AppConfig, prefix: &str) -> Result<usize> {
  let workers = match config.get_int(&format!("{}.workers", prefix))? {
    Some(workers) => usize::try_from(workers).ok()
      .filter(|w| *w > 0)
      .ok_or_else(|| anyhow!("{}.workers must be > 0", prefix))?,
    None => num_cpus::get(),
  };
  Ok(workers)
}

fn server_backlog(config: &AppConfig, prefix: &str) -> Result<Option<i32>> {
  let backlog = match config.get_int(&format!("{}.backlog", prefix))? {
    Some(backlog) => Some(i32::try_from(backlog).ok()
      .filter(|b| *b > 0)
      .ok_or_else(|| anyhow!("{}.backlog must be between 1 and {}", prefix, i32::MAX))?),
    None => None,
  };
  Ok(backlog)
}

fn run_server(config: &AppConfig, prefix: &str, handle: &StopHandle) -> Result<()> {
  let mut sys = System::new(format!("system.{}", prefix));

  let debug = config.get_bool("debug")?.unwrap_or(false);
  debug!("Debug = {:?}", debug);

  // configure services
  info!("Serve.Services: configure services. prefix={}", prefix);
  let services = config_services(config, prefix)?;

  if debug {
    // Fail early when the tag store can't be reached.
    sys.block_on(test_db(services.db_config().clone()))?;
  }

  let stopper = if config.get_bool(&format!("{}.stopper", prefix))?.unwrap_or_default() {
    Some(handle.clone())
  } else {
    None
  };

  let mut server = HttpServer::new(move || {
    let mut app = App::new()
      .wrap(middleware::Logger::default())
      .wrap(middleware::Compress::default())
      .configure(|web| services.web_config(web));

    if let Some(ref stopper) = stopper {
      app = app.data(stopper.clone())
        .service(stop_server);
    }

    app
  });

  let workers = server_workers(config, prefix)?;
  info!("Workers: {}", workers);
  server = server.workers(workers);

  if let Some(backlog) = server_backlog(config, prefix)? {
    info!("Listen backlog: {}", backlog);
    server = server.backlog(backlog);
  }

  let listen = config.get_str(&format!("{}.listen", prefix))?
    .ok_or_else(|| anyhow!("missing {}.listen", prefix))?;
  info!("{} services listening on: {}", prefix, listen);
  server = server.bind(listen)?;

  let server = server.run();
  handle.started(server.clone());

  sys.block_on(server)?;
  Ok(())
}
