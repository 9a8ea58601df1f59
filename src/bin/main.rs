use dotenv::dotenv;

use realworld_tags::{app::*, error::*};

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let yaml = clap::load_yaml!("main-cli.yml");
  let cli = clap::App::from_yaml(yaml).get_matches();

  let config = AppConfig::new_clap(&cli)?;

  serve::execute(config)?;
  log::info!("Main finished");
  Ok(())
}
