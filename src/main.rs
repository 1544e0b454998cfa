mod config;
mod import;
mod map;
mod net;
mod places;
mod repository;
mod server;
mod session;
mod types;

use color_eyre::eyre::{eyre, Result, WrapErr};
use futures::future::join_all;
use tracing::info;

use config::{MapConfig, ServerConfig};
use repository::SpotRepository;
use session::{Outcome, Session};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // initialize tracing, stdout is left for map output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None | Some("serve") => run_server().await,
        Some("map") => {
            let activations = match args.get(2) {
                Some(count) => count
                    .parse()
                    .wrap_err_with(|| format!("not a number of activations: {count}"))?,
                None => 1,
            };
            run_map(activations).await
        }
        Some(action) => Err(eyre!(
            "Unknown action {action}, expected `serve` or `map [activations]`"
        )),
    }
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::from_env()?;
    let repo = SpotRepository::connect(&config.database_url).await?;
    server::serve(server::router(repo), config.bind_addr()).await
}

/// Opens the map, clicks the load control `activations` times without
/// waiting in between and prints the resulting map as GeoJSON
async fn run_map(activations: usize) -> Result<()> {
    let session = Session::new(MapConfig::from_env(), reqwest::Client::new());
    session.init_map().await;

    let control = session.config().load_control.clone();
    let outcomes = join_all((0..activations).map(|_| session.activate(&control))).await;
    for outcome in outcomes {
        let Outcome::Plotted(count) = outcome?;
        info!("load finished with {count} new markers");
    }

    let map = session.map().await;
    println!("{}", serde_json::to_string_pretty(&map.to_geojson()?)?);
    Ok(())
}
