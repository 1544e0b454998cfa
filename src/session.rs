use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::config::MapConfig;
use crate::map::Map;
use crate::places::PlacesLoader;

/// Things a control can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadPlaces,
}

/// What happened when an action ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Plotted(usize),
}

/// One map page: its map, the loader feeding it and the controls wired to it.
///
/// Clones share the same map, so a session can be handed to several tasks and
/// every load lands on the one map.
#[derive(Clone)]
pub struct Session {
    config: Arc<MapConfig>,
    map: Arc<Mutex<Map>>,
    loader: PlacesLoader,
    controls: Arc<HashMap<String, Action>>,
}

impl Session {
    pub fn new(config: MapConfig, client: reqwest::Client) -> Self {
        let loader = PlacesLoader::new(client, config.places_url.clone());
        let controls = HashMap::from([(config.load_control.clone(), Action::LoadPlaces)]);
        Self {
            map: Arc::new(Mutex::new(Map::new(&config))),
            config: Arc::new(config),
            loader,
            controls: Arc::new(controls),
        }
    }

    /// Replaces the current map with a fresh one, dropping all markers
    pub async fn init_map(&self) {
        let map = Map::new(&self.config);
        info!(
            "map initialized in #{} at {:?}, zoom {}",
            map.container(),
            map.view().center,
            map.view().zoom
        );
        *self.map.lock().await = map;
    }

    /// A click on the control with the given id
    pub async fn activate(&self, control_id: &str) -> Result<Outcome> {
        let action = *self
            .controls
            .get(control_id)
            .ok_or(eyre!("No control with id {control_id}"))?;
        Ok(self.dispatch(action).await)
    }

    #[instrument(skip(self))]
    pub async fn dispatch(&self, action: Action) -> Outcome {
        match action {
            Action::LoadPlaces => {
                // the map lock is not held while the request is in flight
                let response = self.loader.fetch().await;
                let mut map = self.map.lock().await;
                Outcome::Plotted(PlacesLoader::plot(&response, &mut map))
            }
        }
    }

    pub async fn map(&self) -> Map {
        self.map.lock().await.clone()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }
}
