use std::net::SocketAddr;

use color_eyre::eyre::{Result, WrapErr};

use crate::map::Coordinate;

pub const PORT_ENV: &str = "LAZY_SPOTS_PORT";
pub const DATABASE_URL_ENV: &str = "LAZY_SPOTS_DATABASE_URL";
pub const PLACES_URL_ENV: &str = "LAZY_SPOTS_PLACES_URL";

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://lazy-spots.db?mode=rwc";
pub const DEFAULT_PLACES_URL: &str = "http://localhost:8888/places";

/// Sofia city center
pub const SOFIA_CENTER: Coordinate = Coordinate {
    lat: 42.6893643,
    lng: 23.3255209,
};
/// Lower left and upper right corners of the region rides must end in
pub const SOFIA_BORDER: (Coordinate, Coordinate) = (
    Coordinate {
        lat: 42.656182,
        lng: 23.102273,
    },
    Coordinate {
        lat: 42.753063,
        lng: 23.572252,
    },
);
pub const DEFAULT_ZOOM: u8 = 14;
pub const MAP_CONTAINER: &str = "map";
pub const LOAD_CONTROL: &str = "laod";

/// Everything the map session needs to know up front
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub container: String,
    pub center: Coordinate,
    pub zoom: u8,
    pub places_url: String,
    pub load_control: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: MAP_CONTAINER.to_string(),
            center: SOFIA_CENTER,
            zoom: DEFAULT_ZOOM,
            places_url: DEFAULT_PLACES_URL.to_string(),
            load_control: LOAD_CONTROL.to_string(),
        }
    }
}

impl MapConfig {
    pub fn from_env() -> Self {
        Self::default().with_places_url(
            std::env::var(PLACES_URL_ENV).unwrap_or_else(|_| DEFAULT_PLACES_URL.to_string()),
        )
    }

    pub fn with_places_url(mut self, places_url: impl Into<String>) -> Self {
        self.places_url = places_url.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var(PORT_ENV) {
            Ok(port) => port
                .parse()
                .wrap_err_with(|| format!("{PORT_ENV} is not a valid port: {port}"))?,
            Err(_) => DEFAULT_PORT,
        };
        let database_url =
            std::env::var(DATABASE_URL_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Ok(Self { port, database_url })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
