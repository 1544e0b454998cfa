use geojson::JsonObject;
use serde::{Deserialize, Serialize};

use crate::map::Coordinate;

/// A stored point of a ride, as served by `/places`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SpotList {
    pub data: Vec<Spot>,
}

/// A place as received by the map. Only the coordinate is ever plotted,
/// anything else the server sends is carried along untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Body of a `/places` response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PlacesResponse {
    Places {
        data: Vec<Place>,
    },
    Failure {
        #[serde(rename = "Status")]
        status: i64,
    },
}

impl PlacesResponse {
    pub const FALLBACK_STATUS: i64 = 500;

    pub fn fallback() -> Self {
        PlacesResponse::Failure {
            status: Self::FALLBACK_STATUS,
        }
    }
}

impl From<Spot> for Coordinate {
    fn from(spot: Spot) -> Self {
        Coordinate {
            lat: spot.lat,
            lng: spot.lng,
        }
    }
}
