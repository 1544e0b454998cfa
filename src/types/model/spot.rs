use serde::{Deserialize, Serialize};

use crate::types::dto::place::Spot;

//Whats actually stored in the db, one row per kept track point
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RideSpot {
    pub ride: String,
    pub seq: i64,
    pub lat: f64,
    pub lng: f64,
}

//Used when retrieving from db
#[derive(sqlx::FromRow, Debug)]
pub struct QuerySpot {
    pub lat: f64,
    pub lng: f64,
}

impl From<QuerySpot> for Spot {
    fn from(value: QuerySpot) -> Self {
        Spot {
            lat: value.lat,
            lng: value.lng,
        }
    }
}
