use std::net::SocketAddr;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};

use crate::config::SOFIA_BORDER;
use crate::import::gpx::{ends_in, read_spots, region};
use crate::net::response::{ResponseError, Result};
use crate::repository::SpotRepository;
use crate::types::dto::place::SpotList;

#[derive(Serialize, Debug, PartialEq)]
pub struct ImportedRide {
    pub ride: String,
    pub spots: usize,
}

pub fn router(repo: SpotRepository) -> Router {
    Router::new()
        .route("/places", get(get_map_places))
        .route("/rides", post(import_ride))
        .route("/rides/:ride", delete(delete_ride))
        .layer(CorsLayer::permissive())
        .with_state(repo)
}

/// Serves on an ephemeral local port in the background, returning the bound address
#[cfg(test)]
pub async fn spawn(app: Router) -> color_eyre::Result<SocketAddr> {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());
    let local_addr = server.local_addr();
    tokio::spawn(async move {
        if let Err(err) = server.await {
            warn!("server stopped: {err}");
        }
    });
    Ok(local_addr)
}

/// Client that talks to local test servers directly, whatever proxy the environment sets
#[cfg(test)]
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client without proxy")
}

pub async fn serve(app: Router, addr: SocketAddr) -> color_eyre::Result<()> {
    info!("Running on {addr}");
    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[instrument(skip(repo))]
async fn get_map_places(State(repo): State<SpotRepository>) -> Result<Json<SpotList>> {
    match repo.all_spots().await {
        Ok(spots) => Ok(Json(spots)),
        Err(err) => {
            warn!("failed fetching map places: {err:?}");
            Err(ResponseError::places_unavailable())
        }
    }
}

#[instrument(skip(repo, multipart))]
async fn import_ride(
    State(repo): State<SpotRepository>,
    mut multipart: Multipart,
) -> Result<Json<ImportedRide>> {
    let mut ride_name_opt: Option<String> = None;
    let mut gpx_opt: Option<String> = None;
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("ride_name") => ride_name_opt = Some(field.text().await?),
            Some("gpx") => gpx_opt = Some(field.text().await?),
            _ => continue,
        }
    }
    let ride = ride_name_opt
        .filter(|name| !name.trim().is_empty())
        .ok_or(ResponseError::bad_request("ride_name not provided"))?;
    let gpx = gpx_opt.ok_or(ResponseError::bad_request("gpx not provided"))?;
    let spots = read_spots(&gpx)
        .map_err(|err| ResponseError::bad_request(format!("invalid gpx: {err}")))?;
    if !ends_in(&spots, &region(SOFIA_BORDER)) {
        return Err(ResponseError::bad_request("ride does not end in the Sofia region"));
    }

    repo.post_ride_spots(&ride, &spots).await?;
    info!("stored {} spots for ride '{ride}'", spots.len());
    Ok(Json(ImportedRide {
        ride,
        spots: spots.len(),
    }))
}

#[instrument(skip(repo))]
async fn delete_ride(State(repo): State<SpotRepository>, Path(ride): Path<String>) -> Result<()> {
    if repo.remove_ride(&ride).await? == 0 {
        Err(ResponseError::not_found("no ride with this name"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest::multipart::Form;
    use serde_json::{json, Value};

    use super::*;
    use crate::config::MapConfig;
    use crate::session::{Outcome, Session};
    use crate::types::dto::place::Spot;

    const RIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="lazy-spots" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="42.68" lon="23.30"></trkpt>
    <trkpt lat="42.70" lon="23.34"></trkpt>
  </trkseg></trk>
</gpx>"#;

    const PARIS_RIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="lazy-spots" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="48.85" lon="2.35"></trkpt>
    <trkpt lat="48.86" lon="2.36"></trkpt>
  </trkseg></trk>
</gpx>"#;

    async fn app() -> (String, SpotRepository) {
        let repo = SpotRepository::connect("sqlite::memory:").await.unwrap();
        let addr = spawn(router(repo.clone())).await.unwrap();
        (format!("http://{addr}"), repo)
    }

    #[tokio::test]
    async fn places_serves_stored_spots_with_cors() {
        let (base, repo) = app().await;
        repo.post_ride_spots("ride", &[Spot { lat: 1.0, lng: 2.0 }])
            .await
            .unwrap();

        let response = test_client()
            .get(format!("{base}/places"))
            .header("Origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"data": [{"lat": 1.0, "lng": 2.0}]}));
    }

    #[tokio::test]
    async fn import_then_load_on_a_map() {
        let (base, _) = app().await;
        let form = Form::new().text("ride_name", "loop").text("gpx", RIDE);
        let response = test_client()
            .post(format!("{base}/rides"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"ride": "loop", "spots": 2}));

        let config = MapConfig::default().with_places_url(format!("{base}/places"));
        let session = Session::new(config, test_client());
        assert_eq!(session.activate("laod").await.unwrap(), Outcome::Plotted(2));
        let map = session.map().await;
        assert_eq!(map.markers()[1].position.lat, 42.70);
        assert_eq!(map.markers()[1].position.lng, 23.34);
    }

    #[tokio::test]
    async fn ride_outside_sofia_is_rejected_and_not_served() {
        let (base, repo) = app().await;
        let form = Form::new().text("ride_name", "paris").text("gpx", PARIS_RIDE);
        let response = test_client()
            .post(format!("{base}/rides"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(repo.all_spots().await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn import_without_name_is_rejected() {
        let (base, _) = app().await;
        let form = Form::new().text("gpx", RIDE);
        let response = test_client()
            .post(format!("{base}/rides"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn import_of_bad_gpx_is_rejected() {
        let (base, _) = app().await;
        let form = Form::new().text("ride_name", "loop").text("gpx", "<gpx");
        let response = test_client()
            .post(format!("{base}/rides"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_unknown_ride_is_not_found() {
        let (base, repo) = app().await;
        repo.post_ride_spots("loop", &[Spot { lat: 1.0, lng: 2.0 }])
            .await
            .unwrap();
        let client = test_client();

        let response = client.delete(format!("{base}/rides/loop")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = client.delete(format!("{base}/rides/loop")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
